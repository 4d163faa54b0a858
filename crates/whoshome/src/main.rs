//! `whoshome` - CLI for the household presence roster
//!
//! This binary loads configuration, connects to the configured store and runs
//! one command against the household roster.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use whoshome::cli::session::Session;
use whoshome::cli::{AddCommand, Cli, Command, ConfigCommand, ListCommand, MemberCommand};
use whoshome::member::PALETTE;
use whoshome::view::{render_dashboard, StatusOverview, Style};
use whoshome::{connect, init_logging, Config, Error, Household, StderrNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    if let Command::Config(config_cmd) = cli.command {
        return handle_config(cli.config, config_cmd);
    }

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(backend) = cli.backend {
        config.store.backend = backend.into();
        config.validate()?;
    }

    let mut style = Style::from(&config.display);
    style.ansi_colors &= std::io::stdout().is_terminal();

    if matches!(cli.command, Command::Colors) {
        handle_colors(&style);
        return Ok(ExitCode::SUCCESS);
    }

    let store = connect(&config).context("connecting to the member store")?;
    let mut household = Household::new(store, Arc::new(StderrNotifier));

    // Execute the command
    match cli.command {
        Command::List(list_cmd) => handle_list(&mut household, &list_cmd, &style).await,
        Command::Add(add_cmd) => Ok(handle_add(&mut household, &add_cmd).await),
        Command::Toggle(member_cmd) => Ok(handle_toggle(&mut household, &member_cmd).await),
        Command::Delete(member_cmd) => Ok(handle_delete(&mut household, &member_cmd).await),
        Command::Session => handle_session(&mut household, style).await,
        Command::Colors | Command::Config(_) => Ok(ExitCode::SUCCESS),
    }
}

/// Report an error the notifier has not already shown.
fn report(error: &Error) -> ExitCode {
    if !error.is_remote() {
        eprintln!("error: {error}");
    }
    ExitCode::FAILURE
}

async fn handle_list(
    household: &mut Household,
    cmd: &ListCommand,
    style: &Style,
) -> anyhow::Result<ExitCode> {
    let loaded = household.load().await;

    if cmd.json {
        let overview = StatusOverview::new(household.home_count(), household.total_count());
        let listing = serde_json::json!({
            "members": household.members(),
            "home": overview.home,
            "total": overview.total,
            "percent": overview.percent(),
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render_dashboard(household, &Local::now(), style));
    }

    Ok(match loaded {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}

async fn handle_add(household: &mut Household, cmd: &AddCommand) -> ExitCode {
    match household.add_member(&cmd.name, &cmd.role, &cmd.color).await {
        Ok(member) => {
            println!("Added {} ({}) with id {}", member.name, member.role, member.id);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

/// Load the roster and turn a selector into an id.
async fn select(household: &mut Household, selector: &str) -> Result<String, ExitCode> {
    if household.load().await.is_err() {
        eprintln!("error: could not load the roster");
        return Err(ExitCode::FAILURE);
    }
    household.resolve(selector).map(str::to_string).ok_or_else(|| {
        eprintln!("error: no member matches '{selector}'");
        ExitCode::FAILURE
    })
}

async fn handle_toggle(household: &mut Household, cmd: &MemberCommand) -> ExitCode {
    let id = match select(household, &cmd.selector).await {
        Ok(id) => id,
        Err(code) => return code,
    };
    match household.toggle_status(&id).await {
        Ok(member) => {
            let status = if member.is_home { "home" } else { "away" };
            println!("{} is now {status}", member.name);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

async fn handle_delete(household: &mut Household, cmd: &MemberCommand) -> ExitCode {
    let id = match select(household, &cmd.selector).await {
        Ok(id) => id,
        Err(code) => return code,
    };
    match household.delete_member(&id).await {
        Ok(Some(member)) => {
            println!("Deleted {}", member.name);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn handle_colors(style: &Style) {
    for (index, swatch) in PALETTE.iter().enumerate() {
        println!(
            "{:>2}. {} {:<8} {}",
            index + 1,
            style.paint(Some(swatch), "●"),
            swatch.name,
            swatch.token
        );
    }
}

async fn handle_session(household: &mut Household, style: Style) -> anyhow::Result<ExitCode> {
    let _ = household.load().await;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Session::new(household, style, stdin.lock(), stdout.lock())
        .run()
        .await?;
    Ok(ExitCode::SUCCESS)
}

fn handle_config(path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path)
                .context("loading configuration")?
                .redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Backend:            {}", config.store.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!(
                    "  URL:                {}",
                    config.store.url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  API key:            {}",
                    config.store.api_key.as_deref().unwrap_or("(not set)")
                );
                println!("  Table:              {}", config.store.table);
                println!("  Timeout (seconds):  {}", config.store.timeout_secs);
                println!();
                println!("[Display]");
                println!("  ANSI colours:       {}", config.display.ansi_colors);
                println!("  Bar width:          {}", config.display.bar_width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
