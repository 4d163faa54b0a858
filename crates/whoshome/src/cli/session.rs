//! Interactive session.
//!
//! Reads one command per line, drives the [`Household`] and redraws the
//! dashboard after every action. Input and output are generic so the loop can
//! run against a terminal or an in-memory buffer.

use std::io::{BufRead, Write};

use chrono::Local;
use tracing::debug;

use crate::error::{Error, Result};
use crate::household::Household;
use crate::member::PALETTE;
use crate::view::{presence_badge, render_dashboard, AddMemberForm, Style};

const HELP: &str = "\
Commands:
  add           add a family member
  toggle N      flip member N between home and away
  delete N      remove member N
  list          redraw the dashboard
  help          show this help
  quit          leave the session

N is a list position, a member id, or a unique id prefix.";

/// A command typed at the session prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Open the add-member form.
    Add,
    /// Toggle the member matching the selector.
    Toggle(String),
    /// Delete the member matching the selector.
    Delete(String),
    /// Redraw the dashboard.
    List,
    /// Show the command summary.
    Help,
    /// End the session.
    Quit,
    /// Blank line.
    Empty,
    /// Anything else, with the reason it was not understood.
    Invalid(String),
}

impl SessionCommand {
    /// Parse one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Self::Empty;
        };
        let argument = words.next().map(str::to_string);

        match (word.to_ascii_lowercase().as_str(), argument) {
            ("add" | "a", _) => Self::Add,
            ("toggle" | "t", Some(selector)) => Self::Toggle(selector),
            ("delete" | "d" | "rm", Some(selector)) => Self::Delete(selector),
            ("toggle" | "t" | "delete" | "d" | "rm", None) => {
                Self::Invalid(format!("'{word}' needs a member number"))
            }
            ("list" | "ls" | "l", _) => Self::List,
            ("help" | "h" | "?", _) => Self::Help,
            ("quit" | "q" | "exit", _) => Self::Quit,
            _ => Self::Invalid(format!("unknown command '{word}'")),
        }
    }
}

/// An interactive session over one household.
#[derive(Debug)]
pub struct Session<'a, R, W> {
    household: &'a mut Household,
    style: Style,
    form: AddMemberForm,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Create a session reading commands from `input` and drawing to `output`.
    pub fn new(household: &'a mut Household, style: Style, input: R, output: W) -> Self {
        Self {
            household,
            style,
            form: AddMemberForm::new(),
            input,
            output,
        }
    }

    /// Run until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails. Failed
    /// household operations are reported and the session continues.
    pub async fn run(&mut self) -> Result<()> {
        self.render()?;
        writeln!(self.output, "Type 'help' for commands.")?;

        while let Some(line) = self.prompt("> ")? {
            let command = SessionCommand::parse(&line);
            debug!("Session command: {:?}", command);

            match command {
                SessionCommand::Quit => break,
                SessionCommand::Empty => {}
                SessionCommand::Help => writeln!(self.output, "{HELP}")?,
                SessionCommand::List => self.render()?,
                SessionCommand::Invalid(reason) => {
                    writeln!(self.output, "{reason}. Type 'help' for commands.")?;
                }
                SessionCommand::Add => {
                    if !self.add().await? {
                        break;
                    }
                }
                SessionCommand::Toggle(selector) => self.toggle(&selector).await?,
                SessionCommand::Delete(selector) => self.delete(&selector).await?,
            }
        }
        Ok(())
    }

    /// Walk through the add-member form. Returns `false` if input ran out.
    async fn add(&mut self) -> Result<bool> {
        self.form.open();
        writeln!(self.output, "Add Family Member")?;

        let current = self.form.name().to_string();
        let Some(name) = self.prompt_with_default("Name", &current)? else {
            return Ok(false);
        };
        self.form.set_name(name);

        let current = self.form.role().to_string();
        let Some(role) = self.prompt_with_default("Role (e.g., Parent, Child)", &current)? else {
            return Ok(false);
        };
        self.form.set_role(role);

        for (index, swatch) in PALETTE.iter().enumerate() {
            let label = self.style.paint(Some(swatch), &swatch.to_string());
            writeln!(self.output, "  {}. {label}", index + 1)?;
        }
        let current = self.form.selected_color().name.to_string();
        let Some(choice) = self.prompt_with_default("Color", &current)? else {
            return Ok(false);
        };
        if !self.form.select_color(&choice) {
            writeln!(self.output, "Unknown colour '{choice}', keeping {current}.")?;
        }

        let Some(request) = self.form.submit() else {
            writeln!(self.output, "Name and role are required.")?;
            self.form.close();
            return Ok(true);
        };

        match self
            .household
            .add_member(&request.name, &request.role, request.color.token)
            .await
        {
            Ok(member) => {
                writeln!(self.output, "Added {}.", member.name)?;
                self.render()?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(true)
    }

    async fn toggle(&mut self, selector: &str) -> Result<()> {
        let Some(id) = self.select(selector)? else {
            return Ok(());
        };
        match self.household.toggle_status(&id).await {
            Ok(member) => {
                writeln!(
                    self.output,
                    "{} is now {}.",
                    member.name,
                    presence_badge(member.is_home).to_lowercase()
                )?;
                self.render()?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    async fn delete(&mut self, selector: &str) -> Result<()> {
        let Some(id) = self.select(selector)? else {
            return Ok(());
        };
        match self.household.delete_member(&id).await {
            Ok(removed) => {
                if let Some(member) = removed {
                    writeln!(self.output, "Removed {}.", member.name)?;
                }
                self.render()?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    /// Resolve a session selector, where a bare number is a list position.
    fn select(&mut self, selector: &str) -> Result<Option<String>> {
        let id = match (self.household.get(selector), selector.parse::<usize>()) {
            (Some(member), _) => Some(member.id.clone()),
            // A bare number is a list position and nothing else.
            (None, Ok(_)) => self.household.resolve(&format!("#{selector}")).map(str::to_string),
            (None, Err(_)) => self.household.resolve(selector).map(str::to_string),
        };

        if id.is_none() {
            writeln!(self.output, "No member matches '{selector}'.")?;
        }
        Ok(id)
    }

    /// Print errors the notifier has not already shown.
    fn report(&mut self, error: &Error) -> Result<()> {
        if !error.is_remote() {
            writeln!(self.output, "{error}")?;
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let screen = render_dashboard(&*self.household, &Local::now(), &self.style);
        writeln!(self.output, "\n{screen}")?;
        Ok(())
    }

    fn prompt_with_default(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        let prompt = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };
        Ok(self.prompt(&prompt)?.map(|line| {
            if line.trim().is_empty() {
                current.to_string()
            } else {
                line
            }
        }))
    }

    /// Show `prompt` and read a line. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
