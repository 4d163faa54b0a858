//! `whoshome` - A shared roster of who is at home
//!
//! This library keeps a household's members and their home/away status in a
//! remote table, and renders the roster for the terminal.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod household;
pub mod logging;
pub mod member;
pub mod notify;
pub mod store;
pub mod view;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use household::Household;
pub use logging::init_logging;
pub use member::Member;
pub use notify::{Notice, Notifier, StderrNotifier};
pub use store::{connect, RemoteStore, StoreError};
