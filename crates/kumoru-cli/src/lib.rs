//! # kumoru-cli
//!
//! Kumoru command-line interface.
//!
//! Provides commands for:
//! - Token generation and login
//! - Accounts
//! - Applications and their deployments
//! - Locations and capacity pools
//! - Secrets
//!
//! # Architecture
//!
//! Every command goes through a [`kumoru_sdk::Client`] built from the INI
//! configuration file, which signs requests with the stored token pair.
//!
//! ```text
//! ┌────────────┐   argv    ┌──────────┐   signed HTTP   ┌─────────────────┐
//! │ kumoru-cli │──────────►│ commands │────────────────►│ Kumoru services │
//! └────────────┘           └────┬─────┘   (kumoru-sdk)  └─────────────────┘
//!                               ▼
//!                         table / JSON
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod input;
pub mod output;
pub mod prompt;

pub use cli::{Cli, Commands, Format};
pub use error::CliError;
pub use output::OutputFormat;
