//! Location command implementation.

use std::io::Write;

use kumoru_sdk::location::Location;
use kumoru_sdk::Client;
use tracing::warn;

use crate::cli::LocationCommands;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Handler for location subcommands.
pub struct LocationCommand<'a> {
    client: &'a Client,
}

impl<'a> LocationCommand<'a> {
    /// Creates a new location command handler.
    #[must_use]
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Executes the location subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &LocationCommands,
    ) -> Result<(), CliError> {
        match command {
            LocationCommands::Add { provider, identifier } => {
                let location = Location::new(provider.as_str(), identifier.as_str())
                    .create(self.client)
                    .await
                    .map_err(CliError::request("add location"))?;
                format.write(out, &location)
            }
            LocationCommands::Archive { provider, identifier } => {
                Location::new(provider.as_str(), identifier.as_str())
                    .delete(self.client)
                    .await
                    .map_err(CliError::request("archive location"))?;
                format.write(
                    out,
                    &Message::success(format!("Archive request accepted for location {provider}/{identifier}")),
                )
            }
            LocationCommands::List { provider, identifier } => {
                if provider.is_none() && identifier.is_some() {
                    warn!("--identifier is ignored without --provider");
                }
                let filter = Location::new(
                    provider.clone().unwrap_or_default(),
                    identifier.clone().unwrap_or_default(),
                );
                let locations = filter
                    .find(self.client)
                    .await
                    .map_err(CliError::request("list locations"))?;
                format.write(out, &locations)
            }
        }
    }
}
