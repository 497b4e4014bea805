//! Secret management command implementation.

use std::io::Write;

use kumoru_sdk::secret::Secret;
use kumoru_sdk::Client;

use crate::cli::SecretCommands;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Handler for secret subcommands.
pub struct SecretCommand<'a> {
    client: &'a Client,
}

impl<'a> SecretCommand<'a> {
    /// Creates a new secret command handler.
    #[must_use]
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Executes the secret subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &SecretCommands,
    ) -> Result<(), CliError> {
        match command {
            SecretCommands::Create { value, labels } => {
                let secret = Secret::new(value.as_str(), labels.clone())
                    .create(self.client)
                    .await
                    .map_err(CliError::request("create secret"))?;
                format.write(out, &secret)
            }
            SecretCommands::List => {
                let secrets = Secret::list(self.client)
                    .await
                    .map_err(CliError::request("list secrets"))?;
                format.write(out, &secrets)
            }
            SecretCommands::Show { uuid } => {
                let secret = Secret::show(self.client, uuid)
                    .await
                    .map_err(CliError::request("show secret"))?;
                format.write(out, &secret)
            }
        }
    }
}
