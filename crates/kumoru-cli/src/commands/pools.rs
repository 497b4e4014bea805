//! Pool command implementation.

use std::io::Write;

use kumoru_sdk::pool::Pool;
use kumoru_sdk::Client;

use crate::cli::PoolCommands;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Handler for pool subcommands.
pub struct PoolCommand<'a> {
    client: &'a Client,
}

impl<'a> PoolCommand<'a> {
    /// Creates a new pool command handler.
    #[must_use]
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Executes the pool subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &PoolCommands,
    ) -> Result<(), CliError> {
        match command {
            PoolCommands::Create { location } => {
                let pool = Pool::create(self.client, location)
                    .await
                    .map_err(CliError::request("create pool"))?;
                format.write(out, &pool)
            }
            PoolCommands::Archive { uuid } => {
                Pool::delete(self.client, uuid)
                    .await
                    .map_err(CliError::request("archive pool"))?;
                format.write(out, &Message::success(format!("Archive request accepted for pool {uuid}")))
            }
            PoolCommands::List => {
                let pools = Pool::list(self.client)
                    .await
                    .map_err(CliError::request("list pools"))?;
                format.write(out, &pools)
            }
            PoolCommands::Show { uuid } => {
                let pool = Pool::show(self.client, uuid)
                    .await
                    .map_err(CliError::request("show pool"))?;
                format.write(out, &pool)
            }
        }
    }
}
