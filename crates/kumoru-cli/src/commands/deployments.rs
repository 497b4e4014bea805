//! Deployment history command implementation.

use std::io::Write;

use kumoru_sdk::deployment::Deployment;
use kumoru_sdk::Client;

use crate::cli::DeploymentCommands;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Handler for deployment subcommands.
pub struct DeploymentCommand<'a> {
    client: &'a Client,
}

impl<'a> DeploymentCommand<'a> {
    /// Creates a new deployment command handler.
    #[must_use]
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Executes the deployment subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &DeploymentCommands,
    ) -> Result<(), CliError> {
        match command {
            DeploymentCommands::List { application_uuid } => {
                let deployments = Deployment::list(self.client, application_uuid)
                    .await
                    .map_err(CliError::request("list deployments"))?;
                format.write(out, &deployments)
            }
            DeploymentCommands::Show {
                application_uuid,
                deployment_uuid,
            } => {
                let deployment = Deployment::show(self.client, application_uuid, deployment_uuid)
                    .await
                    .map_err(CliError::request("show deployment"))?;
                format.write(out, &deployment)
            }
        }
    }
}
