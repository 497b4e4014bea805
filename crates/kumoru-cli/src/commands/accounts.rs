//! Account management command implementation.

use std::io::Write;

use kumoru_sdk::account::Account;
use kumoru_sdk::Client;

use crate::cli::AccountCommands;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};
use crate::prompt::{Prompt, confirm_password};

/// Handler for account subcommands.
pub struct AccountCommand<'a, P: Prompt + ?Sized> {
    client: &'a Client,
    prompt: &'a mut P,
}

impl<'a, P: Prompt + ?Sized> AccountCommand<'a, P> {
    /// Creates a new account command handler.
    pub fn new(client: &'a Client, prompt: &'a mut P) -> Self {
        Self { client, prompt }
    }

    /// Executes the account subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &mut self,
        out: &mut W,
        format: &OutputFormat,
        command: &AccountCommands,
    ) -> Result<(), CliError> {
        match command {
            AccountCommands::Create {
                email,
                first_name,
                last_name,
                password,
            } => {
                let password = match password {
                    Some(password) => password.clone(),
                    None => confirm_password(&mut *self.prompt)?,
                };
                let account = Account::new(email.as_str()).with_name(
                    first_name.clone().unwrap_or_default(),
                    last_name.clone().unwrap_or_default(),
                );
                let created = account
                    .create(self.client, &password)
                    .await
                    .map_err(CliError::request("create account"))?;
                format.write(out, &created)
            }
            AccountCommands::Reset { email } => {
                Account::new(email.as_str())
                    .reset_password(self.client)
                    .await
                    .map_err(CliError::request("reset password"))?;
                format.write(
                    out,
                    &Message::success(format!("Password reset instructions sent to: {email}")),
                )
            }
            AccountCommands::Show { email } => {
                let account = Account::show(self.client, email)
                    .await
                    .map_err(CliError::request("show account"))?;
                format.write(out, &account)
            }
        }
    }
}
