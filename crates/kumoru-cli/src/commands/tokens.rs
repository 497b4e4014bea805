//! Token pair generation.
//!
//! Issues a new pair with the account's username and password, looks up
//! the account's role with the new pair, and either saves both to the
//! configuration file or prints them as an INI snippet.

use std::io::Write;

use kumoru_sdk::account::Account;
use kumoru_sdk::config::{self, AUTH_SECTION, TOKENS_SECTION};
use kumoru_sdk::token::issue_tokens;
use kumoru_sdk::Client;
use tracing::info;

use crate::cli::{TokenCommands, TokensCreateArgs};
use crate::error::CliError;
use crate::output::{Message, OutputFormat, TokenSnippet};
use crate::prompt::Prompt;

/// Handler for token subcommands.
pub struct TokenCommand<'a, P: Prompt + ?Sized> {
    client: &'a Client,
    prompt: &'a mut P,
}

impl<'a, P: Prompt + ?Sized> TokenCommand<'a, P> {
    /// Creates a new token command handler.
    pub fn new(client: &'a Client, prompt: &'a mut P) -> Self {
        Self { client, prompt }
    }

    /// Executes the token subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &mut self,
        out: &mut W,
        format: &OutputFormat,
        command: &TokenCommands,
    ) -> Result<(), CliError> {
        match command {
            TokenCommands::Create(args) => self.create(out, format, args).await,
        }
    }

    /// Generates a token pair; also reached through `login`.
    ///
    /// # Errors
    ///
    /// Refuses to replace stored tokens without `--force`, and fails when the
    /// platform rejects the credentials or the file cannot be written.
    pub async fn create<W: Write>(
        &mut self,
        out: &mut W,
        format: &OutputFormat,
        args: &TokensCreateArgs,
    ) -> Result<(), CliError> {
        let path = &self.client.config().path;

        if !args.dont_save && !args.force && config::has_tokens(path, TOKENS_SECTION) {
            return Err(CliError::Refused(format!(
                "tokens already exist in {}; use --force to replace them or --dont-save to print new ones",
                path.display()
            )));
        }

        let username = self.prompt.read_line("Username: ")?;
        let password = self.prompt.read_password("Password: ")?;

        let tokens = issue_tokens(self.client, &username, &password)
            .await
            .map_err(CliError::request("create tokens"))?;

        let signed = Client::new(self.client.config().clone().with_tokens(tokens.clone()));
        let account = Account::show(&signed, &username)
            .await
            .map_err(CliError::request("look up account"))?;

        if args.dont_save {
            return format.write(
                out,
                &TokenSnippet {
                    active_role: account.role_uuid,
                    public_token: tokens.public,
                    private_token: tokens.private,
                },
            );
        }

        config::save_role(path, AUTH_SECTION, &account.role_uuid)?;
        tokens.save(path, TOKENS_SECTION)?;
        info!(path = %path.display(), public_token = %tokens.public, "tokens saved");

        format.write(out, &Message::success(format!("Tokens saved to {}", path.display())))
    }
}
