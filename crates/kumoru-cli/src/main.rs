//! Kumoru CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use kumoru_sdk::config::{self, DEBUG_ENV};
use kumoru_sdk::{Client, Config};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kumoru_cli::cli::{Cli, Commands};
use kumoru_cli::commands::{
    AccountCommand, ApplicationCommand, DeploymentCommand, LocationCommand, PoolCommand, SecretCommand,
    TokenCommand,
};
use kumoru_cli::output::OutputFormat;
use kumoru_cli::prompt::TerminalPrompt;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` when set; otherwise debug for the client crates when
/// `KUMORU_SDK_DEBUG=true`, else warnings only.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let debug = std::env::var(DEBUG_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("true"));
        EnvFilter::new(if debug { "kumoru_sdk=debug,kumoru_cli=debug" } else { "warn" })
    })
}

async fn run(cli: Cli) -> Result<(), kumoru_cli::CliError> {
    let path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };
    debug!(path = %path.display(), "loading configuration");
    let client = Client::new(Config::load_from(path));

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();
    let mut prompt = TerminalPrompt;

    match cli.command {
        Commands::Login(args) => {
            let mut cmd = TokenCommand::new(&client, &mut prompt);
            cmd.create(&mut stdout, &format, &args).await?;
        }
        Commands::Tokens { command } => {
            let mut cmd = TokenCommand::new(&client, &mut prompt);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Accounts { command } => {
            let mut cmd = AccountCommand::new(&client, &mut prompt);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Applications { command } => {
            let cmd = ApplicationCommand::new(&client);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Deployments { command } => {
            let cmd = DeploymentCommand::new(&client);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Locations { command } => {
            let cmd = LocationCommand::new(&client);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Pools { command } => {
            let cmd = PoolCommand::new(&client);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Secrets { command } => {
            let cmd = SecretCommand::new(&client);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
    }

    Ok(())
}
