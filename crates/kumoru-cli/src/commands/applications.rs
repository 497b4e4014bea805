//! Application command implementation.
//!
//! Create, show, list, deploy, patch, and archive applications. Arguments
//! are validated before any request is made.

use std::collections::BTreeMap;
use std::io::Write;

use kumoru_sdk::application::{AppLocation, Application};
use kumoru_sdk::Client;
use serde_json::Value;
use tracing::debug;

use crate::cli::{ApplicationCommands, CreateApplicationArgs, PatchApplicationArgs};
use crate::error::CliError;
use crate::input;
use crate::output::{Message, OutputFormat};

/// Handler for application subcommands.
pub struct ApplicationCommand<'a> {
    client: &'a Client,
}

impl<'a> ApplicationCommand<'a> {
    /// Creates a new application command handler.
    #[must_use]
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Executes the application subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ApplicationCommands,
    ) -> Result<(), CliError> {
        match command {
            ApplicationCommands::Archive { uuid } => self.archive(out, format, uuid).await,
            ApplicationCommands::Create(args) => self.create(out, format, args).await,
            ApplicationCommands::Deploy { uuid } => self.deploy(out, format, uuid).await,
            ApplicationCommands::List { all } => self.list(out, format, *all).await,
            ApplicationCommands::Patch(args) => self.patch(out, format, args).await,
            ApplicationCommands::Show { uuid } => {
                let app = Application::show(self.client, uuid)
                    .await
                    .map_err(CliError::request("show application"))?;
                format.write(out, &app)
            }
        }
    }

    async fn archive<W: Write>(&self, out: &mut W, format: &OutputFormat, uuid: &str) -> Result<(), CliError> {
        Application::with_uuid(uuid)
            .delete(self.client)
            .await
            .map_err(CliError::request("archive application"))?;
        format.write(out, &Message::success(format!("Archive request accepted for application {uuid}")))
    }

    async fn create<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &CreateApplicationArgs,
    ) -> Result<(), CliError> {
        let app = application_from_args(args)?;
        let created = app
            .create(self.client)
            .await
            .map_err(CliError::request("create application"))?;
        format.write(out, &created)
    }

    async fn deploy<W: Write>(&self, out: &mut W, format: &OutputFormat, uuid: &str) -> Result<(), CliError> {
        let app = Application::show(self.client, uuid)
            .await
            .map_err(CliError::request("show application"))?;
        app.deploy(self.client)
            .await
            .map_err(CliError::request("deploy application"))?;
        format.write(out, &Message::success(format!("Deploying application {uuid}")))
    }

    async fn list<W: Write>(&self, out: &mut W, format: &OutputFormat, all: bool) -> Result<(), CliError> {
        let mut apps = Application::list(self.client)
            .await
            .map_err(CliError::request("list applications"))?;
        if !all {
            apps.retain(|app| !app.is_archived());
        }
        format.write(out, &apps)
    }

    async fn patch<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &PatchApplicationArgs,
    ) -> Result<(), CliError> {
        let change = Change::from_args(args)?;

        let original = Application::show(self.client, &args.uuid)
            .await
            .map_err(CliError::request("show application"))?;
        let mut patched = original.clone();
        change.apply(&mut patched);

        let updated = original
            .patch(self.client, &patched)
            .await
            .map_err(CliError::request("patch application"))?;
        format.write(out, &updated)
    }
}

/// Builds the application described by `create` arguments.
///
/// # Errors
///
/// Fails on malformed rules, environment, or metadata, or unreadable files.
pub fn application_from_args(args: &CreateApplicationArgs) -> Result<Application, CliError> {
    Ok(Application {
        name: args.name.clone(),
        image_url: args.image_url.clone(),
        location: AppLocation {
            provider: args.provider.clone(),
            region: args.region.clone(),
        },
        environment: input::environment(args.env_file.as_deref(), &args.env)?,
        rules: input::parse_rules(&args.rules)?,
        ports: args.ports.clone(),
        ssl_ports: args.ssl_ports.clone(),
        metadata: input::metadata(args.metadata.as_deref(), &args.labels)?,
        certificates: input::read_certificates(
            args.certificate_file.as_deref(),
            args.certificate_chain_file.as_deref(),
            args.private_key_file.as_deref(),
        )?,
        ..Application::default()
    })
}

/// The one change a `patch` applies.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Replace the environment.
    Environment(BTreeMap<String, String>),
    /// Replace the image.
    Image(String),
    /// Replace the metadata.
    Metadata(BTreeMap<String, Value>),
    /// Rename.
    Name(String),
    /// Replace the rules.
    Rules(BTreeMap<String, i32>),
}

impl Change {
    /// Picks the first change given, in the order environment, image,
    /// metadata/labels, name, rules.
    ///
    /// # Errors
    ///
    /// Fails when no change is given or the chosen one is malformed.
    pub fn from_args(args: &PatchApplicationArgs) -> Result<Self, CliError> {
        if args.env_file.is_some() || !args.env.is_empty() {
            return Ok(Self::Environment(input::environment(args.env_file.as_deref(), &args.env)?));
        }
        if let Some(image_url) = &args.image_url {
            return Ok(Self::Image(image_url.clone()));
        }
        if args.metadata.is_some() || !args.labels.is_empty() {
            return Ok(Self::Metadata(input::metadata(args.metadata.as_deref(), &args.labels)?));
        }
        if let Some(name) = &args.name {
            return Ok(Self::Name(name.clone()));
        }
        if !args.rules.is_empty() {
            return Ok(Self::Rules(input::parse_rules(&args.rules)?));
        }
        Err(CliError::InvalidArgument("nothing to patch".into()))
    }

    /// Applies the change to `app`.
    pub fn apply(self, app: &mut Application) {
        debug!(change = ?self, "patching application");
        match self {
            Self::Environment(environment) => app.environment = environment,
            Self::Image(image_url) => app.image_url = image_url,
            Self::Metadata(metadata) => app.metadata = metadata,
            Self::Name(name) => app.name = name,
            Self::Rules(rules) => app.rules = rules,
        }
    }
}
