//! Command-line argument parsing with clap.

use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Version line: crate version plus git hash and build stamp when the build
/// provides them.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if let Some(hash) = option_env!("KUMORU_GIT_HASH") {
        version.push_str(&format!(" (git {hash})"));
    }
    if let Some(stamp) = option_env!("KUMORU_BUILD_STAMP") {
        version.push_str(&format!(" built {stamp}"));
    }
    version
});

/// Kumoru command-line client.
#[derive(Parser, Debug, Clone)]
#[command(name = "kumoru")]
#[command(version = VERSION.as_str(), about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Configuration file [default: ~/.kumoru/config].
    #[arg(long, env = "KUMORU_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable tables.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a token pair and save it (alias for `tokens create`).
    Login(TokensCreateArgs),

    /// Token management.
    Tokens {
        /// Tokens subcommand to execute.
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Account management.
    Accounts {
        /// Accounts subcommand to execute.
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Application management.
    Applications {
        /// Applications subcommand to execute.
        #[command(subcommand)]
        command: ApplicationCommands,
    },

    /// Deployment history.
    Deployments {
        /// Deployments subcommand to execute.
        #[command(subcommand)]
        command: DeploymentCommands,
    },

    /// Provider locations.
    Locations {
        /// Locations subcommand to execute.
        #[command(subcommand)]
        command: LocationCommands,
    },

    /// Capacity pools.
    Pools {
        /// Pools subcommand to execute.
        #[command(subcommand)]
        command: PoolCommands,
    },

    /// Secret management.
    Secrets {
        /// Secrets subcommand to execute.
        #[command(subcommand)]
        command: SecretCommands,
    },
}

/// Token subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TokenCommands {
    /// Generate a new token pair.
    Create(TokensCreateArgs),
}

/// Arguments for token generation.
#[derive(Args, Debug, Clone, Default)]
pub struct TokensCreateArgs {
    /// Overwrite tokens already present in the configuration file.
    #[arg(short, long)]
    pub force: bool,

    /// Print the tokens instead of saving them.
    #[arg(short, long)]
    pub dont_save: bool,
}

/// Account subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AccountCommands {
    /// Create an account.
    Create {
        /// Login e-mail.
        email: String,

        /// First name.
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name.
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Password; prompted for when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Send password reset instructions.
    Reset {
        /// Login e-mail.
        email: String,
    },

    /// Show account details.
    Show {
        /// Login e-mail.
        email: String,
    },
}

/// Application subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ApplicationCommands {
    /// Archive an application.
    Archive {
        /// Application UUID.
        uuid: String,
    },

    /// Create an application.
    Create(CreateApplicationArgs),

    /// Deploy the current definition of an application.
    Deploy {
        /// Application UUID.
        uuid: String,
    },

    /// List applications.
    List {
        /// Include archived applications.
        #[arg(short, long)]
        all: bool,
    },

    /// Change one aspect of an application.
    ///
    /// Only the first change given is applied, checked in this order:
    /// environment, image, metadata/labels, name, rules.
    Patch(PatchApplicationArgs),

    /// Show application details.
    Show {
        /// Application UUID.
        uuid: String,
    },
}

/// Arguments for application creation.
#[derive(Args, Debug, Clone)]
pub struct CreateApplicationArgs {
    /// Cloud provider.
    pub provider: String,

    /// Provider region.
    pub region: String,

    /// Container image URL.
    #[arg(value_name = "IMG_URL")]
    pub image_url: String,

    /// Application name.
    #[arg(value_name = "APP_NAME")]
    pub name: String,

    /// PEM certificate served on the SSL ports.
    #[arg(long)]
    pub certificate_file: Option<PathBuf>,

    /// PEM certificate chain.
    #[arg(long)]
    pub certificate_chain_file: Option<PathBuf>,

    /// PEM private key for the certificate.
    #[arg(long)]
    pub private_key_file: Option<PathBuf>,

    /// File with one KEY=VALUE per line; replaces -e.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Port served over TLS.
    #[arg(long = "ssl-port")]
    pub ssl_ports: Vec<String>,

    /// Environment variable.
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Deployment rule.
    #[arg(short, long = "rule", value_name = "TAG=WEIGHT")]
    pub rules: Vec<String>,

    /// Port (non-SSL).
    #[arg(short, long = "port")]
    pub ports: Vec<String>,

    /// Label.
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// Metadata, a JSON object.
    #[arg(short, long)]
    pub metadata: Option<String>,
}

/// Arguments for application patching.
#[derive(Args, Debug, Clone)]
pub struct PatchApplicationArgs {
    /// Application UUID.
    pub uuid: String,

    /// New container image URL.
    #[arg(long)]
    pub image_url: Option<String>,

    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    /// File with one KEY=VALUE per line; replaces -e.
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Environment variable.
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Deployment rule.
    #[arg(short, long = "rule", value_name = "TAG=WEIGHT")]
    pub rules: Vec<String>,

    /// Label.
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// Metadata, a JSON object.
    #[arg(short, long)]
    pub metadata: Option<String>,
}

/// Deployment subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DeploymentCommands {
    /// List deployments of an application.
    List {
        /// Application UUID.
        application_uuid: String,
    },

    /// Show one deployment.
    Show {
        /// Application UUID.
        application_uuid: String,
        /// Deployment UUID.
        deployment_uuid: String,
    },
}

/// Location subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum LocationCommands {
    /// Add a location.
    Add {
        /// Cloud provider, e.g. amazon.
        provider: String,
        /// Provider region identifier, e.g. us-east-1.
        identifier: String,
    },

    /// Archive a location.
    Archive {
        /// Cloud provider.
        provider: String,
        /// Provider region identifier.
        identifier: String,
    },

    /// List locations.
    List {
        /// Only this provider.
        #[arg(long)]
        provider: Option<String>,
        /// Only this region; requires --provider.
        #[arg(long)]
        identifier: Option<String>,
    },
}

/// Pool subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum PoolCommands {
    /// Request a pool in a location.
    Create {
        /// Location identifier.
        location: String,
    },

    /// Archive a pool.
    Archive {
        /// Pool UUID.
        uuid: String,
    },

    /// List pools.
    List,

    /// Show pool details.
    Show {
        /// Pool UUID.
        uuid: String,
    },
}

/// Secret subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SecretCommands {
    /// Store a secret.
    Create {
        /// Secret value.
        value: String,

        /// Label.
        #[arg(short, long = "label")]
        labels: Vec<String>,
    },

    /// List secrets.
    List,

    /// Show a secret.
    Show {
        /// Secret UUID.
        uuid: String,
    },
}
