//! Client configuration.
//!
//! Configuration lives in an INI file, by default `~/.kumoru/config`:
//!
//! ```ini
//! [endpoints]
//! kumoru_application_api = https://application.api.kumoru.io
//! kumoru_authorization_api = https://authorization.api.kumoru.io
//! kumoru_location_api = https://location.api.kumoru.io
//! kumoru_pool_api = https://pool.api.kumoru.io
//!
//! [tokens]
//! kumoru_token_public = <uuid>
//! kumoru_token_private = <secret>
//!
//! [auth]
//! active_role = <role uuid>
//! ```
//!
//! Endpoints fall back to environment variables and then to the public
//! defaults. Tokens and the active role have no fallback; a client without
//! them can still make the unsigned bootstrap calls.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "KUMORU_CONFIG";

/// Environment variable enabling request/response dumps.
pub const DEBUG_ENV: &str = "KUMORU_SDK_DEBUG";

/// Section holding service endpoints.
pub const ENDPOINTS_SECTION: &str = "endpoints";

/// Section holding the token pair.
pub const TOKENS_SECTION: &str = "tokens";

/// Section holding the active role.
pub const AUTH_SECTION: &str = "auth";

const PUBLIC_TOKEN_KEY: &str = "kumoru_token_public";
const PRIVATE_TOKEN_KEY: &str = "kumoru_token_private";
const ACTIVE_ROLE_KEY: &str = "active_role";
const USERNAME_KEY: &str = "kumoru_username";
const PASSWORD_KEY: &str = "kumoru_password";

/// Endpoint key in the INI file, its environment override, and its default.
struct EndpointSource {
    key: &'static str,
    env: &'static str,
    default: &'static str,
}

const APPLICATION: EndpointSource = EndpointSource {
    key: "kumoru_application_api",
    env: "APPLICATION_MANAGER_URL",
    default: "https://application.api.kumoru.io",
};

const AUTHORIZATION: EndpointSource = EndpointSource {
    key: "kumoru_authorization_api",
    env: "AUTHORIZATION_MANAGER_URL",
    default: "https://authorization.api.kumoru.io",
};

const LOCATION: EndpointSource = EndpointSource {
    key: "kumoru_location_api",
    env: "LOCATION_MANAGER_URL",
    default: "https://location.api.kumoru.io",
};

const POOL: EndpointSource = EndpointSource {
    key: "kumoru_pool_api",
    env: "POOL_MANAGER_URL",
    default: "https://pool.api.kumoru.io",
};

/// Returns the configuration file path.
///
/// `$KUMORU_CONFIG` wins when set; otherwise `~/.kumoru/config`.
///
/// # Errors
///
/// Returns an error if neither the variable nor a home directory is available.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    dirs::home_dir()
        .map(|home| home.join(".kumoru").join("config"))
        .ok_or_else(|| Error::Config {
            reason: format!("no home directory found and {CONFIG_ENV} is not set"),
        })
}

fn load_section(path: &Path, section: &str) -> Result<Properties> {
    let ini = Ini::load_from_file(path)?;
    ini.section(Some(section))
        .cloned()
        .ok_or_else(|| Error::MissingSection {
            section: section.to_string(),
            path: path.display().to_string(),
        })
}

fn get_or_empty(props: &Properties, key: &str) -> String {
    props.get(key).unwrap_or_default().to_string()
}

/// Base URLs for each platform service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Application service.
    pub application: String,
    /// Authorization service (accounts, tokens, secrets, resources).
    pub authorization: String,
    /// Location service.
    pub location: String,
    /// Pool service.
    pub pool: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            application: APPLICATION.default.to_string(),
            authorization: AUTHORIZATION.default.to_string(),
            location: LOCATION.default.to_string(),
            pool: POOL.default.to_string(),
        }
    }
}

impl Endpoints {
    /// Loads endpoints from `section` of the file at `path`.
    ///
    /// Never fails: an unreadable file or missing section falls back to the
    /// environment and the built-in defaults.
    pub fn load(path: &Path, section: &str) -> Self {
        let props = match load_section(path, section) {
            Ok(props) => Some(props),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "using default endpoints");
                None
            }
        };

        Self::resolve(props.as_ref(), |name| std::env::var(name).ok())
    }

    /// Resolves every endpoint: file value, then environment, then default.
    pub fn resolve<F>(props: Option<&Properties>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |source: &EndpointSource| {
            props
                .and_then(|p| p.get(source.key))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| env(source.env).filter(|v| !v.is_empty()))
                .unwrap_or_else(|| source.default.to_string())
        };

        Self {
            application: pick(&APPLICATION),
            authorization: pick(&AUTHORIZATION),
            location: pick(&LOCATION),
            pool: pick(&POOL),
        }
    }
}

/// Public/private token pair used to sign requests.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Public half, sent with every signed request.
    pub public: String,
    /// Private half, the HMAC key. Never leaves the client.
    pub private: String,
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("public", &self.public)
            .field("private", &"<redacted>")
            .finish()
    }
}

impl Tokens {
    /// Creates a token pair.
    pub fn new(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: private.into(),
        }
    }

    /// Whether both halves are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.public.is_empty() && !self.private.is_empty()
    }

    /// Loads tokens from `section` of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the section is missing.
    pub fn load(path: &Path, section: &str) -> Result<Self> {
        let props = load_section(path, section)?;
        Ok(Self {
            public: get_or_empty(&props, PUBLIC_TOKEN_KEY),
            private: get_or_empty(&props, PRIVATE_TOKEN_KEY),
        })
    }

    /// Stores tokens in `section` of the file at `path`, keeping other sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path, section: &str) -> Result<()> {
        set_keys(
            path,
            section,
            &[
                (PUBLIC_TOKEN_KEY, self.public.as_str()),
                (PRIVATE_TOKEN_KEY, self.private.as_str()),
            ],
        )
    }
}

/// Whether the file at `path` holds a complete token pair in `section`.
pub fn has_tokens(path: &Path, section: &str) -> bool {
    Tokens::load(path, section).is_ok_and(|t| t.is_complete())
}

/// Loads the active role UUID.
///
/// # Errors
///
/// Returns an error if the file, section, or `active_role` key is missing.
pub fn load_role(path: &Path, section: &str) -> Result<String> {
    let props = load_section(path, section)?;
    props
        .get(ACTIVE_ROLE_KEY)
        .map(str::to_string)
        .ok_or_else(|| Error::Config {
            reason: format!("no {ACTIVE_ROLE_KEY} in [{section}]"),
        })
}

/// Stores the active role UUID.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_role(path: &Path, section: &str, role_uuid: &str) -> Result<()> {
    set_keys(path, section, &[(ACTIVE_ROLE_KEY, role_uuid)])
}

fn set_keys(path: &Path, section: &str, pairs: &[(&str, &str)]) -> Result<()> {
    let mut ini = if path.exists() {
        Ini::load_from_file(path)?
    } else {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        Ini::new()
    };

    let mut setter = ini.with_section(Some(section));
    for (key, value) in pairs {
        setter.set(*key, *value);
    }

    ini.write_to_file(path)?;
    debug!(path = %path.display(), section, "configuration saved");
    Ok(())
}

/// Username/password pair stored in the configuration file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Account username (email).
    pub username: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Loads credentials from `section`.
    ///
    /// A missing section or a missing key yields empty credentials; only an
    /// unreadable file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path, section: &str) -> Result<Self> {
        let ini = Ini::load_from_file(path)?;
        let Some(props) = ini.section(Some(section)) else {
            return Ok(Self::default());
        };

        match (props.get(USERNAME_KEY), props.get(PASSWORD_KEY)) {
            (Some(username), Some(password)) => Ok(Self {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Ok(Self::default()),
        }
    }
}

/// Everything a [`Client`](crate::Client) needs: endpoints, tokens, and role.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File the configuration was read from.
    pub path: PathBuf,
    /// Service endpoints.
    pub endpoints: Endpoints,
    /// Signing tokens; empty when none are stored.
    pub tokens: Tokens,
    /// Active role, sent as the request context.
    pub role_uuid: String,
    /// Dump requests and responses at debug level.
    pub debug: bool,
}

impl Config {
    /// Loads configuration from [`config_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration path can be determined.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(config_path()?))
    }

    /// Loads configuration from `path`.
    ///
    /// Missing tokens or role are reported as warnings; the config is still
    /// usable for unsigned calls.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let endpoints = Endpoints::load(&path, ENDPOINTS_SECTION);

        let tokens = Tokens::load(&path, TOKENS_SECTION).unwrap_or_else(|e| {
            warn!(error = %e, "No tokens found.");
            Tokens::default()
        });

        let role_uuid = load_role(&path, AUTH_SECTION).unwrap_or_else(|e| {
            warn!(error = %e, "No active role found. Generate a new token.");
            String::new()
        });

        let debug = std::env::var(DEBUG_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("true"));

        Self {
            path,
            endpoints,
            tokens,
            role_uuid,
            debug,
        }
    }

    /// Replaces the tokens, e.g. right after issuing a new pair.
    #[must_use]
    pub fn with_tokens(mut self, tokens: Tokens) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replaces the endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replaces the active role.
    #[must_use]
    pub fn with_role(mut self, role_uuid: impl Into<String>) -> Self {
        self.role_uuid = role_uuid.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const EXAMPLE: &str = "\
[endpoints]
kumoru_application_api = http://application.kumoru.io
kumoru_authorization_api = http://authorization.kumoru.io:5000
kumoru_location_api = http://location.kumoru.io:5000
kumoru_pool_api = http://pool.kumoru.io:5000

[tokens]
kumoru_token_public = PUBLIC_TOKEN
kumoru_token_private = PRIVATE_TOKEN

[auth]
active_role = 4b1f6a2e-0000-4000-8000-000000000001

[credentials]
kumoru_username = USER
kumoru_password = SECRET

[missing-password]
kumoru_username = USER
";

    fn write_example(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config");
        fs::write(&path, EXAMPLE).expect("write example config");
        path
    }

    #[test]
    fn test_load_endpoints_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        let endpoints = Endpoints::load(&path, ENDPOINTS_SECTION);
        assert_eq!(endpoints.application, "http://application.kumoru.io");
        assert_eq!(endpoints.authorization, "http://authorization.kumoru.io:5000");
        assert_eq!(endpoints.location, "http://location.kumoru.io:5000");
        assert_eq!(endpoints.pool, "http://pool.kumoru.io:5000");
    }

    #[test]
    fn test_resolve_endpoints_defaults() {
        let endpoints = Endpoints::resolve(None, |_| None);
        assert_eq!(endpoints, Endpoints::default());
        assert_eq!(endpoints.application, "https://application.api.kumoru.io");
    }

    #[test]
    fn test_resolve_endpoints_env_overrides_default() {
        let env: HashMap<&str, &str> = [("APPLICATION_MANAGER_URL", "http://localhost:9000")]
            .into_iter()
            .collect();

        let endpoints = Endpoints::resolve(None, |k| env.get(k).map(ToString::to_string));
        assert_eq!(endpoints.application, "http://localhost:9000");
        assert_eq!(endpoints.authorization, "https://authorization.api.kumoru.io");
    }

    #[test]
    fn test_resolve_endpoints_file_beats_env() {
        let ini = Ini::load_from_str(
            "[endpoints]\nkumoru_application_api = http://from-file\nkumoru_pool_api =\n",
        )
        .expect("parse");
        let props = ini.section(Some("endpoints"));

        let endpoints = Endpoints::resolve(props, |k| match k {
            "APPLICATION_MANAGER_URL" => Some("http://from-env".into()),
            "POOL_MANAGER_URL" => Some("http://pool-env".into()),
            _ => None,
        });

        assert_eq!(endpoints.application, "http://from-file");
        // Empty file value falls through to the environment.
        assert_eq!(endpoints.pool, "http://pool-env");
    }

    #[test]
    fn test_load_tokens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        let tokens = Tokens::load(&path, TOKENS_SECTION).expect("tokens");
        assert_eq!(tokens.public, "PUBLIC_TOKEN");
        assert_eq!(tokens.private, "PRIVATE_TOKEN");
        assert!(has_tokens(&path, TOKENS_SECTION));
    }

    #[test]
    fn test_load_tokens_file_not_found() {
        let result = Tokens::load(Path::new("/nonexistent/kumoru/config"), TOKENS_SECTION);
        assert!(result.is_err());
        assert!(!has_tokens(Path::new("/nonexistent/kumoru/config"), TOKENS_SECTION));
    }

    #[test]
    fn test_load_tokens_missing_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        let err = Tokens::load(&path, "nope").expect_err("missing section");
        assert!(matches!(err, Error::MissingSection { .. }));
    }

    #[test]
    fn test_save_tokens_creates_directory_and_preserves_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".kumoru").join("config");

        save_role(&path, AUTH_SECTION, "role-1").expect("save role");
        Tokens::new("pub", "priv")
            .save(&path, TOKENS_SECTION)
            .expect("save tokens");

        assert_eq!(load_role(&path, AUTH_SECTION).expect("role"), "role-1");
        let tokens = Tokens::load(&path, TOKENS_SECTION).expect("tokens");
        assert_eq!(tokens, Tokens::new("pub", "priv"));
    }

    #[test]
    fn test_save_tokens_overwrites_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        Tokens::new("new-pub", "new-priv")
            .save(&path, TOKENS_SECTION)
            .expect("save");

        let tokens = Tokens::load(&path, TOKENS_SECTION).expect("tokens");
        assert_eq!(tokens.public, "new-pub");
        // Unrelated sections survive the rewrite.
        let endpoints = Endpoints::load(&path, ENDPOINTS_SECTION);
        assert_eq!(endpoints.application, "http://application.kumoru.io");
    }

    #[test]
    fn test_has_tokens_requires_both_halves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config");
        fs::write(&path, "[tokens]\nkumoru_token_public = abc\n").expect("write");

        assert!(!has_tokens(&path, TOKENS_SECTION));
    }

    #[test]
    fn test_load_credentials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        let creds = Credentials::load(&path, "credentials").expect("creds");
        assert_eq!(creds.username, "USER");
        assert_eq!(creds.password, "SECRET");
    }

    #[test]
    fn test_load_credentials_missing_password() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        let creds = Credentials::load(&path, "missing-password").expect("no error");
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn test_load_credentials_file_not_found() {
        assert!(Credentials::load(Path::new("/nonexistent/config"), "credentials").is_err());
    }

    #[test]
    fn test_config_load_from_missing_file_is_usable() {
        let config = Config::load_from("/nonexistent/kumoru/config");
        assert_eq!(config.endpoints.authorization, Endpoints::default().authorization);
        assert!(!config.tokens.is_complete());
        assert!(config.role_uuid.is_empty());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_example(&dir);

        let config = Config::load_from(&path);
        assert_eq!(config.path, path);
        assert_eq!(config.tokens.public, "PUBLIC_TOKEN");
        assert_eq!(config.role_uuid, "4b1f6a2e-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_tokens_debug_redacts_private() {
        let rendered = format!("{:?}", Tokens::new("pub", "super-secret"));
        assert!(rendered.contains("pub"));
        assert!(!rendered.contains("super-secret"));
    }
}
