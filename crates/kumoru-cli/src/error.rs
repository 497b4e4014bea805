//! CLI error types.

use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A platform call failed.
    #[error("could not {action}: {source}")]
    Request {
        /// What the command was doing, e.g. "create application".
        action: &'static str,
        /// Underlying client error.
        #[source]
        source: kumoru_sdk::Error,
    },

    /// Configuration could not be read or written.
    #[error(transparent)]
    Sdk(#[from] kumoru_sdk::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The command refused to run.
    #[error("{0}")]
    Refused(String),

    /// Reading interactive input failed.
    #[error("could not read {what}: {source}")]
    Prompt {
        /// What was being read.
        what: &'static str,
        /// Terminal error.
        #[source]
        source: std::io::Error,
    },

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Wraps a client error with the action that failed.
    pub fn request(action: &'static str) -> impl FnOnce(kumoru_sdk::Error) -> Self {
        move |source| Self::Request { action, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumoru_sdk::client::StatusCode;

    #[test]
    fn request_error_names_action() {
        let err = CliError::request("create application")(kumoru_sdk::Error::Api {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: "quota exceeded".into(),
        });
        assert_eq!(
            err.to_string(),
            "could not create application: 422 Unprocessable Entity: quota exceeded"
        );
    }

    #[test]
    fn invalid_argument_display() {
        let err = CliError::InvalidArgument("rule weight must be an integer".into());
        assert_eq!(err.to_string(), "invalid argument: rule weight must be an integer");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }
}
