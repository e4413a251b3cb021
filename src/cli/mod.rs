//! Command line interface
//!
//! Argument types, command implementations, output formatting, and the
//! top-level error handler that maps failures to exit codes.

pub mod commands;
pub mod output;
pub mod service;
pub mod types;

use serde_json::json;

use crate::domain::errors::{DomainError, ErrorKind};
use crate::infrastructure::config::ConfigError;

pub use output::progress::{create_spinner, ProgressBarExt};
pub use types::{Cli, Commands};

/// Classification of a command failure for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Domain(ErrorKind),
    Other,
}

impl FailureKind {
    pub fn of(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(domain) = cause.downcast_ref::<DomainError>() {
                return Self::Domain(domain.kind());
            }
            if cause.is::<ConfigError>() || cause.is::<figment::Error>() {
                return Self::Domain(ErrorKind::Configuration);
            }
        }
        Self::Other
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain(kind) => kind.as_str(),
            Self::Other => "internal",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Domain(ErrorKind::Configuration) => 2,
            Self::Domain(ErrorKind::SourceRead) => 3,
            Self::Domain(ErrorKind::Provider) => 4,
            Self::Other => 1,
        }
    }

    /// Whether re-running the same command unchanged may succeed
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Domain(ErrorKind::Provider))
    }
}

/// Report a failed command and exit with a code derived from its kind
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let kind = FailureKind::of(&err);
    tracing::error!(kind = kind.as_str(), error = %format!("{err:#}"), "command failed");

    if json_mode {
        let body = json!({
            "error": {
                "kind": kind.as_str(),
                "message": format!("{err:#}"),
                "retryable": kind.is_retryable(),
            }
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!(
            "{} {err:#}",
            console::style(format!("error[{}]:", kind.as_str())).red().bold()
        );
    }

    std::process::exit(kind.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_failure_kind_through_context() {
        let err = Err::<(), _>(DomainError::SourceRead {
            path: PathBuf::from("tos.txt"),
            reason: "not found".to_string(),
        })
        .context("ingest failed")
        .unwrap_err();

        let kind = FailureKind::of(&err);
        assert_eq!(kind, FailureKind::Domain(ErrorKind::SourceRead));
        assert_eq!(kind.exit_code(), 3);
    }

    #[test]
    fn test_config_errors_are_configuration() {
        let err = anyhow::Error::new(ConfigError::EmptyNamespace);
        assert_eq!(FailureKind::of(&err).exit_code(), 2);

        let missing = anyhow::Error::new(DomainError::MissingCredential("llm".to_string()));
        assert_eq!(FailureKind::of(&missing).as_str(), "configuration");
    }

    #[test]
    fn test_unknown_error_is_internal() {
        let kind = FailureKind::of(&anyhow::anyhow!("boom"));
        assert_eq!(kind, FailureKind::Other);
        assert_eq!(kind.exit_code(), 1);
        assert!(!kind.is_retryable());
    }
}
