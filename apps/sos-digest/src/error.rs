//! Error types for sos-digest.
//!
//! Only configuration problems and output failures are errors. Missing and
//! unreadable sosreport inputs are statuses carried in the results.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    /// A category or issue definition failed validation.
    #[error("invalid {definition}: {reason}")]
    Config { definition: String, reason: String },

    #[error("cannot read rule index {}: {source}", path.display())]
    IndexRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule index {} is not valid TOML: {reason}", path.display())]
    IndexParse { path: PathBuf, reason: String },

    #[error("config file {} is invalid: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    pub(crate) fn config(definition: impl Into<String>, reason: impl Into<String>) -> Self {
        DigestError::Config {
            definition: definition.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code for the CLI: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            DigestError::Config { .. }
            | DigestError::IndexRead { .. }
            | DigestError::IndexParse { .. }
            | DigestError::ConfigFile { .. } => 2,
            DigestError::Write { .. } => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_split_config_from_output_failures() {
        let write = DigestError::Write {
            path: PathBuf::from("/out/01_system_overview.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(write.exit_code(), 1);
        assert!(write.to_string().starts_with("failed to write /out/01_system_overview.md"));
        assert_eq!(DigestError::config("category 'x'", "bad").exit_code(), 2);
        let parse = DigestError::IndexParse {
            path: PathBuf::from("i.toml"),
            reason: "eof".into(),
        };
        assert_eq!(parse.exit_code(), 2);
    }
}
