//! Error Handling
//!
//! Error type definitions used across the organization tools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gh-org-admin
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {}", describe_api_error(.0))]
    GitHubApi(#[from] octocrab::Error),

    /// The requested repository, branch or label does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration validation error: {0}")]
    ConfigValidation(String),

    #[error("Label validation error: {0}")]
    LabelValidation(String),

    #[error("Authentication failed: invalid token")]
    AuthenticationFailed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid repository format: {0} (expected 'owner/repo')")]
    InvalidRepositoryFormat(String),

    #[error("Invalid label color: {0} (expected 6-digit hex, optionally prefixed with #)")]
    InvalidLabelColor(String),
}

impl Error {
    /// Create a new configuration validation error
    pub fn config_validation<S: Into<String>>(message: S) -> Self {
        Error::ConfigValidation(message.into())
    }

    /// Create a new label validation error
    pub fn label_validation<S: Into<String>>(message: S) -> Self {
        Error::LabelValidation(message.into())
    }

    /// Whether the remote reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Render an octocrab error with the response message and status when present
fn describe_api_error(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            format!("{} (HTTP {})", source.message, source.status_code.as_u16())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("owner/repo".to_string()).is_not_found());
        assert!(!Error::AuthenticationFailed.is_not_found());
        assert!(!Error::config_validation("bad").is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidRepositoryFormat("nope".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid repository format: nope (expected 'owner/repo')"
        );

        let err = Error::NotFound("branch master in owner/repo".to_string());
        assert_eq!(err.to_string(), "Not found: branch master in owner/repo");
    }
}
