//! Configuration loading and types for pagecast.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files (`load`)
//! - Checking that a loaded config can drive a publish run (`validate`)

mod load;
mod types;

use std::path::{Component, Path};

// Re-export all types for convenient access
pub use load::DEFAULT_CONFIG_FILE;
pub use types::{ConverterConfig, ConverterKind, FailurePolicy, PublishConfig};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("{0}")]
    Validation(String),
}

// =============================================================================
// Validation
// =============================================================================

impl PublishConfig {
    /// Reject settings that would make the publish steps trample each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.main_branch.trim().is_empty() || self.publish_branch.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'main_branch' and 'publish_branch' must not be empty".to_string(),
            ));
        }
        if self.main_branch == self.publish_branch {
            return Err(ConfigError::Validation(format!(
                "invalid config: main and publish branch are both '{}'",
                self.main_branch
            )));
        }

        check_repo_path("document", &self.document)?;
        check_repo_path("output", &self.output)?;
        if self.document == self.output {
            return Err(ConfigError::Validation(format!(
                "invalid config: 'document' and 'output' are both '{}'",
                self.document.display()
            )));
        }

        if self.stylesheets.is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: at least one stylesheet is required\n\nExample:\n  stylesheets:\n    - css/base.css".to_string(),
            ));
        }
        if self.commit_message.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'commit_message' must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// A repository path must be relative and stay inside the work tree.
fn check_repo_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!(
            "invalid config: '{field}' must not be empty"
        )));
    }
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::Validation(format!(
            "invalid config: '{field}' must be a relative path inside the repository, got '{}'",
            path.display()
        )));
    }
    Ok(())
}
