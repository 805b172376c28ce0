//! Publish error types.

use std::path::PathBuf;

use crate::convert::ConvertError;
use crate::git::GitError;

/// Errors that can occur while publishing.
#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("git error: {0}")]
    Git(#[from] GitError),

    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("converter '{converter}' reported success but did not write {path}")]
    MissingOutput { converter: String, path: PathBuf },

    #[error("step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<PublishError>,
    },
}

impl PublishError {
    /// Attach the name of the step that produced this error.
    pub fn in_step(self, step: &'static str) -> Self {
        Self::Step {
            step,
            source: Box::new(self),
        }
    }

    /// Name of the failing step, if known.
    pub fn step(&self) -> Option<&'static str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}
