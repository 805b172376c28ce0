//! Publish context for sharing state across steps.

use serde::Serialize;

use crate::config::PublishConfig;
use crate::convert::Converter;
use crate::git::Workspace;

/// Shared context for publish steps.
pub struct PublishContext<'a> {
    /// Repository being published
    pub workspace: &'a Workspace,

    /// Branches, paths, stylesheets, commit message
    pub config: &'a PublishConfig,

    /// Turns the document into the page
    pub converter: &'a dyn Converter,

    /// Filled in as steps complete
    pub report: PublishReport,
}

impl<'a> PublishContext<'a> {
    pub fn new(
        workspace: &'a Workspace,
        config: &'a PublishConfig,
        converter: &'a dyn Converter,
    ) -> Self {
        Self {
            workspace,
            config,
            converter,
            report: PublishReport::default(),
        }
    }
}

/// What a publish run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishReport {
    /// Steps that finished, in order
    pub completed: Vec<&'static str>,

    /// Commit created on the publish branch
    pub commit: Option<String>,

    /// Size of the generated page in bytes
    pub page_bytes: Option<u64>,
}
