//! Configuration type definitions.
//!
//! These types are pure data - no I/O or complex logic. Every field has a
//! default so an absent or partial `pagecast.yaml` still yields a complete
//! configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Publish settings
// =============================================================================

/// Settings for one publish run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Branch holding the source document
    pub main_branch: String,

    /// Branch whose tree holds only the generated page
    pub publish_branch: String,

    /// Document path, relative to the repository root
    pub document: PathBuf,

    /// Generated page path, relative to the repository root
    pub output: PathBuf,

    /// Stylesheets linked from the generated page, in order
    pub stylesheets: Vec<String>,

    /// Message used for every publish commit
    pub commit_message: String,

    /// What to do when a step fails
    pub on_failure: FailurePolicy,

    /// Converter settings
    pub converter: ConverterConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            main_branch: "master".to_string(),
            publish_branch: "gh-pages".to_string(),
            document: PathBuf::from("README.md"),
            output: PathBuf::from("index.html"),
            stylesheets: vec![
                "css/normalize.css".to_string(),
                "css/base.css".to_string(),
                "css/layout.css".to_string(),
                "css/theme.css".to_string(),
            ],
            commit_message: "Regenerate index.html from README.md".to_string(),
            on_failure: FailurePolicy::default(),
            converter: ConverterConfig::default(),
        }
    }
}

/// Behavior after a step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop immediately and leave the repository as the failed step left it
    #[default]
    Halt,
    /// Stop, then try to switch back to the main branch
    Restore,
}

// =============================================================================
// Converter settings
// =============================================================================

/// Which converter turns the document into HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// External pandoc-compatible program
    #[default]
    Pandoc,
    /// In-process markdown renderer
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub kind: ConverterKind,

    /// Program to run for the external converter
    pub program: String,

    /// Extra arguments passed to the external converter before the input path
    pub args: Vec<String>,

    /// Page title; the built-in converter falls back to the first heading
    pub title: Option<String>,

    /// Markdown extensions enabled in the built-in converter
    pub extensions: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            kind: ConverterKind::default(),
            program: "pandoc".to_string(),
            args: Vec::new(),
            title: None,
            extensions: vec![
                "tables".to_string(),
                "strikethrough".to_string(),
                "footnotes".to_string(),
                "tasklists".to_string(),
            ],
        }
    }
}
