//! Document converters.
//!
//! A converter turns the materialized document into a standalone HTML page
//! that links (never embeds) an ordered list of stylesheets.

mod markdown;
mod pandoc;

use std::path::{Path, PathBuf};

pub use markdown::BuiltinConverter;
pub use pandoc::PandocConverter;

use crate::config::{ConverterConfig, ConverterKind};

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("failed to run converter '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("converter '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Something that can turn a document into an HTML page.
pub trait Converter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Convert `input` into a standalone page at `output`, linking each of
    /// `stylesheets` in order.
    fn convert(&self, input: &Path, output: &Path, stylesheets: &[String])
    -> Result<(), ConvertError>;
}

/// Build the converter selected in the config.
pub fn from_config(config: &ConverterConfig) -> Box<dyn Converter> {
    match config.kind {
        ConverterKind::Pandoc => Box::new(PandocConverter::new(
            config.program.clone(),
            config.args.clone(),
        )),
        ConverterKind::Builtin => Box::new(BuiltinConverter::new(
            config.extensions.clone(),
            config.title.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_picks_kind() {
        let mut config = ConverterConfig::default();
        assert_eq!(from_config(&config).name(), "pandoc");

        config.kind = ConverterKind::Builtin;
        assert_eq!(from_config(&config).name(), "builtin");
    }

    #[test]
    fn test_from_config_uses_program_name() {
        let config = ConverterConfig {
            program: "/opt/pandoc/bin/pandoc".to_string(),
            ..ConverterConfig::default()
        };
        assert_eq!(from_config(&config).name(), "/opt/pandoc/bin/pandoc");
    }
}
