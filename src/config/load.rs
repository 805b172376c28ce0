//! Configuration loading from files.
//!
//! The config file is optional: missing fields (or a missing file) fall back
//! to the defaults in `types`.

use std::path::Path;

use config::{File, FileFormat};

use super::{ConfigError, PublishConfig};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "pagecast.yaml";

impl PublishConfig {
    /// Load the config from the command line argument, defaulting to `pagecast.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file)
    }

    /// Load the config from a file path, treating a missing file as empty.
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .build()?;

        let config: PublishConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
