//! State shared by all commands.

use std::path::PathBuf;

use vswitch::config::{ConfigError, ConfigFile};
use vswitch::remote::{ArchiveClient, Credentials};

use crate::error::CliError;

/// Where the configuration lives and how to reach the archive.
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: PathBuf,
}

impl Context {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Load the configuration, pointing at `init` when there is none.
    pub fn load_config(&self) -> Result<ConfigFile, CliError> {
        match ConfigFile::load_from(&self.config_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(path)) => Err(CliError::Config(format!(
                "{} does not exist. Run 'vswitch init' to create it.",
                path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the configuration, using defaults only when the file does not
    /// exist yet. An unreadable or invalid file is an error.
    pub fn load_or_default(&self) -> Result<ConfigFile, CliError> {
        match ConfigFile::load_from(&self.config_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(ConfigFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Archive client for the configured URL and environment credentials.
    pub fn client(&self, config: &ConfigFile) -> Result<ArchiveClient, CliError> {
        let credentials = Credentials::from_env();
        if credentials.is_anonymous() {
            tracing::debug!("No archive credentials set, connecting anonymously");
        }
        Ok(ArchiveClient::new(config.remote.url.clone(), credentials)?)
    }
}
