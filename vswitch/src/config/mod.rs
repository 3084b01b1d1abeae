//! Persistent configuration.
//!
//! Settings live in an INI file, by default `config.ini` under the user's
//! configuration directory. Individual settings are addressed with
//! [`ConfigKey`] for the `config get`/`config set` commands.

mod error;
mod file;
mod keys;

pub use error::{ConfigError, ConfigResult};
pub use file::{
    config_file_path, default_cache_dir, ConfigFile, FeatureSettings, PathSettings,
    RemoteSettings, VersionSettings,
};
pub use keys::ConfigKey;
