//! Typed access to individual configuration settings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::{ConfigError, ConfigResult};
use super::file::{parse_bool, ConfigFile};

/// A settable configuration key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    VersionCurrent,
    PathsInstall,
    PathsCache,
    PathsSaves,
    RemoteUrl,
    FeaturesParallelProcessing,
    FeaturesFastDownload,
    FeaturesVerify,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::VersionCurrent,
            ConfigKey::PathsInstall,
            ConfigKey::PathsCache,
            ConfigKey::PathsSaves,
            ConfigKey::RemoteUrl,
            ConfigKey::FeaturesParallelProcessing,
            ConfigKey::FeaturesFastDownload,
            ConfigKey::FeaturesVerify,
        ]
    }

    /// `section.key` form.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::VersionCurrent => "version.current",
            ConfigKey::PathsInstall => "paths.install",
            ConfigKey::PathsCache => "paths.cache",
            ConfigKey::PathsSaves => "paths.saves",
            ConfigKey::RemoteUrl => "remote.url",
            ConfigKey::FeaturesParallelProcessing => "features.parallel_processing",
            ConfigKey::FeaturesFastDownload => "features.fast_download",
            ConfigKey::FeaturesVerify => "features.verify",
        }
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        self.name().split_once('.').unwrap_or(("", self.name()))
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::VersionCurrent => config.version.current.clone().unwrap_or_default(),
            ConfigKey::PathsInstall => config.paths.install.display().to_string(),
            ConfigKey::PathsCache => config.paths.cache.display().to_string(),
            ConfigKey::PathsSaves => config
                .paths
                .saves
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::RemoteUrl => config.remote.url.clone(),
            ConfigKey::FeaturesParallelProcessing => {
                config.features.parallel_processing.to_string()
            }
            ConfigKey::FeaturesFastDownload => config.features.fast_download.to_string(),
            ConfigKey::FeaturesVerify => config.features.verify.to_string(),
        }
    }

    /// Validate `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        match self {
            ConfigKey::VersionCurrent => {
                config.version.current = (!value.is_empty()).then(|| value.to_string());
            }
            ConfigKey::PathsInstall => config.paths.install = self.require_path(value)?,
            ConfigKey::PathsCache => config.paths.cache = self.require_path(value)?,
            ConfigKey::PathsSaves => {
                config.paths.saves = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ConfigKey::RemoteUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "must start with http:// or https://"));
                }
                config.remote.url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::FeaturesParallelProcessing => {
                config.features.parallel_processing = self.require_bool(value)?
            }
            ConfigKey::FeaturesFastDownload => {
                config.features.fast_download = self.require_bool(value)?
            }
            ConfigKey::FeaturesVerify => config.features.verify = self.require_bool(value)?,
        }
        Ok(())
    }

    fn require_path(&self, value: &str) -> ConfigResult<PathBuf> {
        if value.is_empty() {
            return Err(self.invalid(value, "path cannot be empty"));
        }
        Ok(PathBuf::from(value))
    }

    fn require_bool(&self, value: &str) -> ConfigResult<bool> {
        parse_bool(value).ok_or_else(|| self.invalid(value, "expected true or false"))
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_key_by_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!(
            "Features.Verify".parse::<ConfigKey>().unwrap(),
            ConfigKey::FeaturesVerify
        );
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "features.turbo".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(k)) if k == "features.turbo"
        ));
    }

    #[test]
    fn test_section_and_key_name() {
        let key = ConfigKey::FeaturesParallelProcessing;
        assert_eq!(key.section(), "features");
        assert_eq!(key.key_name(), "parallel_processing");
    }

    #[test]
    fn test_set_and_get_bool() {
        let mut config = ConfigFile::default();

        ConfigKey::FeaturesVerify.set(&mut config, "no").unwrap();
        assert!(!config.features.verify);
        assert_eq!(ConfigKey::FeaturesVerify.get(&config), "false");

        let err = ConfigKey::FeaturesVerify.set(&mut config, "sometimes").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_set_optional_values() {
        let mut config = ConfigFile::default();

        ConfigKey::VersionCurrent.set(&mut config, "1.1").unwrap();
        assert_eq!(config.version.current.as_deref(), Some("1.1"));
        ConfigKey::VersionCurrent.set(&mut config, "").unwrap();
        assert_eq!(config.version.current, None);

        ConfigKey::PathsSaves.set(&mut config, "/saves").unwrap();
        assert_eq!(ConfigKey::PathsSaves.get(&config), "/saves");
    }

    #[test]
    fn test_required_path_and_url_validation() {
        let mut config = ConfigFile::default();

        assert!(ConfigKey::PathsInstall.set(&mut config, "  ").is_err());
        assert!(ConfigKey::RemoteUrl.set(&mut config, "ftp://archive").is_err());

        ConfigKey::RemoteUrl
            .set(&mut config, "https://archive.example.com/app/")
            .unwrap();
        assert_eq!(config.remote.url, "https://archive.example.com/app");
    }
}
