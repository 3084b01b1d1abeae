//! The INI configuration file.
//!
//! ```ini
//! [version]
//! current = 1.2
//!
//! [paths]
//! install = /games/app
//! cache = /games/app Version Cache
//! saves =
//!
//! [remote]
//! url = https://archive.example.com/app
//!
//! [features]
//! parallel_processing = true
//! fast_download = true
//! verify = true
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use crate::remote::DEFAULT_ARCHIVE_URL;

const SECTION_VERSION: &str = "version";
const SECTION_PATHS: &str = "paths";
const SECTION_REMOTE: &str = "remote";
const SECTION_FEATURES: &str = "features";

/// Location of the configuration file.
///
/// `<config dir>/vswitch/config.ini`, falling back to the working directory
/// on platforms without a configuration directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vswitch")
        .join("config.ini")
}

/// Default cache directory for an installation.
///
/// A sibling of the installation named `<install> Version Cache`, so the
/// cache shares its volume and moves are plain renames.
pub fn default_cache_dir(install: &Path) -> PathBuf {
    match install.file_name() {
        Some(name) => install.with_file_name(format!("{} Version Cache", name.to_string_lossy())),
        None => install.join("Version Cache"),
    }
}

/// `[version]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSettings {
    /// Last version this tool installed.
    pub current: Option<String>,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    /// Root of the installation.
    pub install: PathBuf,
    /// Root of the variant cache.
    pub cache: PathBuf,
    /// Save-data directory, if any.
    pub saves: Option<PathBuf>,
}

/// `[remote]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Archive base URL.
    pub url: String,
}

/// `[features]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSettings {
    /// Migrate files concurrently.
    pub parallel_processing: bool,
    /// Download with progress reporting.
    pub fast_download: bool,
    /// Verify placed files against the checksum manifest.
    pub verify: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            parallel_processing: true,
            fast_download: true,
            verify: true,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub version: VersionSettings,
    pub paths: PathSettings,
    pub remote: RemoteSettings,
    pub features: FeatureSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::for_install(PathBuf::from("."), None)
    }
}

impl ConfigFile {
    /// Defaults for an installation at `install`.
    pub fn for_install(install: PathBuf, current: Option<String>) -> Self {
        Self {
            version: VersionSettings { current },
            paths: PathSettings {
                cache: default_cache_dir(&install),
                install,
                saves: None,
            },
            remote: RemoteSettings {
                url: DEFAULT_ARCHIVE_URL.to_string(),
            },
            features: FeatureSettings::default(),
        }
    }

    /// Load from the default location.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. Missing keys take their default values.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let config = Self::parse(&text).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, String> {
        let ini = Ini::load_from_str_opt(text, parse_options()).map_err(|e| e.to_string())?;
        let get = |section: &str, key: &str| {
            ini.get_from(Some(section), key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str, default: bool| match get(SECTION_FEATURES, key) {
            None => Ok(default),
            Some(v) => parse_bool(v)
                .ok_or_else(|| format!("{}.{}: '{}' is not a boolean", SECTION_FEATURES, key, v)),
        };

        let install = get(SECTION_PATHS, "install")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let defaults = FeatureSettings::default();

        Ok(Self {
            version: VersionSettings {
                current: get(SECTION_VERSION, "current").map(str::to_string),
            },
            paths: PathSettings {
                cache: get(SECTION_PATHS, "cache")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_cache_dir(&install)),
                saves: get(SECTION_PATHS, "saves").map(PathBuf::from),
                install,
            },
            remote: RemoteSettings {
                url: get(SECTION_REMOTE, "url")
                    .unwrap_or(DEFAULT_ARCHIVE_URL)
                    .to_string(),
            },
            features: FeatureSettings {
                parallel_processing: flag("parallel_processing", defaults.parallel_processing)?,
                fast_download: flag("fast_download", defaults.fast_download)?,
                verify: flag("verify", defaults.verify)?,
            },
        })
    }

    /// Save to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Write to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_ini_string()).map_err(io_err)?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Render as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION_VERSION))
            .set("current", self.version.current.clone().unwrap_or_default());
        ini.with_section(Some(SECTION_PATHS))
            .set("install", self.paths.install.display().to_string())
            .set("cache", self.paths.cache.display().to_string())
            .set(
                "saves",
                self.paths
                    .saves
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            );
        ini.with_section(Some(SECTION_REMOTE))
            .set("url", self.remote.url.clone());
        ini.with_section(Some(SECTION_FEATURES))
            .set("parallel_processing", self.features.parallel_processing.to_string())
            .set("fast_download", self.features.fast_download.to_string())
            .set("verify", self.features.verify.to_string());

        let mut out = Vec::new();
        let options = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..WriteOption::default()
        };
        // Writing into a Vec cannot fail.
        let _ = ini.write_to_opt(&mut out, options);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Backslashes are literal so Windows paths survive a round trip.
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Parse a boolean the way hand-edited files spell them.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_cache_is_sibling_of_install() {
        assert_eq!(
            default_cache_dir(Path::new("/games/Legion")),
            PathBuf::from("/games/Legion Version Cache")
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");
        let mut config = ConfigFile::for_install(PathBuf::from("/games/app"), Some("1.2".into()));
        config.paths.saves = Some(PathBuf::from("/saves"));
        config.features.fast_download = false;

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = ConfigFile::parse("[paths]\ninstall = /games/app\n").unwrap();

        assert_eq!(config.version.current, None);
        assert_eq!(config.paths.cache, PathBuf::from("/games/app Version Cache"));
        assert_eq!(config.paths.saves, None);
        assert_eq!(config.remote.url, DEFAULT_ARCHIVE_URL);
        assert_eq!(config.features, FeatureSettings::default());
    }

    #[test]
    fn test_windows_paths_keep_backslashes() {
        let text = "[paths]\ninstall = C:\\Games\\App\ncache = D:\\Cache\n";
        let config = ConfigFile::parse(text).unwrap();

        assert_eq!(config.paths.install, PathBuf::from("C:\\Games\\App"));
        assert_eq!(config.paths.cache, PathBuf::from("D:\\Cache"));

        let again = ConfigFile::parse(&config.to_ini_string()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_invalid_boolean_is_rejected() {
        let err = ConfigFile::parse("[features]\nverify = maybe\n").unwrap_err();
        assert!(err.contains("features.verify"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ConfigFile::load_from(&temp.path().join("absent.ini"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_parse_bool_spellings() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("2"), None);
    }
}
