//! CLI error type.

use std::fmt;

use vswitch::checksum::ChecksumError;
use vswitch::config::ConfigError;
use vswitch::migrate::MigrateError;
use vswitch::remote::RemoteError;
use vswitch::resolve::ResolveError;
use vswitch::version::VersionError;

/// Errors surfaced to the operator.
#[derive(Debug)]
pub enum CliError {
    /// Configuration missing, invalid or unusable.
    Config(String),
    /// Reading or writing the configuration file failed.
    ConfigFile(ConfigError),
    /// The archive could not be reached or answered badly.
    Remote(RemoteError),
    /// A version label is not published.
    Version(VersionError),
    /// Checksum manifest or installed-version detection failed.
    Checksum(ChecksumError),
    /// Resolving a single file failed.
    Resolve(ResolveError),
    /// The migration stopped; some files may already be switched.
    Migrate(MigrateError),
    /// The interactive prompt failed.
    Prompt(String),
    /// Logging could not be set up.
    Logging(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Remote(e) => write!(f, "Archive error: {}", e),
            CliError::Version(e) => write!(f, "Version error: {}", e),
            CliError::Checksum(e) => write!(f, "Checksum error: {}", e),
            CliError::Resolve(e) => write!(f, "Resolution failed: {}", e),
            CliError::Migrate(e) => write!(
                f,
                "Migration failed: {}\nSome files may already be switched; run the command again to finish.",
                e
            ),
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Remote(e) => Some(e),
            CliError::Version(e) => Some(e),
            CliError::Checksum(e) => Some(e),
            CliError::Resolve(e) => Some(e),
            CliError::Migrate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<RemoteError> for CliError {
    fn from(e: RemoteError) -> Self {
        CliError::Remote(e)
    }
}

impl From<VersionError> for CliError {
    fn from(e: VersionError) -> Self {
        CliError::Version(e)
    }
}

impl From<ChecksumError> for CliError {
    fn from(e: ChecksumError) -> Self {
        CliError::Checksum(e)
    }
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        CliError::Resolve(e)
    }
}

impl From<MigrateError> for CliError {
    fn from(e: MigrateError) -> Self {
        CliError::Migrate(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}
