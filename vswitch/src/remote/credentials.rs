//! Archive credentials.

use std::env;
use std::fmt;

/// Environment variable holding the archive user name.
pub const USER_ENV: &str = "ARCHIVE_USER";

/// Environment variable holding the archive password.
pub const PASS_ENV: &str = "ARCHIVE_PASS";

const EMBEDDED_USER: &str = match option_env!("VSWITCH_ARCHIVE_USER") {
    Some(user) => user,
    None => "",
};

const EMBEDDED_PASS: &str = match option_env!("VSWITCH_ARCHIVE_PASS") {
    Some(pass) => pass,
    None => "",
};

/// HTTP Basic credentials for the archive.
///
/// Every request (manifest fetch, probe and download) authenticates with the
/// same pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    /// Create credentials from explicit values.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Read credentials from the environment.
    ///
    /// Unset or empty variables fall back to the values embedded at build
    /// time through `VSWITCH_ARCHIVE_USER` / `VSWITCH_ARCHIVE_PASS`.
    pub fn from_env() -> Self {
        Self::resolve(env::var(USER_ENV).ok(), env::var(PASS_ENV).ok())
    }

    fn resolve(user: Option<String>, password: Option<String>) -> Self {
        Self {
            user: non_empty_or(user, EMBEDDED_USER),
            password: non_empty_or(password, EMBEDDED_PASS),
        }
    }

    /// User name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// True when no user name is available.
    pub fn is_anonymous(&self) -> bool {
        self.user.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}
