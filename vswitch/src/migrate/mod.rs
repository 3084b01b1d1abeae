//! Version migration of an installation.
//!
//! For every tracked file a migration:
//! 1. resolves the variant installed now and the variant wanted
//! 2. moves the installed bytes into the cache (best effort)
//! 3. obtains the wanted variant from the cache or the archive
//!
//! Files on the ignore list are skipped entirely.

mod engine;
mod error;
mod ignore;
mod obtain;
mod report;

pub use engine::{CacheOutcome, FileOutcome, MigrationEngine};
pub use error::{MigrateError, MigrateResult};
pub use ignore::{IgnoreList, DEFAULT_IGNORED};
pub use obtain::{ObtainSource, Obtainer};
pub use report::MigrationReport;
