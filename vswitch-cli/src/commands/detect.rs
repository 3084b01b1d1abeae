//! Detect command - identify the installed version.

use std::sync::Arc;

use vswitch::checksum::{detect_installed_version, ChecksumIndex, INSTALL_MANIFEST};
use vswitch::config::ConfigFile;
use vswitch::remote::{ArchiveClient, ManifestSource};
use vswitch::version::{TrackedFile, VersionList};

use crate::context::Context;
use crate::error::CliError;

/// Run the detect command.
pub fn run(ctx: &Context) -> Result<(), CliError> {
    let config = ctx.load_config()?;
    let client = ctx.client(&config)?;
    let versions = client.versions()?;
    let index = index_for(&client);

    let installed = detect(&index, &config, &versions)?;
    println!("{}", installed);

    if let Some(configured) = config.version.current.as_deref() {
        if configured != installed {
            eprintln!(
                "Note: configuration says {} but the installation is {}",
                configured, installed
            );
        }
    }
    Ok(())
}

/// Fingerprint the installation described by `config`.
pub fn detect(
    index: &ChecksumIndex,
    config: &ConfigFile,
    versions: &VersionList,
) -> Result<String, CliError> {
    Ok(detect_installed_version(
        index,
        &config.paths.install,
        &TrackedFile::new(INSTALL_MANIFEST),
        versions,
    )?)
}

/// Checksum index backed by `client`.
pub fn index_for(client: &ArchiveClient) -> Arc<ChecksumIndex> {
    Arc::new(ChecksumIndex::lazy(Arc::new(client.clone())))
}
