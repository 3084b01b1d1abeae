//! Init command - write the default configuration file.

use std::env;
use std::path::PathBuf;

use tracing::warn;
use vswitch::config::ConfigFile;
use vswitch::remote::ManifestSource;

use crate::context::Context;
use crate::error::CliError;

/// Run the init command.
pub fn run(ctx: &Context, install: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    if ctx.config_path.exists() && !force {
        println!(
            "Configuration file already exists: {}",
            ctx.config_path.display()
        );
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    let config = write_default(ctx, install)?;
    print_written(ctx, &config);
    Ok(())
}

/// Create and save a default configuration.
///
/// `install` defaults to the working directory. The current version is set
/// to the latest published one when the archive can be reached.
pub fn write_default(ctx: &Context, install: Option<PathBuf>) -> Result<ConfigFile, CliError> {
    let install = match install {
        Some(path) => path,
        None => env::current_dir()
            .map_err(|e| CliError::Config(format!("cannot determine working directory: {}", e)))?,
    };

    let mut config = ConfigFile::for_install(install, None);
    match ctx.client(&config)?.versions() {
        Ok(versions) => config.version.current = versions.latest().ok().map(str::to_string),
        Err(e) => warn!(error = %e, "Could not fetch versions, leaving current version unset"),
    }

    config.save_to(&ctx.config_path)?;
    Ok(config)
}

/// Show what was written and where.
pub fn print_written(ctx: &Context, config: &ConfigFile) {
    println!("Wrote default configuration to {}:", ctx.config_path.display());
    println!();
    print!("{}", config.to_ini_string());
    println!();
    println!("Edit this file to point at your installation and archive.");
}
