//! Switch command - migrate the installation to another version.

use std::sync::Arc;

use clap::Args;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use tracing::{info, warn};
use vswitch::config::{ConfigError, ConfigFile};
use vswitch::download::{RemoteFetcher, Transport};
use vswitch::fanout::ProcessingMode;
use vswitch::migrate::{MigrationEngine, MigrationReport};
use vswitch::remote::ManifestSource;
use vswitch::version::VersionList;

use super::detect::{detect, index_for};
use super::init;
use crate::context::Context;
use crate::error::CliError;
use crate::progress::BarSink;

const DOWNGRADE_REMINDER: &str = "Switching to an older version. \
    Disable automatic updates in your launcher or it will undo the switch.";

/// Arguments for the switch command.
#[derive(Debug, Args)]
pub struct SwitchArgs {
    /// Version to switch to (prompted for when omitted)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Migrate one file at a time
    #[arg(long)]
    pub serial: bool,

    /// Skip CRC32 verification of restored and downloaded files
    #[arg(long)]
    pub no_verify: bool,

    /// Do not ask for confirmation on first run
    #[arg(short, long)]
    pub yes: bool,
}

/// Run the switch command.
pub fn run(ctx: &Context, args: SwitchArgs) -> Result<(), CliError> {
    let Some(mut config) = load_or_create(ctx, args.yes)? else {
        return Ok(());
    };

    let client = ctx.client(&config)?;
    let versions = client.versions()?;
    let files = client.tracked_files()?;
    info!(versions = versions.len(), files = files.len(), "Fetched manifests");

    // Load before any fan-out so a broken manifest fails before files move.
    let checksums = index_for(&client);
    checksums.load()?;

    let installed = detect(&checksums, &config, &versions)?;
    if let Some(configured) = config.version.current.as_deref() {
        if configured != installed {
            warn!(
                configured,
                detected = %installed,
                "Configured version does not match the installation, using detected version"
            );
        }
    }
    println!("Current version: {}", style(&installed).bold());

    let target = match args.target {
        Some(target) => {
            versions.require(&target)?;
            target
        }
        None => prompt_target(&versions, &installed)?,
    };
    println!("Desired version: {}", style(&target).bold());

    if versions.is_downgrade(&target) {
        println!("{}", style(DOWNGRADE_REMINDER).yellow());
    }

    let verify = config.features.verify && !args.no_verify;
    let mode = ProcessingMode::from_parallel(config.features.parallel_processing && !args.serial);
    let transport = Transport::from_fast_download(config.features.fast_download);
    let fetcher =
        RemoteFetcher::for_transport(client.downloader(), transport, Arc::new(BarSink::new()));

    let mut engine = MigrationEngine::new(
        Arc::new(client),
        Arc::new(fetcher),
        config.paths.install.clone(),
        config.paths.cache.clone(),
    );
    if verify {
        engine = engine.with_checksums(checksums);
    }
    let engine = Arc::new(engine);

    let report = engine.migrate_all(files, &installed, &target, &versions, mode)?;

    config.version.current = Some(target.clone());
    config.save_to(&ctx.config_path)?;

    print_summary(&report, &target);
    Ok(())
}

/// Load the configuration, writing defaults on first run.
///
/// Returns `None` when the operator chose to review the new file first.
fn load_or_create(ctx: &Context, assume_yes: bool) -> Result<Option<ConfigFile>, CliError> {
    match ConfigFile::load_from(&ctx.config_path) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::NotFound(_)) => {
            println!("Configuration file doesn't exist, creating one...");
            let config = init::write_default(ctx, None)?;
            init::print_written(ctx, &config);

            if assume_yes {
                return Ok(Some(config));
            }
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Continue with these settings?")
                .default(false)
                .interact()?;
            Ok(proceed.then_some(config))
        }
        Err(e) => Err(e.into()),
    }
}

/// Ask which version to switch to, preselecting the installed one.
fn prompt_target(versions: &VersionList, installed: &str) -> Result<String, CliError> {
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a version to switch to")
        .items(versions.as_slice())
        .default(versions.position(installed).unwrap_or(0))
        .interact()?;

    versions
        .as_slice()
        .get(choice)
        .cloned()
        .ok_or_else(|| CliError::Prompt(format!("invalid selection {}", choice)))
}

fn print_summary(report: &MigrationReport, target: &str) {
    println!();
    println!("{}", report);
    for (file, reason) in &report.cache_failures {
        println!(
            "  {} {} was not cached: {}",
            style("!").yellow(),
            file,
            reason
        );
    }
    println!();
    println!(
        "{}",
        style(format!("Installation is now at version {}", target))
            .green()
            .bold()
    );
}
