//! Versions command - list published versions.

use console::style;
use tracing::debug;
use vswitch::remote::ManifestSource;

use super::detect::{detect, index_for};
use crate::context::Context;
use crate::error::CliError;

/// Run the versions command.
pub fn run(ctx: &Context) -> Result<(), CliError> {
    let config = ctx.load_or_default()?;
    let client = ctx.client(&config)?;
    let versions = client.versions()?;
    let latest = versions.latest()?.to_string();

    let installed = match detect(&index_for(&client), &config, &versions) {
        Ok(version) => Some(version),
        Err(e) => {
            debug!(error = %e, "Could not detect installed version, using configuration");
            config.version.current.clone()
        }
    };

    for version in versions.iter() {
        let mut tags = Vec::new();
        if installed.as_deref() == Some(version) {
            tags.push("installed");
        }
        if version == latest {
            tags.push("latest");
        }

        if tags.is_empty() {
            println!("  {}", version);
        } else {
            println!(
                "{} {} {}",
                style("*").green(),
                style(version).bold(),
                style(format!("({})", tags.join(", "))).dim()
            );
        }
    }
    Ok(())
}
