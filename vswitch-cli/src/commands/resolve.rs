//! Resolve command - show which variant a version uses for one file.

use std::sync::Arc;

use vswitch::remote::ManifestSource;
use vswitch::resolve::Resolver;
use vswitch::version::TrackedFile;

use crate::context::Context;
use crate::error::CliError;

/// Run the resolve command.
pub fn run(ctx: &Context, file: &str, version: &str) -> Result<(), CliError> {
    let config = ctx.load_or_default()?;
    let client = ctx.client(&config)?;
    let versions = client.versions()?;
    versions.require(version)?;

    let resolver = Resolver::new(Arc::new(client.clone()));
    match resolver.resolve(&TrackedFile::new(file), version, &versions)? {
        Some(variant) => {
            println!("{}", variant.name());
            println!("  url:   {}", client.url_for(&variant.remote_path()));
            println!(
                "  cache: {}",
                variant.cache_path(&config.paths.cache).display()
            );
        }
        None => println!("{} has no variant at or before {}", file, version),
    }
    Ok(())
}
