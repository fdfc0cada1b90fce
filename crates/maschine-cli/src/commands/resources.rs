use clap::Args;
use colored::Colorize;
use maschine_config::Settings;
use maschine_manifest::{PluginManifest, ResourceDef};
use std::path::{Path, PathBuf};

use crate::common::resolve_manifest_path;
use crate::errors::CliError;

#[derive(Args, Debug, Clone)]
pub struct ResourcesArgs {
    /// Manifest to read (default: look in the current directory)
    #[arg(long, short)]
    pub manifest: Option<PathBuf>,
}

pub fn handle_resources(args: ResourcesArgs, settings: &Settings, cwd: &Path) -> Result<(), CliError> {
    let path = resolve_manifest_path(args.manifest.as_deref(), settings, cwd)?;
    let manifest = PluginManifest::load(&path)?;

    println!(
        "{} {} ({} resources)",
        manifest.plugin.display_name.bold(),
        format!("v{}", manifest.plugin.version).dimmed(),
        manifest.resources.len()
    );
    for resource in &manifest.resources {
        println!("  {} - {}", resource.resource_type.cyan(), resource.name);
        let params = parameter_summary(resource);
        if !params.is_empty() {
            println!("      parameters: {}", params);
        }
    }
    Ok(())
}

/// Comma-separated parameter names, required ones marked with `*`
pub fn parameter_summary(resource: &ResourceDef) -> String {
    resource
        .parameters
        .iter()
        .map(|p| {
            if p.required {
                format!("{}*", p.name)
            } else {
                p.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
