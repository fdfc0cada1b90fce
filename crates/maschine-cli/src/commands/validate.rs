use clap::Args;
use colored::Colorize;
use maschine_config::Settings;
use maschine_logger as logger;
use maschine_manifest::{PluginManifest, ResourceDef};
use std::path::{Path, PathBuf};

use crate::common::resolve_manifest_path;
use crate::errors::CliError;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Manifest to validate (default: look in the current directory)
    #[arg(long, short)]
    pub manifest: Option<PathBuf>,
}

pub fn handle_validate(args: ValidateArgs, settings: &Settings, cwd: &Path) -> Result<(), CliError> {
    let path = resolve_manifest_path(args.manifest.as_deref(), settings, cwd)?;
    let manifest = PluginManifest::load(&path)?;

    print_details(&manifest);
    logger::success(&format!("Manifest '{}' is valid", path.display()));
    Ok(())
}

fn print_details(manifest: &PluginManifest) {
    let plugin = &manifest.plugin;
    println!("{}", "Manifest details:".bold());
    println!("  Plugin ID: {}", plugin.id);
    println!("  Name: {}", plugin.name);
    println!("  Version: {}", plugin.version);
    println!("  Category: {}", plugin.category);
    println!("  Resources: {}", manifest.resources.len());
    for (i, resource) in manifest.resources.iter().enumerate() {
        println!("    {}. {} ({})", i + 1, resource.resource_type, resource.category);
        logger::detail(&resource_detail(resource));
    }
}

/// One-line summary of a resource's parameters and credentials, shown with `-v`
pub fn resource_detail(resource: &ResourceDef) -> String {
    let required = resource.required_parameters().count();
    let mut line = format!(
        "{}: {} parameters ({} required)",
        resource.name,
        resource.parameters.len(),
        required
    );
    if !resource.required_credentials.is_empty() {
        line.push_str(&format!(
            ", credentials: {}",
            resource.required_credentials.join(", ")
        ));
    }
    line
}
