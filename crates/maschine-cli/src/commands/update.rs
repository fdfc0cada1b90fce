use clap::Args;
use maschine_config::Settings;
use maschine_logger as logger;
use maschine_manifest::PluginManifest;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::checksums::{platform_checksums, read_checksums};
use crate::common::resolve_manifest_path;
use crate::errors::CliError;

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Manifest to update (default: look in the current directory)
    #[arg(long, short)]
    pub manifest: Option<PathBuf>,
    /// New plugin version; a leading `v` is dropped
    #[arg(long = "version", id = "plugin_version", value_name = "VERSION")]
    pub version: Option<String>,
    /// Project name; sets the executable to `./<project>`
    #[arg(long)]
    pub project: Option<String>,
    /// Release checksums file (`<sha256>  <archive>` per line)
    #[arg(long, requires = "project")]
    pub checksums: Option<PathBuf>,
    /// Write to this path instead of updating in place
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Apply the requested changes to `manifest`
pub fn apply_update(manifest: &mut PluginManifest, args: &UpdateArgs) -> Result<(), CliError> {
    if let Some(version) = &args.version {
        manifest.plugin.version = version.strip_prefix('v').unwrap_or(version).to_string();
    }

    if let Some(project) = &args.project {
        manifest.runtime.executable.path = format!("./{}", project);

        if let Some(path) = &args.checksums {
            let entries = platform_checksums(&read_checksums(path)?, project);
            debug!("Found {} platform checksums in {:?}", entries.len(), path);
            manifest.runtime.executable.checksums.extend(entries);
        }
    }
    Ok(())
}

pub fn handle_update(args: UpdateArgs, settings: &Settings, cwd: &Path) -> Result<(), CliError> {
    let path = resolve_manifest_path(args.manifest.as_deref(), settings, cwd)?;
    let mut manifest = PluginManifest::load(&path)?;

    apply_update(&mut manifest, &args)?;

    let output = args.output.clone().unwrap_or(path);
    manifest.save(&output)?;

    logger::success(&format!("Updated manifest '{}'", output.display()));
    println!("  Version: {}", manifest.plugin.version);
    println!("  Executable: {}", manifest.runtime.executable.path);
    println!(
        "  Checksums: {} platforms",
        manifest.runtime.executable.checksums.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maschine_manifest::new_manifest;
    use tempfile::TempDir;

    #[test]
    fn test_version_prefix_stripped() {
        let mut manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        let args = UpdateArgs {
            version: Some("v1.4.0".to_string()),
            ..Default::default()
        };
        assert!(apply_update(&mut manifest, &args).is_ok());
        assert_eq!(manifest.plugin.version, "1.4.0");
        assert_eq!(manifest.runtime.executable.path, "./mail-plugin");
    }

    #[test]
    fn test_checksums_merged() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let checksums = dir.path().join("checksums.txt");
        let hash = "ab".repeat(32);
        let listing = format!(
            "{hash}  mailer_1.4.0_linux_x86_64.tar.gz\n{hash}  mailer_1.4.0_darwin_arm64.tar.gz\n"
        );
        assert!(std::fs::write(&checksums, listing).is_ok());

        let mut manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        manifest
            .runtime
            .executable
            .checksums
            .insert("windows-amd64".to_string(), format!("sha256:{}", "cd".repeat(32)));

        let args = UpdateArgs {
            project: Some("mailer".to_string()),
            checksums: Some(checksums),
            ..Default::default()
        };
        assert!(apply_update(&mut manifest, &args).is_ok());

        let sums = &manifest.runtime.executable.checksums;
        assert_eq!(manifest.runtime.executable.path, "./mailer");
        assert_eq!(sums.len(), 3);
        assert_eq!(
            sums.get("linux-amd64").map(String::as_str),
            Some(format!("sha256:{}", hash).as_str())
        );
    }

    #[test]
    fn test_missing_checksums_file() {
        let mut manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        let args = UpdateArgs {
            project: Some("mailer".to_string()),
            checksums: Some(PathBuf::from("/nonexistent/checksums.txt")),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&mut manifest, &args),
            Err(CliError::Checksums { .. })
        ));
    }
}
