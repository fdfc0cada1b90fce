//! Common types and utilities shared across commands

use clap::Parser;
use maschine_config::Settings;
use maschine_manifest::find_manifest;
use std::path::{Path, PathBuf};

use crate::errors::CliError;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Effective verbosity: `-q` forces 0
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Pick the manifest to operate on.
///
/// An explicit path wins. Otherwise the configured file name in `dir` is
/// used when present, then the standard candidate names.
pub fn resolve_manifest_path(
    explicit: Option<&Path>,
    settings: &Settings,
    dir: &Path,
) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let configured = dir.join(&settings.manifest.file_name);
    if configured.is_file() {
        return Ok(configured);
    }
    Ok(find_manifest(dir)?)
}
