use maschine_config::ConfigError;
use maschine_manifest::ManifestError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by `maschine-plugin` commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid plugin ID '{0}'. Must be in reverse domain notation (e.g., io.maschine.plugins.example)")]
    InvalidPluginId(String),

    #[error("Invalid plugin name '{0}'. Must contain only lowercase letters, numbers, and hyphens (e.g., example-plugin)")]
    InvalidPluginName(String),

    #[error("Failed to read checksums file {}: {source}", path.display())]
    Checksums {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::InvalidPluginId("Mail".to_string());
        assert!(err.to_string().starts_with("Invalid plugin ID 'Mail'"));

        let err = CliError::from(ManifestError::NotFound(PathBuf::from("/srv/plugin")));
        assert_eq!(err.to_string(), "No manifest file found in /srv/plugin");
    }
}
