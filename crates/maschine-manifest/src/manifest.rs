//! Manifest codec and file operations
//!
//! `decode` parses and then validates; `encode` fills the defaulted fields,
//! validates and renders indented JSON with a fixed field order so the output
//! diffs cleanly between runs.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::duration::Duration;
use crate::errors::ManifestError;
use crate::types::{
    AuthorInfo, Capabilities, Configuration, Documentation, ExecutableInfo, Limits, PluginInfo,
    PluginManifest, Requirements, RuntimeInfo,
};
use crate::validation::validate;

/// Default manifest filename
pub const DEFAULT_MANIFEST_FILE: &str = "plugin-manifest.json";

/// URL of the manifest JSON schema
pub const SCHEMA_URL: &str = "https://maschine.io/schemas/plugin-manifest-v2.json";

/// The only supported manifest format version
pub const CURRENT_VERSION: &str = "2.0";

/// Filenames searched by [`find_manifest`], in priority order
pub const MANIFEST_CANDIDATES: [&str; 3] =
    [DEFAULT_MANIFEST_FILE, "plugin-manifest-v2.json", "manifest.json"];

/// Decode a manifest from bytes and validate it
pub fn decode(bytes: &[u8]) -> Result<PluginManifest, ManifestError> {
    let manifest: PluginManifest = serde_json::from_slice(bytes).map_err(ManifestError::Decode)?;
    validate(&manifest)?;
    Ok(manifest)
}

/// Encode a manifest as indented JSON.
///
/// `$schema` and `manifestVersion` are filled in when empty; the result must
/// pass validation before anything is rendered.
pub fn encode(manifest: &PluginManifest) -> Result<Vec<u8>, ManifestError> {
    let manifest = with_defaults(manifest);
    validate(&manifest)?;

    let mut bytes = serde_json::to_vec_pretty(manifest.as_ref()).map_err(ManifestError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn with_defaults(manifest: &PluginManifest) -> Cow<'_, PluginManifest> {
    if !manifest.schema.is_empty() && !manifest.manifest_version.is_empty() {
        return Cow::Borrowed(manifest);
    }

    let mut filled = manifest.clone();
    filled.apply_defaults();
    Cow::Owned(filled)
}

impl PluginManifest {
    /// Fill `$schema` and `manifestVersion` when they are empty
    pub fn apply_defaults(&mut self) {
        if self.schema.is_empty() {
            self.schema = SCHEMA_URL.to_string();
        }
        if self.manifest_version.is_empty() {
            self.manifest_version = CURRENT_VERSION.to_string();
        }
    }

    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        debug!("Loading manifest from {:?}", path);
        let bytes = std::fs::read(path)?;
        let manifest = decode(&bytes)?;
        info!(
            "Loaded manifest for {} v{} ({} resources)",
            manifest.plugin.id,
            manifest.plugin.version,
            manifest.resources.len()
        );
        Ok(manifest)
    }

    /// Fill defaults, validate and write the manifest with an atomic rename
    pub fn save(&mut self, path: &Path) -> Result<(), ManifestError> {
        self.apply_defaults();
        let content = encode(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        {
            let file = std::fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(&content)?;
            writer.flush()?;
        }
        std::fs::rename(&temp_path, path)?;

        info!("Manifest written to {:?}", path);
        Ok(())
    }
}

/// Locate a manifest file in `dir` using [`MANIFEST_CANDIDATES`]
pub fn find_manifest(dir: &Path) -> Result<PathBuf, ManifestError> {
    MANIFEST_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| ManifestError::NotFound(dir.to_path_buf()))
}

/// Create a manifest pre-populated with defaults.
///
/// The result only validates once a description and at least one resource
/// have been added.
pub fn new_manifest(name: &str, id: &str) -> PluginManifest {
    PluginManifest {
        schema: SCHEMA_URL.to_string(),
        manifest_version: CURRENT_VERSION.to_string(),
        plugin: PluginInfo {
            id: id.to_string(),
            name: name.to_string(),
            display_name: name.to_string(),
            version: "0.1.0".to_string(),
            description: String::new(),
            category: "general".to_string(),
            tags: Vec::new(),
            author: AuthorInfo {
                name: "Unknown".to_string(),
                email: "unknown@example.com".to_string(),
                url: None,
            },
            license: "Apache-2.0".to_string(),
            homepage: None,
            repository: None,
            bugs: None,
        },
        runtime: RuntimeInfo {
            runtime_type: "native".to_string(),
            executable: ExecutableInfo {
                path: format!("./{}", name),
                checksums: Default::default(),
            },
            protocol: "grpc".to_string(),
            protocol_version: "1.0".to_string(),
            handshake_config: None,
        },
        requirements: Requirements {
            maschine_version: ">=1.0.0".to_string(),
            os: vec!["darwin".to_string(), "linux".to_string(), "windows".to_string()],
            arch: vec!["amd64".to_string(), "arm64".to_string()],
        },
        configuration: Configuration::default(),
        resources: Vec::new(),
        capabilities: Capabilities {
            health_check: true,
            concurrent_execution: true,
            stateless: true,
            supports_credentials: false,
        },
        limits: Limits {
            startup_timeout: Duration::from_secs(30),
            execute_timeout: Duration::from_secs(300),
            health_check_interval: Duration::from_secs(60),
            health_check_timeout: Duration::from_secs(10),
            max_concurrent_executions: 100,
        },
        documentation: Documentation::default(),
    }
}

/// Turn a kebab-case technical name into a display name (`mail-plugin` -> `Mail Plugin`)
pub fn display_name_from(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last segment of a plugin id (`io.maschine.plugins.mail` -> `mail`)
pub fn short_name(id: &str) -> &str {
    id.rsplit('.').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Example, OutputDef, Parameter, ResourceDef};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_manifest() -> PluginManifest {
        let mut manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        manifest.plugin.description = "Mail plugin for Maschine".to_string();
        manifest.plugin.tags = vec!["mail".to_string(), "smtp".to_string()];
        manifest
            .runtime
            .executable
            .checksums
            .insert("linux-amd64".to_string(), format!("sha256:{}", "0f".repeat(32)));
        manifest.resources.push(ResourceDef {
            resource_type: "mrn:mail:smtp:send".to_string(),
            name: "Send Mail".to_string(),
            description: "Send a message".to_string(),
            category: "action".to_string(),
            parameters: vec![Parameter {
                name: "port".to_string(),
                param_type: "integer".to_string(),
                required: false,
                description: "SMTP port".to_string(),
                default: Some(json!(587)),
                minimum: Some(1.0),
                maximum: Some(65535.0),
                ..Default::default()
            }],
            required_credentials: vec!["smtp".to_string()],
            output: Some(OutputDef {
                output_type: "object".to_string(),
                schema: json!({"messageId": {"type": "string"}}),
            }),
            examples: vec![Example {
                name: "Basic".to_string(),
                description: None,
                parameters: [("port".to_string(), json!(25))].into_iter().collect(),
                output: Some(json!({"messageId": "abc"})),
            }],
        });
        manifest.limits.execute_timeout = Duration::from_secs(90);
        manifest
    }

    #[test]
    fn test_round_trip() {
        let manifest = sample_manifest();
        let decoded = encode(&manifest).and_then(|bytes| decode(&bytes));
        assert!(decoded.is_ok_and(|m| m == manifest));
    }

    #[test]
    fn test_round_trip_keeps_float_bits() {
        let mut manifest = sample_manifest();
        for value in [961.804_136_961_804_1, 1.071_566_039_146_582_6e-75, 0.1 + 0.2] {
            manifest.resources[0].parameters[0].minimum = Some(value);
            manifest.resources[0].parameters[0].default = Some(json!(value));

            let decoded = encode(&manifest).and_then(|bytes| decode(&bytes));
            let Ok(decoded) = decoded else {
                panic!("manifest should round trip");
            };
            let param = &decoded.resources[0].parameters[0];
            assert_eq!(param.minimum.map(f64::to_bits), Some(value.to_bits()));
            assert_eq!(param.default, Some(json!(value)));
        }
    }

    #[test]
    fn test_round_trip_keeps_explicit_null() {
        let mut manifest = sample_manifest();
        manifest.resources[0].parameters[0].default = Some(serde_json::Value::Null);
        manifest.resources[0].examples[0].output = Some(serde_json::Value::Null);

        let decoded = encode(&manifest).and_then(|bytes| decode(&bytes));
        assert!(decoded.is_ok_and(|m| m == manifest));

        let absent = decode(&encode(&sample_manifest()).unwrap_or_default());
        assert!(absent.is_ok_and(|m| m.resources[0].parameters[0].default == Some(json!(587))
            && m.resources[0].parameters[0].pattern.is_none()));
    }

    #[test]
    fn test_durations_encoded_as_text() {
        let Ok(bytes) = encode(&sample_manifest()) else {
            panic!("sample manifest should encode");
        };
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("\"startup_timeout\": \"30s\""));
        assert!(text.contains("\"execute_timeout\": \"1m30s\""));
        assert!(text.contains("\"health_check_interval\": \"1m\""));
        assert!(text.contains("\n  \"manifestVersion\": \"2.0\""));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode(&sample_manifest());
        let second = encode(&sample_manifest());
        assert!(first.is_ok());
        assert_eq!(first.ok(), second.ok());
    }

    #[test]
    fn test_encode_fills_defaults() {
        let mut manifest = sample_manifest();
        manifest.schema.clear();
        manifest.manifest_version.clear();

        let decoded = encode(&manifest).and_then(|bytes| decode(&bytes));
        assert!(decoded.is_ok_and(|m| m.schema == SCHEMA_URL && m.manifest_version == "2.0"));
    }

    #[test]
    fn test_encode_rejects_invalid() {
        let manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        let result = encode(&manifest);
        assert!(result.is_err_and(|e| e
            .violations()
            .is_some_and(|v| v.contains_field("resources") && v.contains_field("plugin.description"))));
    }

    #[test]
    fn test_decode_validates() {
        let result = decode(br#"{"plugin": {"id": "invalid_id"}}"#);
        assert!(result.is_err_and(|e| e
            .violations()
            .is_some_and(|v| v.contains_field("manifestVersion") && v.contains_field("plugin.id"))));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode(b"{not json"), Err(ManifestError::Decode(_))));
        assert!(matches!(
            decode(br#"{"limits": {"startup_timeout": "soon"}}"#),
            Err(ManifestError::Decode(_))
        ));
    }

    #[test]
    fn test_new_manifest_defaults() {
        let manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        assert_eq!(manifest.plugin.category, "general");
        assert_eq!(manifest.plugin.license, "Apache-2.0");
        assert_eq!(manifest.runtime.executable.path, "./mail-plugin");
        assert_eq!(manifest.requirements.os, vec!["darwin", "linux", "windows"]);
        assert_eq!(manifest.limits.startup_timeout, Duration::from_secs(30));
        assert_eq!(manifest.limits.max_concurrent_executions, 100);
        assert!(manifest.capabilities.health_check);
        assert!(manifest.resources.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("nested").join(DEFAULT_MANIFEST_FILE);

        let mut manifest = sample_manifest();
        assert!(manifest.save(&path).is_ok(), "Failed to save manifest");
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = PluginManifest::load(&path);
        assert!(loaded.is_ok_and(|m| m == manifest));
    }

    #[test]
    fn test_find_manifest_priority() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let dir = temp_dir.path();
        assert!(matches!(find_manifest(dir), Err(ManifestError::NotFound(_))));

        assert!(std::fs::write(dir.join("manifest.json"), "{}").is_ok());
        assert!(find_manifest(dir).is_ok_and(|p| p.ends_with("manifest.json")));

        assert!(std::fs::write(dir.join(DEFAULT_MANIFEST_FILE), "{}").is_ok());
        assert!(find_manifest(dir).is_ok_and(|p| p.ends_with(DEFAULT_MANIFEST_FILE)));
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(display_name_from("mail-plugin"), "Mail Plugin");
        assert_eq!(display_name_from("s3"), "S3");
        assert_eq!(short_name("io.maschine.plugins.mail"), "mail");
        assert_eq!(short_name("mail"), "mail");
    }
}
