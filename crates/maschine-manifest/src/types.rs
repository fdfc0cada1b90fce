//! Manifest data model
//!
//! Field names follow the persisted JSON document. Every struct decodes
//! leniently (missing keys take their zero value) so that the validator, not
//! the decoder, reports what is missing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::duration::Duration;

/// Keep an explicit `null` as `Some(Value::Null)`; only a missing key is `None`
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

// =============================================================================
// MANIFEST
// =============================================================================

/// Complete plugin manifest, one per plugin distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginManifest {
    #[serde(rename = "$schema", skip_serializing_if = "String::is_empty")]
    pub schema: String,
    pub manifest_version: String,
    pub plugin: PluginInfo,
    pub runtime: RuntimeInfo,
    pub requirements: Requirements,
    pub configuration: Configuration,
    pub resources: Vec<ResourceDef>,
    pub capabilities: Capabilities,
    pub limits: Limits,
    pub documentation: Documentation,
}

impl PluginManifest {
    /// Look up a declared resource by its MRN
    pub fn resource(&self, mrn: &str) -> Option<&ResourceDef> {
        self.resources.iter().find(|r| r.resource_type == mrn)
    }

    /// Declared resource MRNs in manifest order
    pub fn resource_types(&self) -> Vec<&str> {
        self.resources
            .iter()
            .map(|r| r.resource_type.as_str())
            .collect()
    }
}

// =============================================================================
// PLUGIN IDENTITY
// =============================================================================

/// Basic plugin information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginInfo {
    /// Reverse domain identifier, e.g. `io.maschine.plugins.mail`
    pub id: String,
    /// Technical name, e.g. `mail-plugin`
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub description: String,
    /// e.g. "communication", "cloud", "monitoring"
    pub category: String,
    pub tags: Vec<String>,
    pub author: AuthorInfo,
    pub license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs: Option<BugTracker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Source repository information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    /// "git", "svn", ...
    #[serde(rename = "type")]
    pub repo_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BugTracker {
    pub url: String,
}

// =============================================================================
// RUNTIME
// =============================================================================

/// How the host runs the plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeInfo {
    /// "native", "container", "wasm"
    #[serde(rename = "type")]
    pub runtime_type: String,
    pub executable: ExecutableInfo,
    /// "grpc", "http", "stdio"
    pub protocol: String,
    pub protocol_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handshake_config: Option<HandshakeConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutableInfo {
    /// Path relative to the plugin distribution root
    pub path: String,
    /// platform -> "sha256:<hex>"
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, String>,
}

/// Plugin negotiation parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandshakeConfig {
    pub protocol_version: u32,
    pub magic_cookie_key: String,
    pub magic_cookie_value: String,
}

// =============================================================================
// REQUIREMENTS & CONFIGURATION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Requirements {
    /// Semantic version constraint for the host, e.g. ">=1.0.0"
    pub maschine_version: String,
    pub os: Vec<String>,
    pub arch: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub environment: Vec<EnvVar>,
    pub credentials: Vec<CredentialSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

/// Named group of credential fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSet {
    pub name: String,
    pub description: String,
    pub fields: Vec<CredentialField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialField {
    pub name: String,
    /// "string", "number", "boolean"
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    /// Masked in UI and logs
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Configuration {
    pub fn credential_set(&self, name: &str) -> Option<&CredentialSet> {
        self.credentials.iter().find(|c| c.name == name)
    }

    /// Names of every credential field flagged as secret, as `set.field`
    pub fn secret_fields(&self) -> Vec<String> {
        self.credentials
            .iter()
            .flat_map(|set| {
                set.fields
                    .iter()
                    .filter(|f| f.secret)
                    .map(move |f| format!("{}.{}", set.name, f.name))
            })
            .collect()
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

/// One operation the plugin exposes; `type` is the dispatch key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceDef {
    /// MRN, e.g. `mrn:mail:smtp:send`
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub description: String,
    /// "action", "query", "check"
    pub category: String,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_credentials: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

impl ResourceDef {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

/// Resource parameter with optional constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    /// "string", "integer", "number", "boolean", "array", "object"
    #[serde(rename = "type")]
    pub param_type: String,
    pub required: bool,
    pub description: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub properties: Option<Value>,
}

/// Array item schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Items {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDef {
    #[serde(rename = "type")]
    pub output_type: String,
    pub schema: Value,
}

/// Documented usage of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Example {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: BTreeMap<String, Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub output: Option<Value>,
}

// =============================================================================
// CAPABILITIES, LIMITS, DOCUMENTATION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub health_check: bool,
    pub concurrent_execution: bool,
    pub stateless: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub supports_credentials: bool,
}

/// Declared limits; descriptive only, nothing in this crate enforces them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub startup_timeout: Duration,
    pub execute_timeout: Duration,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
    pub max_concurrent_executions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Documentation {
    pub installation: String,
    pub configuration: String,
    pub usage: String,
    pub api: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_decode_to_defaults() {
        let parsed: Result<PluginManifest, _> = serde_json::from_str("{}");
        assert!(parsed.is_ok_and(|m| m == PluginManifest::default()));
    }

    #[test]
    fn test_wire_names() {
        let manifest = PluginManifest {
            schema: "https://example.com/schema.json".to_string(),
            manifest_version: "2.0".to_string(),
            resources: vec![ResourceDef {
                resource_type: "mrn:mail:smtp:send".to_string(),
                required_credentials: vec!["smtp".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let Ok(value) = serde_json::to_value(&manifest) else {
            panic!("manifest should serialize");
        };
        assert_eq!(value["$schema"], "https://example.com/schema.json");
        assert_eq!(value["manifestVersion"], "2.0");
        assert_eq!(value["resources"][0]["type"], "mrn:mail:smtp:send");
        assert_eq!(value["resources"][0]["requiredCredentials"][0], "smtp");
        assert_eq!(value["limits"]["startup_timeout"], "0s");
        assert!(value["capabilities"].get("supports_credentials").is_none());
        assert!(value["plugin"].get("homepage").is_none());
    }

    #[test]
    fn test_null_default_differs_from_missing() {
        let explicit: Result<Parameter, _> =
            serde_json::from_str(r#"{"name": "cc", "default": null}"#);
        assert!(explicit.is_ok_and(|p| p.default == Some(Value::Null)));

        let missing: Result<Parameter, _> = serde_json::from_str(r#"{"name": "cc"}"#);
        assert!(missing.is_ok_and(|p| p.default.is_none()));

        let example: Result<Example, _> =
            serde_json::from_str(r#"{"name": "empty", "parameters": {}, "output": null}"#);
        assert!(example.is_ok_and(|e| e.output == Some(Value::Null)));
    }

    #[test]
    fn test_secret_fields() {
        let configuration = Configuration {
            environment: Vec::new(),
            credentials: vec![CredentialSet {
                name: "smtp".to_string(),
                description: "SMTP login".to_string(),
                fields: vec![
                    CredentialField {
                        name: "username".to_string(),
                        field_type: "string".to_string(),
                        required: true,
                        ..Default::default()
                    },
                    CredentialField {
                        name: "password".to_string(),
                        field_type: "string".to_string(),
                        required: true,
                        secret: true,
                        ..Default::default()
                    },
                ],
            }],
        };

        assert_eq!(configuration.secret_fields(), vec!["smtp.password"]);
        assert!(configuration.credential_set("smtp").is_some());
        assert!(configuration.credential_set("imap").is_none());
    }

    #[test]
    fn test_resource_lookup() {
        let manifest = PluginManifest {
            resources: vec![ResourceDef {
                resource_type: "mrn:mail:smtp:send".to_string(),
                parameters: vec![
                    Parameter {
                        name: "to".to_string(),
                        required: true,
                        ..Default::default()
                    },
                    Parameter {
                        name: "cc".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(manifest.resource_types(), vec!["mrn:mail:smtp:send"]);
        let resource = manifest.resource("mrn:mail:smtp:send");
        assert!(resource.is_some_and(|r| r.parameter("cc").is_some()
            && r.required_parameters().count() == 1));
        assert!(manifest.resource("mrn:mail:imap:read").is_none());
    }
}
