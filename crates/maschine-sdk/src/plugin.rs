//! Plugin-facing surface: the `Resource` trait and a registry-backed base plugin

use maschine_manifest::{HandshakeConfig, PluginManifest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::errors::RegistryError;
use crate::registry::ResourceRegistry;
use crate::request::{ExecuteRequest, ExecuteResponse, TypedRequest};

/// Handshake protocol version shared by host and plugin
pub const HANDSHAKE_PROTOCOL_VERSION: u32 = 1;
pub const MAGIC_COOKIE_KEY: &str = "MASCHINE_PLUGIN";
pub const MAGIC_COOKIE_VALUE: &str = "maschine-io-plugin-sdk-v1";

/// Handshake parameters as they appear in a manifest's runtime section
pub fn handshake() -> HandshakeConfig {
    HandshakeConfig {
        protocol_version: HANDSHAKE_PROTOCOL_VERSION,
        magic_cookie_key: MAGIC_COOKIE_KEY.to_string(),
        magic_cookie_value: MAGIC_COOKIE_VALUE.to_string(),
    }
}

/// What a plugin reports about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub version: String,
    pub supported_resources: Vec<String>,
    pub capabilities: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: String,
}

/// Build and platform details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_commit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_date: String,
    pub sdk_version: String,
    pub platform: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

/// Current platform as `<os>/<arch>` using manifest arch names (`linux/amd64`)
pub fn platform() -> String {
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    };
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    format!("{}/{}", os, arch)
}

/// Operations every plugin exposes to the host
pub trait Resource: Send + Sync {
    fn metadata(&self) -> Metadata;

    fn version_info(&self) -> VersionInfo;

    fn execute(&self, request: &ExecuteRequest) -> ExecuteResponse;

    fn health_check(&self) -> HealthStatus;
}

/// A plugin whose operations are the handlers in a [`ResourceRegistry`]
#[derive(Debug)]
pub struct BasePlugin {
    name: String,
    version: String,
    registry: Arc<ResourceRegistry>,
    capabilities: BTreeMap<String, String>,
    version_info: Option<VersionInfo>,
}

impl BasePlugin {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        BasePlugin::with_registry(name, version, Arc::new(ResourceRegistry::new()))
    }

    /// Build a plugin around an existing (possibly shared) registry
    pub fn with_registry(
        name: impl Into<String>,
        version: impl Into<String>,
        registry: Arc<ResourceRegistry>,
    ) -> Self {
        BasePlugin {
            name: name.into(),
            version: version.into(),
            registry,
            capabilities: BTreeMap::new(),
            version_info: None,
        }
    }

    /// Take name, version and capability flags from a manifest
    pub fn from_manifest(manifest: &PluginManifest) -> Self {
        let caps = &manifest.capabilities;
        BasePlugin::new(&manifest.plugin.name, &manifest.plugin.version)
            .with_capability("health_check", caps.health_check.to_string())
            .with_capability("concurrent_execution", caps.concurrent_execution.to_string())
            .with_capability("stateless", caps.stateless.to_string())
            .with_capability("supports_credentials", caps.supports_credentials.to_string())
    }

    pub fn with_capability(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.capabilities.insert(key.into(), value.into());
        self
    }

    /// Replace the generated version details
    pub fn set_version_info(&mut self, info: VersionInfo) {
        self.version_info = Some(info);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn register_simple<F, T>(&self, id: &str, handler: F, operation: &str) -> Result<(), RegistryError>
    where
        F: Fn(&TypedRequest) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize,
    {
        self.registry.register_simple(id, handler, operation)
    }

    /// Manifest resource types that have no registered handler
    pub fn missing_handlers<'a>(&self, manifest: &'a PluginManifest) -> Vec<&'a str> {
        manifest
            .resource_types()
            .into_iter()
            .filter(|mrn| !self.registry.contains(mrn))
            .collect()
    }
}

impl Resource for BasePlugin {
    fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            version: self.version.clone(),
            supported_resources: self.registry.resource_names(),
            capabilities: self.capabilities.clone(),
        }
    }

    fn version_info(&self) -> VersionInfo {
        if let Some(info) = &self.version_info {
            return info.clone();
        }
        VersionInfo {
            version: self.version.clone(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: platform(),
            ..Default::default()
        }
    }

    fn execute(&self, request: &ExecuteRequest) -> ExecuteResponse {
        info!("Executing {} on {}", request.resource, self.name);
        self.registry.dispatch(request)
    }

    fn health_check(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            message: format!("{} plugin is operational", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;
    use maschine_manifest::{new_manifest, ResourceDef};
    use serde_json::json;

    fn mail_plugin() -> BasePlugin {
        let plugin = BasePlugin::new("mail", "1.2.0").with_capability("streaming", "false");
        let registered = plugin.register_simple(
            "mrn:mail:smtp:send",
            |request: &TypedRequest| {
                let port = request.params().get_int_with_default("port", 587)?;
                Ok(json!({ "port": port }))
            },
            "send",
        );
        assert!(registered.is_ok());
        assert!(plugin
            .register_simple("mrn:mail:imap:list", |_: &TypedRequest| Ok(Vec::<String>::new()), "list")
            .is_ok());
        plugin
    }

    #[test]
    fn test_metadata_lists_sorted_resources() {
        let metadata = mail_plugin().metadata();
        assert_eq!(metadata.name, "mail");
        assert_eq!(metadata.version, "1.2.0");
        assert_eq!(
            metadata.supported_resources,
            vec!["mrn:mail:imap:list", "mrn:mail:smtp:send"]
        );
        assert_eq!(metadata.capabilities.get("streaming").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_execute_dispatches() {
        let plugin = mail_plugin();
        let request = RequestBuilder::new("mrn:mail:smtp:send").with_int("port", 25).build();
        let response = plugin.execute(&request);

        assert_eq!(response.output, Some(br#"{"port":25}"#.to_vec()));
        assert_eq!(response.metadata.get("operation").map(String::as_str), Some("send"));

        let missing = plugin.execute(&ExecuteRequest::new("mrn:mail:pop:fetch"));
        assert!(missing.error.is_some_and(|e| e.contains("unsupported resource")));
    }

    #[test]
    fn test_health_and_version() {
        let mut plugin = mail_plugin();
        let health = plugin.health_check();
        assert!(health.healthy);
        assert_eq!(health.message, "mail plugin is operational");

        let info = plugin.version_info();
        assert_eq!(info.version, "1.2.0");
        assert_eq!(info.platform, platform());
        assert!(info.platform.contains('/'));

        plugin.set_version_info(VersionInfo {
            version: "1.2.0".to_string(),
            git_commit: "abc123".to_string(),
            ..Default::default()
        });
        assert_eq!(plugin.version_info().git_commit, "abc123");
    }

    #[test]
    fn test_from_manifest() {
        let mut manifest = new_manifest("mail-plugin", "io.maschine.plugins.mail");
        manifest.resources.push(ResourceDef {
            resource_type: "mrn:mail:smtp:send".to_string(),
            ..Default::default()
        });
        manifest.resources.push(ResourceDef {
            resource_type: "mrn:mail:smtp:queue".to_string(),
            ..Default::default()
        });

        let plugin = BasePlugin::from_manifest(&manifest);
        assert_eq!(plugin.name(), "mail-plugin");
        assert_eq!(
            plugin.metadata().capabilities.get("health_check").map(String::as_str),
            Some("true")
        );
        assert!(plugin
            .register_simple("mrn:mail:smtp:send", |_: &TypedRequest| Ok(true), "send")
            .is_ok());
        assert_eq!(plugin.missing_handlers(&manifest), vec!["mrn:mail:smtp:queue"]);
    }

    #[test]
    fn test_handshake_constants() {
        let config = handshake();
        assert_eq!(config.protocol_version, 1);
        assert_eq!(config.magic_cookie_key, "MASCHINE_PLUGIN");
        assert_eq!(config.magic_cookie_value, "maschine-io-plugin-sdk-v1");
    }
}
