//! Maschine Plugin Manifest
//!
//! This crate holds the declarative contract a plugin ships with: its identity,
//! runtime requirements, configuration needs and the resources it exposes.
//!
//! The manifest is persisted as indented JSON. Decoding always re-runs the
//! validator, and encoding fills the defaulted fields and validates before any
//! bytes are produced.

pub mod duration;
pub mod errors;
pub mod manifest;
pub mod types;
pub mod validation;

pub use duration::Duration;
pub use errors::ManifestError;
pub use manifest::{
    decode, display_name_from, encode, find_manifest, new_manifest, short_name, CURRENT_VERSION,
    DEFAULT_MANIFEST_FILE, MANIFEST_CANDIDATES, SCHEMA_URL,
};
pub use types::{
    AuthorInfo, BugTracker, Capabilities, Configuration, CredentialField, CredentialSet,
    Documentation, EnvVar, Example, ExecutableInfo, HandshakeConfig, Items, Limits, OutputDef,
    Parameter, PluginInfo, PluginManifest, Repository, Requirements, ResourceDef, RuntimeInfo,
};
pub use validation::{
    is_valid_email, is_valid_mrn, is_valid_plugin_id, is_valid_plugin_name, is_valid_url,
    validate, ValidationErrors, Violation,
};
