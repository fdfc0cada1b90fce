//! Manifest validation
//!
//! Validation is exhaustive: every rule runs and every failure is collected
//! as a [`Violation`] carrying the dotted/indexed path of the offending field
//! (for example `resources[2].parameters[0].name`). Each sub-entity has its own
//! pure validator returning paths relative to itself; the parent prefixes them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

use crate::manifest::CURRENT_VERSION;
use crate::types::{ExecutableInfo, Parameter, PluginInfo, PluginManifest, Requirements, ResourceDef, RuntimeInfo};

static PLUGIN_ID_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(\.[a-z][a-z0-9]*)+$").ok());
static PLUGIN_NAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").ok());
static MRN_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^mrn:[a-z][a-z0-9]*(:[a-z][a-z0-9]*)+$").ok());
static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());
static CHECKSUM_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^sha256:[a-fA-F0-9]{64}$").ok());

const REQUIRED: &str = "is required";

fn matches(re: &Lazy<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

// =============================================================================
// VIOLATIONS
// =============================================================================

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
        }
    }

    fn under(mut self, prefix: &str) -> Self {
        self.field = if self.field.is_empty() {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, self.field)
        };
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation::new(field, message));
    }

    /// Append child violations, prefixing their paths with `prefix`
    pub fn extend_under(&mut self, prefix: &str, child: Vec<Violation>) {
        self.0.extend(child.into_iter().map(|v| v.under(prefix)));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// Messages reported for one field path
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|v| v.field == field)
            .map(|v| v.message.as_str())
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<Violation>> for ValidationErrors {
    fn from(violations: Vec<Violation>) -> Self {
        ValidationErrors(violations)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed:")?;
        for violation in &self.0 {
            write!(f, "\n{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// VALIDATORS
// =============================================================================

/// Validate a whole manifest, collecting every violation
pub fn validate(manifest: &PluginManifest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if manifest.manifest_version.is_empty() {
        errors.push("manifestVersion", REQUIRED);
    } else if manifest.manifest_version != CURRENT_VERSION {
        errors.push(
            "manifestVersion",
            format!(
                "unsupported version '{}', expected '{}'",
                manifest.manifest_version, CURRENT_VERSION
            ),
        );
    }

    errors.extend_under("plugin", validate_plugin_info(&manifest.plugin));
    errors.extend_under("runtime", validate_runtime(&manifest.runtime));
    errors.extend_under("requirements", validate_requirements(&manifest.requirements));

    if manifest.resources.is_empty() {
        errors.push("resources", "at least one resource must be defined");
    }
    for (i, resource) in manifest.resources.iter().enumerate() {
        errors.extend_under(&format!("resources[{}]", i), validate_resource(resource));
    }

    errors.into_result()
}

fn require(out: &mut Vec<Violation>, field: &str, value: &str) -> bool {
    if value.is_empty() {
        out.push(Violation::new(field, REQUIRED));
        false
    } else {
        true
    }
}

fn check_url(out: &mut Vec<Violation>, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() && !is_valid_url(value) {
            out.push(Violation::new(field, "must be a valid URL"));
        }
    }
}

/// Validate plugin identity; paths are relative to `plugin`
pub fn validate_plugin_info(plugin: &PluginInfo) -> Vec<Violation> {
    let mut out = Vec::new();

    if require(&mut out, "id", &plugin.id) && !is_valid_plugin_id(&plugin.id) {
        out.push(Violation::new(
            "id",
            "must follow reverse domain notation (e.g., io.maschine.plugins.mail)",
        ));
    }

    require(&mut out, "name", &plugin.name);
    require(&mut out, "displayName", &plugin.display_name);
    require(&mut out, "version", &plugin.version);
    require(&mut out, "description", &plugin.description);
    require(&mut out, "category", &plugin.category);
    require(&mut out, "license", &plugin.license);

    check_url(&mut out, "homepage", plugin.homepage.as_deref());
    check_url(
        &mut out,
        "repository.url",
        plugin.repository.as_ref().map(|r| r.url.as_str()),
    );
    check_url(
        &mut out,
        "bugs.url",
        plugin.bugs.as_ref().map(|b| b.url.as_str()),
    );

    require(&mut out, "author.name", &plugin.author.name);
    if require(&mut out, "author.email", &plugin.author.email)
        && !is_valid_email(&plugin.author.email)
    {
        out.push(Violation::new("author.email", "must be a valid email"));
    }

    out
}

/// Validate runtime information; paths are relative to `runtime`
pub fn validate_runtime(runtime: &RuntimeInfo) -> Vec<Violation> {
    let mut out = Vec::new();

    require(&mut out, "type", &runtime.runtime_type);
    require(&mut out, "executable.path", &runtime.executable.path);
    out.extend(
        validate_checksums(&runtime.executable)
            .into_iter()
            .map(|v| v.under("executable")),
    );
    require(&mut out, "protocol", &runtime.protocol);
    require(&mut out, "protocolVersion", &runtime.protocol_version);

    out
}

fn validate_checksums(executable: &ExecutableInfo) -> Vec<Violation> {
    executable
        .checksums
        .iter()
        .filter(|(_, checksum)| !matches(&CHECKSUM_RE, checksum))
        .map(|(platform, _)| {
            Violation::new(
                format!("checksums.{}", platform),
                "must be formatted as sha256:<hex>",
            )
        })
        .collect()
}

/// Validate host requirements; paths are relative to `requirements`
pub fn validate_requirements(requirements: &Requirements) -> Vec<Violation> {
    let mut out = Vec::new();

    require(&mut out, "maschineVersion", &requirements.maschine_version);
    if requirements.os.is_empty() {
        out.push(Violation::new("os", "at least one OS must be specified"));
    }
    if requirements.arch.is_empty() {
        out.push(Violation::new(
            "arch",
            "at least one architecture must be specified",
        ));
    }

    out
}

/// Validate a resource definition; paths are relative to the resource
pub fn validate_resource(resource: &ResourceDef) -> Vec<Violation> {
    let mut out = Vec::new();

    if require(&mut out, "type", &resource.resource_type) && !is_valid_mrn(&resource.resource_type)
    {
        out.push(Violation::new(
            "type",
            "must be a valid MRN (e.g., mrn:mail:smtp:send)",
        ));
    }
    require(&mut out, "name", &resource.name);
    require(&mut out, "description", &resource.description);
    require(&mut out, "category", &resource.category);

    let mut seen: HashSet<&str> = HashSet::new();
    for (i, param) in resource.parameters.iter().enumerate() {
        let prefix = format!("parameters[{}]", i);
        out.extend(
            validate_parameter(param, &mut seen)
                .into_iter()
                .map(|v| v.under(&prefix)),
        );
    }

    out
}

fn validate_parameter<'a>(param: &'a Parameter, seen: &mut HashSet<&'a str>) -> Vec<Violation> {
    let mut out = Vec::new();

    if require(&mut out, "name", &param.name) && !seen.insert(param.name.as_str()) {
        out.push(Violation::new(
            "name",
            format!("duplicate parameter name '{}'", param.name),
        ));
    }
    require(&mut out, "type", &param.param_type);
    require(&mut out, "description", &param.description);

    out
}

// =============================================================================
// FORMAT CHECKS
// =============================================================================

/// Reverse domain notation, at least two lowercase alphanumeric segments
pub fn is_valid_plugin_id(id: &str) -> bool {
    matches(&PLUGIN_ID_RE, id)
}

/// Lowercase letters, digits and hyphens, starting with a letter
pub fn is_valid_plugin_name(name: &str) -> bool {
    matches(&PLUGIN_NAME_RE, name)
}

/// `mrn:` followed by two or more lowercase alphanumeric segments
pub fn is_valid_mrn(mrn: &str) -> bool {
    matches(&MRN_RE, mrn)
}

pub fn is_valid_email(email: &str) -> bool {
    matches(&EMAIL_RE, email)
}

/// Absolute URL with both scheme and host
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| !u.scheme().is_empty() && u.has_host())
}
