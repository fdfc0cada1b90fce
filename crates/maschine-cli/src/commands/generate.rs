use clap::Args;
use maschine_config::Settings;
use maschine_logger as logger;
use maschine_manifest::{
    display_name_from, is_valid_plugin_id, is_valid_plugin_name, new_manifest, short_name,
    Example, OutputDef, Parameter, PluginManifest, ResourceDef,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

use crate::errors::CliError;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Plugin ID in reverse domain notation (e.g., io.maschine.plugins.example)
    #[arg(long)]
    pub id: String,
    /// Plugin technical name (e.g., example-plugin)
    #[arg(long)]
    pub name: String,
    /// Display name (default: derived from the name)
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Plugin category (communication|cloud|monitoring|security|data|general)
    #[arg(long, default_value = "general")]
    pub category: String,
    #[arg(long, default_value = "0.1.0")]
    pub version: String,
    /// Author name
    #[arg(long)]
    pub author: Option<String>,
    /// Author email
    #[arg(long)]
    pub email: Option<String>,
    /// License (SPDX identifier)
    #[arg(long, default_value = "Apache-2.0")]
    pub license: String,
    /// Output file (default: the configured manifest file name)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Build the manifest described by `args`, with one example resource
pub fn build_manifest(args: &GenerateArgs, settings: &Settings) -> Result<PluginManifest, CliError> {
    if !is_valid_plugin_id(&args.id) {
        return Err(CliError::InvalidPluginId(args.id.clone()));
    }
    if !is_valid_plugin_name(&args.name) {
        return Err(CliError::InvalidPluginName(args.name.clone()));
    }

    let display_name = args
        .display_name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| display_name_from(&args.name));
    let description = args
        .description
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("{} plugin for Maschine", display_name));

    let mut manifest = new_manifest(&args.name, &args.id);
    manifest.schema = settings.manifest.schema_url.clone();
    manifest.plugin.display_name = display_name;
    manifest.plugin.description = description;
    manifest.plugin.category = args.category.clone();
    manifest.plugin.version = args.version.clone();
    manifest.plugin.license = args.license.clone();
    if let Some(author) = args.author.as_ref().filter(|s| !s.is_empty()) {
        manifest.plugin.author.name = author.clone();
    }
    if let Some(email) = args.email.as_ref().filter(|s| !s.is_empty()) {
        manifest.plugin.author.email = email.clone();
    }
    manifest.resources = vec![example_resource(&args.id)];

    Ok(manifest)
}

fn example_resource(id: &str) -> ResourceDef {
    ResourceDef {
        resource_type: format!("mrn:{}:example:action", short_name(id)),
        name: "Example Action".to_string(),
        description: "An example action resource".to_string(),
        category: "action".to_string(),
        parameters: vec![Parameter {
            name: "input".to_string(),
            param_type: "string".to_string(),
            required: true,
            description: "Input parameter".to_string(),
            ..Default::default()
        }],
        output: Some(OutputDef {
            output_type: "object".to_string(),
            schema: json!({
                "result": { "type": "string" },
                "status": { "type": "string" },
            }),
        }),
        examples: vec![Example {
            name: "Basic example".to_string(),
            description: None,
            parameters: [("input".to_string(), json!("Hello, World!"))]
                .into_iter()
                .collect(),
            output: Some(json!({
                "result": "Processed: Hello, World!",
                "status": "success",
            })),
        }],
        ..Default::default()
    }
}

pub fn handle_generate(args: GenerateArgs, settings: &Settings) -> Result<(), CliError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.manifest.file_name));

    let mut manifest = build_manifest(&args, settings)?;
    debug!("Generated manifest for {}", manifest.plugin.id);
    manifest.save(&output)?;

    logger::success(&format!("Generated manifest '{}'", output.display()));
    logger::info("\nNext steps:");
    logger::info(&format!(
        "1. Edit '{}' to add your plugin's resources and configuration",
        output.display()
    ));
    logger::info(&format!(
        "2. Run 'maschine-plugin validate --manifest {}' to validate your changes",
        output.display()
    ));
    logger::info("3. Use the manifest in your plugin's distribution");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maschine_manifest::validate;

    fn args(id: &str, name: &str) -> GenerateArgs {
        GenerateArgs {
            id: id.to_string(),
            name: name.to_string(),
            display_name: None,
            description: None,
            category: "general".to_string(),
            version: "0.1.0".to_string(),
            author: None,
            email: None,
            license: "Apache-2.0".to_string(),
            output: None,
        }
    }

    #[test]
    fn test_generated_manifest_is_valid() {
        let settings = Settings::default();
        let Ok(manifest) = build_manifest(&args("io.maschine.plugins.mail", "mail-plugin"), &settings)
        else {
            panic!("manifest should build");
        };

        assert!(validate(&manifest).is_ok());
        assert_eq!(manifest.plugin.display_name, "Mail Plugin");
        assert_eq!(manifest.plugin.description, "Mail Plugin plugin for Maschine");
        assert_eq!(manifest.resource_types(), vec!["mrn:mail:example:action"]);
    }

    #[test]
    fn test_author_overrides() {
        let mut a = args("io.maschine.plugins.mail", "mail-plugin");
        a.author = Some("Ada".to_string());
        a.email = Some("ada@example.com".to_string());
        a.display_name = Some("Mailer".to_string());

        let manifest = build_manifest(&a, &Settings::default());
        assert!(manifest.is_ok_and(|m| m.plugin.author.name == "Ada"
            && m.plugin.author.email == "ada@example.com"
            && m.plugin.display_name == "Mailer"));
    }

    #[test]
    fn test_rejects_bad_identity() {
        let settings = Settings::default();
        assert!(matches!(
            build_manifest(&args("mail", "mail-plugin"), &settings),
            Err(CliError::InvalidPluginId(_))
        ));
        assert!(matches!(
            build_manifest(&args("io.maschine.mail", "Mail_Plugin"), &settings),
            Err(CliError::InvalidPluginName(_))
        ));
    }
}
