use clap::{Parser, Subcommand};
use maschine_cli::{
    commands::{
        generate::{self, GenerateArgs},
        resources::{self, ResourcesArgs},
        update::{self, UpdateArgs},
        validate::{self, ValidateArgs},
    },
    CliError, GlobalOpts,
};
use maschine_config::Settings;
use maschine_logger as logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "maschine-plugin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Maschine plugin manifest tool",
    long_about = "Generate, validate and update Maschine plugin manifests."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new plugin manifest
    Generate(GenerateArgs),
    /// Validate an existing manifest
    Validate(ValidateArgs),
    /// Update version, executable and checksums of a manifest
    Update(UpdateArgs),
    /// List the resources a manifest declares
    Resources(ResourcesArgs),
}

fn run(cli: Cli, settings: &Settings) -> Result<(), CliError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match cli.command {
        Commands::Generate(args) => generate::handle_generate(args, settings),
        Commands::Validate(args) => validate::handle_validate(args, settings, &cwd),
        Commands::Update(args) => update::handle_update(args, settings, &cwd),
        Commands::Resources(args) => resources::handle_resources(args, settings, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();

    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            logger::warn(&format!("Ignoring settings: {}", e));
            Settings::default()
        }
    };
    settings.logging.level = logger::level_for(
        cli.global.verbosity_level(),
        cli.global.quiet,
        &settings.logging.level,
    );
    logger::set_verbosity(cli.global.verbosity_level(), cli.global.quiet);
    logger::init(&settings.logging);

    if let Err(e) = run(cli, &settings) {
        logger::error(&e.to_string());
        std::process::exit(1);
    }
}
