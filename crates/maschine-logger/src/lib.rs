use colored::Colorize;
use maschine_config::{LogFormat, LoggingSettings};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static VERBOSITY: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Install the global `tracing` subscriber.
///
/// Returns `false` when a subscriber was already installed, in which case
/// nothing changes.
pub fn init(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_new(&settings.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (json, compact) = match settings.format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Compact => (
            None,
            Some(fmt::layer().compact().with_writer(std::io::stderr)),
        ),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(compact)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(
            "Logging initialized at '{}' ({})",
            settings.level,
            settings.format
        );
    }
    installed
}

/// Filter directive for the given CLI flags: `-q` wins, then `-v`/`-vv`,
/// otherwise the configured level
pub fn level_for(verbose: u8, quiet: bool, configured: &str) -> String {
    match (quiet, verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => configured.to_string(),
        (false, 1) => "debug".to_string(),
        (false, _) => "trace".to_string(),
    }
}

/// Set console verbosity for the helpers below
pub fn set_verbosity(verbose: u8, quiet: bool) {
    VERBOSITY.store(verbose, Ordering::Relaxed);
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn get_verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Log a success message
pub fn success(message: &str) {
    if !is_quiet() {
        let check = "\u{2714}".green().bold();
        eprintln!("{} {}", check, message);
    }
}

/// Log an informational message (suppressed by `-q`)
pub fn info(message: &str) {
    if !is_quiet() {
        eprintln!("{}", message);
    }
}

/// Log a detail line, only shown with `-v`
pub fn detail(message: &str) {
    if get_verbosity() >= 1 && !is_quiet() {
        eprintln!("  {}", message.dimmed());
    }
}

/// Log a warning message
pub fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Log an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}
