//! maschine-plugin: manifest tooling for Maschine plugin authors
//!
//! Exposes the command handlers so they can be tested without spawning the binary.

pub mod checksums;
pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
pub use errors::CliError;
