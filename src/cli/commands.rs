//! CLI command definitions
//!
//! Workflows gather their inputs through prompts, so the run commands take no
//! arguments of their own.

use clap::Args;

/// Create the next event
#[derive(Debug, Args, Clone)]
pub struct CreateCommand {}

/// Print the template event's settings
#[derive(Debug, Args, Clone)]
pub struct EventSettingsCommand {}

/// Regenerate the social preview image
#[derive(Debug, Args, Clone)]
pub struct SocialImageCommand {}

/// Check configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateConfigCommand {
    /// Print the effective settings as JSON
    #[arg(long)]
    pub json: bool,
}
