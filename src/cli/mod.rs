//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CreateCommand, EventSettingsCommand, SocialImageCommand, ValidateConfigCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Meetup organizer chores
#[derive(Debug, Parser, Clone)]
#[command(name = "meetup-ops")]
#[command(version)]
#[command(about = "Automates the recurring chores of running a community meetup", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the settings file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Create the next event: mentor issue, tickets, calendar listing, site
    Create(CreateCommand),

    /// Print the template event's ticketing settings
    EventSettings(EventSettingsCommand),

    /// Regenerate the social preview image
    SocialImage(SocialImageCommand),

    /// Check the settings file and credentials
    ValidateConfig(ValidateConfigCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
