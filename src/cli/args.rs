//! Command-line argument parsing for GuardianAI
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::DEFAULT_USER_ID;

/// GuardianAI - compliance answers grounded in the Ley 21.719 corpus
#[derive(Parser, Debug)]
#[command(name = "guardian")]
#[command(version)]
#[command(about = "Answer data-protection compliance questions with retrieval-augmented generation", long_about = None)]
pub struct Args {
    /// Configuration file path (overrides GUARDIAN_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (info), -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one compliance check and print the report
    Ask {
        /// The compliance question (at least 10 characters)
        #[arg(value_name = "TEXT")]
        text: String,

        /// Identifier of the user asking
        #[arg(short, long, default_value = DEFAULT_USER_ID)]
        user: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Abort the check after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Run deployment diagnostics and health checks
    Doctor,

    /// Display the effective configuration (secrets masked)
    Config {
        /// Write a config file with default values if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Default log filter for this verbosity
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should show progress spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
