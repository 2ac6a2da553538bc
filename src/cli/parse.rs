//! CLI parse: clap types for Mixer. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mixer CLI - Mix build configuration and state
#[derive(Parser)]
#[command(name = "mixer")]
#[command(about = "Manage builder.conf and mixer.state for a mix workspace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ./builder.conf)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// State file path (default: ./mixer.state)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// builder.conf commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// mixer.state commands
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create a default builder.conf
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Convert an outdated builder.conf to the current format
    Convert,
    /// Print the loaded configuration
    Print,
    /// Load and validate the configuration
    Validate,
    /// Print a single value, e.g. `Builder.CERT`
    Get {
        /// Property as SECTION.KEY
        property: String,
    },
}

#[derive(Subcommand)]
pub enum StateCommands {
    /// Show the current state, creating the file if needed
    Show,
    /// Update state values
    Set {
        /// Build format
        #[arg(long)]
        format: Option<String>,
        /// Offline mode
        #[arg(long)]
        offline: Option<bool>,
    },
}
