//! CLI route: single route table and run context. Dispatches to config and state handling.

use crate::cli::parse::{Commands, ConfigCommands, StateCommands};
use crate::config::{MixConfig, CONFIG_FILENAME, CURRENT_CONFIG_VERSION};
use crate::document::VersionedDocument;
use crate::error::ConfigError;
use crate::state::{FormatResolver, MixState};
use std::path::PathBuf;
use tracing::info;

/// Runtime context for CLI execution: the document paths selected on the command line.
pub struct RunContext {
    config_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
}

impl RunContext {
    pub fn new(config_path: Option<PathBuf>, state_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            state_path,
        }
    }

    /// Execute a CLI command via the single route table.
    ///
    /// Returns text for stdout; empty when the command printed on its own.
    pub fn execute(&self, command: &Commands) -> Result<String, ConfigError> {
        match command {
            Commands::Config { command } => self.handle_config_command(command),
            Commands::State { command } => self.handle_state_command(command),
        }
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, ConfigError> {
        match command {
            ConfigCommands::Init { force } => {
                let mut config = MixConfig::load_defaults()?;
                config.init_config_path(self.config_path.as_deref())?;
                if config.filename().exists() && !force {
                    return Ok(format!(
                        "{} already exists (use --force to overwrite)",
                        config.filename().display()
                    ));
                }

                let config = match self.config_path {
                    Some(_) => {
                        config.save()?;
                        config
                    }
                    None => MixConfig::create_default_config()?,
                };
                info!(config_path = %config.filename().display(), "Created default config");
                Ok(format!("Created {}", config.filename().display()))
            }
            ConfigCommands::Convert => {
                let mut config = MixConfig::load_defaults()?;
                let converted = config.convert(self.config_path.as_deref())?;
                if converted {
                    Ok(format!(
                        "Converted {} to version {}",
                        config.filename().display(),
                        CURRENT_CONFIG_VERSION
                    ))
                } else {
                    Ok(format!(
                        "{} is already at version {}",
                        config.filename().display(),
                        CURRENT_CONFIG_VERSION
                    ))
                }
            }
            ConfigCommands::Print => {
                let config = MixConfig::load(self.config_path.as_deref())?;
                config.print()?;
                Ok(String::new())
            }
            ConfigCommands::Validate => {
                let config = MixConfig::load(self.config_path.as_deref())?;
                Ok(format!("{} is valid", config.filename().display()))
            }
            ConfigCommands::Get { property } => {
                let config = MixConfig::load(self.config_path.as_deref())?;
                config
                    .get_property(property)
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: property.clone(),
                        message: "unknown property (expected SECTION.KEY)".to_string(),
                    })
            }
        }
    }

    fn handle_state_command(&self, command: &StateCommands) -> Result<String, ConfigError> {
        let mut state = MixState::load_with(self.state_path.as_deref(), &self.format_resolver())?;

        match command {
            StateCommands::Show => Ok(format_state(&state)),
            StateCommands::Set { format, offline } => {
                if let Some(format) = format {
                    state.set_format(format.clone());
                }
                if let Some(offline) = offline {
                    state.set_offline(*offline);
                }
                state.save()?;
                Ok(format_state(&state))
            }
        }
    }

    /// Look for a legacy FORMAT in the config file selected on the command line.
    fn format_resolver(&self) -> FormatResolver {
        FormatResolver {
            config_path: self
                .config_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME)),
            ..FormatResolver::default()
        }
    }
}

fn format_state(state: &MixState) -> String {
    format!(
        "File: {}\nVersion: {}\nFormat: {} (from {})\nOffline: {}",
        state.filename().display(),
        state.version(),
        state.format(),
        state.format_source(),
        state.is_offline()
    )
}
