//! Command-line interface.
//!
//! `watch` runs the panel in the terminal; the other commands talk to the
//! player once and exit.

mod commands;
pub mod formatting;
mod types;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    config::{Config, ConfigPaths},
    services::now_playing::PlayerCommand,
};

pub use commands::watch::PanelAction;
pub use types::{CliError, CommandResult};

/// Top-level arguments
#[derive(Parser, Debug)]
#[command(name = "nowplaying", version)]
#[command(about = "Mirror and control an MPRIS media player")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bus name of the player, overriding the config file
    #[arg(short, long, global = true)]
    pub player: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Follow the player and print the panel line on every change
    Watch,
    /// Show whether the player runs and what it plays
    Status,
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Previous,
    /// Toggle play/pause
    Toggle,
    /// Bring the player window to the front
    Raise,
    /// Ask the player to exit
    Quit,
    /// Inspect the configuration
    Config {
        /// Config action
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// `config` subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the JSON schema of the config file
    Schema,
    /// Print where the config file is read from
    Path,
}

impl Command {
    /// Player command sent by the one-shot control subcommands
    pub fn player_command(&self) -> Option<PlayerCommand> {
        match self {
            Command::Next => Some(PlayerCommand::Next),
            Command::Previous => Some(PlayerCommand::Previous),
            Command::Toggle => Some(PlayerCommand::PlayPause),
            Command::Raise => Some(PlayerCommand::Raise),
            Command::Quit => Some(PlayerCommand::Quit),
            _ => None,
        }
    }

    /// Whether the command runs long enough to want a log file
    pub fn is_long_running(&self) -> bool {
        matches!(self, Command::Watch)
    }
}

impl Cli {
    /// Load the config file, applying command line overrides
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load_config(&self) -> crate::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(player) = &self.player {
            config.player.service_name = player.clone();
            config.validate()?;
        }

        Ok(config)
    }

    /// Where the config file is read from
    ///
    /// # Errors
    /// Returns an error if no explicit path was given and the default
    /// location cannot be determined.
    pub fn config_path(&self) -> Result<PathBuf, CliError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(ConfigPaths::main_config()?),
        }
    }

    /// Run the selected command with an already loaded config
    ///
    /// Config subcommands work even when loading failed.
    ///
    /// # Errors
    /// Returns `CliError` if the config is unusable or the command fails.
    pub async fn run(&self, config: crate::Result<Config>) -> CommandResult {
        if let Command::Config { command } = &self.command {
            return match command {
                ConfigCommand::Schema => Ok(Config::schema_json()?),
                ConfigCommand::Path => Ok(self.config_path()?.display().to_string()),
            };
        }

        let config = config?;

        if let Some(command) = self.command.player_command() {
            return commands::player::send(&config.player, command).await;
        }

        match self.command {
            Command::Watch => commands::watch::watch(&config).await,
            _ => commands::status::status(&config.player).await,
        }
    }
}
