//! Command line interface.

use crate::constants::DEFAULT_PRESET;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "PTZ webcam control with face tracking", long_about = None)]
pub struct Cli {
    /// Video device, overriding the config file
    #[arg(short = 'd', long, global = true)]
    pub device: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the preview window with live controls (default)
    Run {
        /// Start with face tracking enabled
        #[arg(short, long)]
        track: bool,
    },

    /// Apply a preset to the device
    Apply {
        /// Preset name
        #[arg(default_value = DEFAULT_PRESET)]
        preset: String,
    },

    /// List video devices
    Devices,

    /// List the controls the device advertises
    Controls,

    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PresetAction {
    /// List preset names
    List,

    /// Save the device's current values under NAME
    Save { name: String },

    /// Delete a preset
    Delete { name: String },
}

impl Cli {
    /// Subcommand to run; `run` without tracking when none was given
    #[must_use]
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run { track: false })
    }
}
