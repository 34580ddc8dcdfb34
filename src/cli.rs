//! Command-line interface for ringstacker.

use crate::app::state::{DEFAULT_TRANSITION_DELAY, DEFAULT_WARNING_DURATION};
use crate::app::GameConfig;
use crate::game::{MAX_DISKS, MIN_DISKS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Ringstacker - Tower of Hanoi in six timed rounds
#[derive(Parser, Debug)]
#[command(name = "ringstacker")]
#[command(about = "Tower of Hanoi in six timed rounds", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory for the score database and log file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log filter used when RINGSTACKER_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play in the terminal
    Play(PlayArgs),

    /// Print the leaderboard
    Scores,

    /// Replace the leaderboard with the example entries
    ResetScores,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct PlayArgs {
    /// Start at the round that plays this many disks
    #[arg(long, value_parser = clap::value_parser!(u8).range(MIN_DISKS as i64..=MAX_DISKS as i64))]
    pub disks: Option<u8>,

    /// Pause after a win before the next round, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TRANSITION_DELAY.as_millis() as u64)]
    pub transition_ms: u64,

    /// How long an illegal-move warning stays up, in milliseconds
    #[arg(long, default_value_t = DEFAULT_WARNING_DURATION.as_millis() as u64)]
    pub warning_ms: u64,
}

impl Default for PlayArgs {
    fn default() -> Self {
        Self {
            disks: None,
            transition_ms: DEFAULT_TRANSITION_DELAY.as_millis() as u64,
            warning_ms: DEFAULT_WARNING_DURATION.as_millis() as u64,
        }
    }
}

impl PlayArgs {
    /// Session tunables for these arguments
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            transition_delay: Duration::from_millis(self.transition_ms),
            warning_duration: Duration::from_millis(self.warning_ms),
            ..GameConfig::default()
        }
    }
}

impl Cli {
    /// The command to run; bare `ringstacker` plays
    pub fn selected(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Play(PlayArgs::default()))
    }
}
