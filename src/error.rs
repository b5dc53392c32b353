//! Startup errors
//!
//! Everything that can stop the timer before the first period starts.
//! Configuration errors come from user input; resource errors come from
//! files the timer needs for its whole lifetime.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving settings and acquiring resources
#[derive(Error, Debug)]
pub enum TimerError {
    /// The `--schedule` value is not a valid `W,R` minute pair
    #[error("Invalid --schedule argument: {input:?} ({reason})")]
    InvalidSchedule {
        /// The raw value as given
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// The `--topic` value contains a line break or other control character
    #[error("Invalid --topic argument: {0:?} (control characters are not allowed)")]
    InvalidTopic(String),

    /// The `--player` command line is empty
    #[error("Invalid --player argument: {0:?}")]
    InvalidPlayer(String),

    /// The settings file could not be read
    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for the settings layer
    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// The alarm sound cannot be used
    #[error("Alarm sound {} is not usable: {reason}", .path.display())]
    CueUnavailable {
        /// Path of the sound file
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// The session log cannot be opened for appending
    #[error("Failed to open log file {}: {source}", .path.display())]
    LogUnavailable {
        /// Path of the log file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}
