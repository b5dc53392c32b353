//! Timer configuration
//!
//! Parses the `W,R` schedule and resolves the timer settings from the
//! command line, an optional TOML settings file, and built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::TimerError;

/// Default label stored in log records
pub const DEFAULT_TOPIC: &str = "Work";
/// Default `W,R` schedule in minutes
pub const DEFAULT_SCHEDULE: &str = "25,5";
/// Default log file
pub const DEFAULT_OUTPUT_PATH: &str = "pomedoro_times.csv";
/// Default alarm sound
pub const DEFAULT_ALARM_PATH: &str = "ship-bell.mp3";

/// Longest period a schedule may ask for, one year in minutes
pub const MAX_PERIOD_MINUTES: u64 = 365 * 24 * 60;

/// Default command used to play the alarm sound
#[cfg(target_os = "macos")]
pub const DEFAULT_PLAYER: &str = "afplay";
/// Default command used to play the alarm sound
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_PLAYER: &str = "ffplay -nodisp -autoexit -loglevel quiet";

/// Work and rest durations of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Length of the work period in seconds
    pub work_seconds: u64,
    /// Length of the rest period in seconds
    pub rest_seconds: u64,
}

impl Schedule {
    /// Parse a `work_minutes,rest_minutes` pair such as `"25,5"`.
    pub fn parse(input: &str) -> Result<Self, TimerError> {
        let invalid = |reason: &str| TimerError::InvalidSchedule {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (work, rest) = input
            .trim()
            .split_once(',')
            .ok_or_else(|| invalid("expected work_minutes,rest_minutes"))?;
        if rest.contains(',') {
            return Err(invalid("expected exactly two values"));
        }

        let work =
            parse_minutes(work).ok_or_else(|| invalid("work minutes must be a positive integer"))?;
        let rest =
            parse_minutes(rest).ok_or_else(|| invalid("rest minutes must be a positive integer"))?;

        Ok(Self {
            work_seconds: minutes_to_seconds(input, work)?,
            rest_seconds: minutes_to_seconds(input, rest)?,
        })
    }

    /// Work period length
    #[must_use]
    pub const fn work(&self) -> Duration {
        Duration::from_secs(self.work_seconds)
    }

    /// Rest period length
    #[must_use]
    pub const fn rest(&self) -> Duration {
        Duration::from_secs(self.rest_seconds)
    }
}

fn parse_minutes(value: &str) -> Option<u64> {
    let value = value.trim();
    // u64::from_str accepts a leading '+', which is not part of the format
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn minutes_to_seconds(input: &str, minutes: u64) -> Result<u64, TimerError> {
    let invalid = |reason: &str| TimerError::InvalidSchedule {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    if minutes == 0 {
        return Err(invalid("minutes must be greater than zero"));
    }
    if minutes > MAX_PERIOD_MINUTES {
        return Err(invalid("a period may not be longer than one year"));
    }
    Ok(minutes * 60)
}

/// One layer of settings where every value is optional.
///
/// Both the settings file and the command line produce a layer; see
/// [`Settings::resolve`] for how they are combined.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    /// Label stored in log records
    #[serde(default)]
    pub topic: Option<String>,
    /// `W,R` schedule in minutes
    #[serde(default)]
    pub schedule: Option<String>,
    /// Log file path
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Alarm sound path
    #[serde(default)]
    pub alarm_path: Option<PathBuf>,
    /// Player command line
    #[serde(default)]
    pub player: Option<String>,
}

impl SettingsLayer {
    /// Read a settings file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TimerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TimerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| TimerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved timer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Label stored in log records
    pub topic: String,
    /// Work/rest schedule
    pub schedule: Schedule,
    /// Log file path
    pub output_path: PathBuf,
    /// Alarm sound path
    pub alarm_path: PathBuf,
    /// Player command line
    pub player: String,
}

impl Settings {
    /// Combine the command-line layer and the file layer.
    ///
    /// Command-line values win over file values, which win over the built-in
    /// defaults. The topic and schedule are validated here so a malformed value stops
    /// the program before any timer state exists.
    pub fn resolve(cli: SettingsLayer, file: SettingsLayer) -> Result<Self, TimerError> {
        let schedule = cli
            .schedule
            .or(file.schedule)
            .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());

        let topic = cli
            .topic
            .or(file.topic)
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        // A log record is one line, so the topic can't carry line breaks
        if topic.chars().any(char::is_control) {
            return Err(TimerError::InvalidTopic(topic));
        }

        Ok(Self {
            topic,
            schedule: Schedule::parse(&schedule)?,
            output_path: cli
                .output_path
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            alarm_path: cli
                .alarm_path
                .or(file.alarm_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ALARM_PATH)),
            player: cli
                .player
                .or(file.player)
                .unwrap_or_else(|| DEFAULT_PLAYER.to_string()),
        })
    }
}
