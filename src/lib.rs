//! Nightshade - work/rest interval timer
//!
//! Nightshade alternates work and rest periods, plays an alarm sound at
//! every period boundary, and appends what was completed to a CSV log,
//! including the partial period when the timer is interrupted.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod cue;
pub mod cycle;
pub mod error;
pub mod log;
pub mod signal;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use cli::PeriodDisplay;
pub use cue::{CommandCue, Cue};
pub use cycle::clock::{PeriodClock, PeriodKind};
pub use cycle::config::{Schedule, Settings, SettingsLayer};
pub use cycle::engine::{CycleEngine, CycleState, SessionEnd};
pub use error::TimerError;
pub use log::{read_records, CompletionRecord, SessionLog};
