//! Shared test utilities
//!
//! Common helpers used across test modules. Only compiled in test builds.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use tempfile::TempDir;

use crate::cue::Cue;
use crate::cycle::config::Schedule;
use crate::cycle::engine::CycleEngine;
use crate::log::SessionLog;

/// Cue that counts how often it was played. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct RecordingCue {
    plays: Arc<AtomicUsize>,
}

impl RecordingCue {
    /// Number of plays so far
    #[must_use]
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl Cue for RecordingCue {
    fn play(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Cue whose player can never be started
#[derive(Debug, Clone, Copy)]
pub struct FailingCue;

impl Cue for FailingCue {
    fn play(&self) -> Result<()> {
        bail!("no sound device")
    }
}

/// Create an engine for topic "Work" logging to `times.csv` inside `dir`.
///
/// Returns the engine, a handle on its cue, and the log path.
#[must_use]
pub fn test_engine(
    dir: &TempDir,
    schedule: Schedule,
) -> (CycleEngine<RecordingCue>, RecordingCue, PathBuf) {
    let path = dir.path().join("times.csv");
    let log = SessionLog::open(&path).unwrap();
    let cue = RecordingCue::default();
    let engine = CycleEngine::new("Work", schedule, cue.clone(), log);
    (engine, cue, path)
}
