//! Period timing
//!
//! A period is tracked by its start instant and an absolute deadline fixed
//! when the period begins. Remaining and elapsed time are recomputed from
//! those two instants on every read, so a late tick never accumulates drift.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::engine::CycleState;

/// The two kinds of period in a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    /// Focused work
    Work,
    /// Break between work periods
    Rest,
}

impl PeriodKind {
    /// Engine state while a period of this kind is active
    #[must_use]
    pub const fn state(self) -> CycleState {
        match self {
            Self::Work => CycleState::Working,
            Self::Rest => CycleState::Resting,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Work => write!(f, "Work"),
            Self::Rest => write!(f, "Rest"),
        }
    }
}

/// Start and deadline of the active period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClock {
    kind: PeriodKind,
    started_at: Instant,
    deadline: Instant,
}

impl PeriodClock {
    /// Start a period of `duration` at `now`.
    #[must_use]
    pub fn start(kind: PeriodKind, duration: Duration, now: Instant) -> Self {
        Self {
            kind,
            started_at: now,
            deadline: now + duration,
        }
    }

    /// Kind of the period
    #[must_use]
    pub const fn kind(&self) -> PeriodKind {
        self.kind
    }

    /// Absolute instant the period ends
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Scheduled length of the period
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.deadline - self.started_at
    }

    /// Time left until the deadline, zero once it has passed
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Time spent in the period, capped at its scheduled length
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
            .min(self.duration())
    }

    /// Remaining time rounded to the nearest whole second
    #[must_use]
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        round_secs(self.remaining(now))
    }

    /// Elapsed time rounded to the nearest whole second
    #[must_use]
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        round_secs(self.elapsed(now))
    }

    /// True once the deadline has been reached
    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

fn round_secs(duration: Duration) -> u64 {
    (duration + Duration::from_millis(500)).as_secs()
}
