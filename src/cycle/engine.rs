//! Cycle engine
//!
//! Runs an unbounded sequence of work/rest cycles and keeps the session log
//! correct when the run is cut short.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working -> Resting -> AwaitingAck -> Working -> ...
//! ```
//!
//! There is no terminal state. A run ends only when the interrupt future
//! given to [`CycleEngine::run_until_interrupted`] resolves, or when the
//! acknowledgment input is closed.
//!
//! ## Interrupts
//!
//! The cycle loop is raced against the interrupt future on the same task.
//! When the interrupt wins, the loop is dropped at whatever tick or prompt it
//! was waiting on, and the engine state it left behind (the active
//! [`PeriodClock`], if any) decides what partial record is written.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{sleep, sleep_until, Instant};

use super::clock::{PeriodClock, PeriodKind};
use super::config::Schedule;
use crate::cli::PeriodDisplay;
use crate::cue::Cue;
use crate::log::{CompletionRecord, SessionLog};

/// Interval between countdown redraws
pub const TICK: Duration = Duration::from_secs(1);

/// Pause after the end-of-period cue so the sound can play out
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Where the engine is in the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Constructed but not started
    Idle,
    /// A work period is active
    Working,
    /// A rest period is active
    Resting,
    /// Both periods finished; waiting for the user to start the next cycle
    AwaitingAck,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The interrupt fired. Holds the partial record if a period was active.
    Interrupted(Option<CompletionRecord>),
    /// The acknowledgment input reached end-of-file between cycles
    InputClosed,
}

/// The work/rest state machine
pub struct CycleEngine<C> {
    topic: String,
    schedule: Schedule,
    cue: C,
    log: SessionLog,
    display: PeriodDisplay,
    state: CycleState,
    period: Option<PeriodClock>,
    cycles_completed: u32,
}

impl<C: Cue> CycleEngine<C> {
    /// Create an idle engine. The log stays open for the engine's lifetime.
    #[must_use]
    pub fn new(topic: &str, schedule: Schedule, cue: C, log: SessionLog) -> Self {
        Self {
            topic: topic.to_string(),
            schedule,
            cue,
            log,
            display: PeriodDisplay::new(topic),
            state: CycleState::Idle,
            period: None,
            cycles_completed: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current state
    #[must_use]
    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Full cycles finished in this run
    #[must_use]
    pub const fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// The active period, if any
    #[must_use]
    pub const fn period(&self) -> Option<&PeriodClock> {
        self.period.as_ref()
    }

    /// The record an interrupt at `now` would write.
    ///
    /// During work only the elapsed work counts. During rest the work period
    /// has already finished, so its full length is logged with the elapsed
    /// rest. Between cycles nothing is active and there is no record.
    #[must_use]
    pub fn partial_record(&self, now: Instant) -> Option<CompletionRecord> {
        let clock = self.period?;
        let remaining = clock.remaining_secs(now);
        let (work, rest) = match clock.kind() {
            PeriodKind::Work => (self.schedule.work_seconds.saturating_sub(remaining), 0),
            PeriodKind::Rest => (
                self.schedule.work_seconds,
                self.schedule.rest_seconds.saturating_sub(remaining),
            ),
        };
        Some(CompletionRecord::now(&self.topic, work, rest))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run cycles until the acknowledgment input is closed.
    ///
    /// Each line read from `acks` starts the next cycle.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, acks: &mut R) -> Result<()> {
        loop {
            self.run_period(PeriodKind::Work, self.schedule.work()).await;
            self.run_period(PeriodKind::Rest, self.schedule.rest()).await;
            if !self.complete_cycle(acks).await? {
                return Ok(());
            }
        }
    }

    /// Run one period to its deadline, redrawing the countdown every tick.
    ///
    /// The period stays active through the closing cue and settle delay, so
    /// an interrupt there still logs it.
    pub async fn run_period(&mut self, kind: PeriodKind, duration: Duration) {
        self.state = kind.state();
        self.display.print_period_start(kind, self.cycles_completed + 1);
        self.play_cue();

        let clock = PeriodClock::start(kind, duration, Instant::now());
        self.period = Some(clock);
        log::debug!("{kind} period started, {}s", duration.as_secs());

        loop {
            let now = Instant::now();
            self.display.render_tick(kind, clock.elapsed_secs(now), clock.remaining_secs(now));
            if clock.is_finished(now) {
                break;
            }
            sleep_until((now + TICK).min(clock.deadline())).await;
        }

        self.display.print_period_complete(kind);
        self.play_cue();
        sleep(SETTLE_DELAY).await;
        log::debug!("{kind} period finished");
    }

    /// Log the finished cycle and wait for the user to start the next one.
    ///
    /// Returns `false` if `acks` is at end-of-file.
    pub async fn complete_cycle<R>(&mut self, acks: &mut R) -> Result<bool>
    where
        R: AsyncBufRead + Unpin,
    {
        let record = CompletionRecord::now(
            &self.topic,
            self.schedule.work_seconds,
            self.schedule.rest_seconds,
        );
        self.log.append(&record)?;

        // No await between the append and here, so an interrupt can never
        // log this cycle a second time
        self.period = None;
        self.state = CycleState::AwaitingAck;
        self.cycles_completed += 1;
        self.display.print_cycle_logged(&record, self.cycles_completed);

        let mut line = String::new();
        let read = acks
            .read_line(&mut line)
            .await
            .context("Failed to read acknowledgment")?;
        Ok(read > 0)
    }

    /// Write the partial record for the active period, if there is one.
    ///
    /// The period is cleared afterwards, so calling this again writes nothing.
    pub fn handle_interrupt(&mut self) -> Result<Option<CompletionRecord>> {
        let record = self.partial_record(Instant::now());
        if let Some(record) = &record {
            self.log.append(record)?;
        }
        self.period = None;
        Ok(record)
    }

    /// Run cycles until `interrupt` resolves or the acknowledgment input is
    /// closed, then write any partial record and close the log.
    pub async fn run_until_interrupted<R, F>(
        mut self,
        acks: &mut R,
        interrupt: F,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let interrupted = {
            let cycles = self.run(acks);
            tokio::pin!(cycles);
            tokio::select! {
                result = &mut cycles => {
                    result?;
                    false
                }
                () = interrupt => true,
            }
        };

        let end = if interrupted {
            log::debug!("Interrupted while {:?}", self.state);
            self.display.print_interrupt_received();
            let record = self.handle_interrupt()?;
            self.display.print_saved(record.as_ref());
            SessionEnd::Interrupted(record)
        } else {
            self.display.print_input_closed();
            SessionEnd::InputClosed
        };

        self.log.close()?;
        Ok(end)
    }

    fn play_cue(&self) {
        // Playback is best effort once the timer is running
        if let Err(e) = self.cue.play() {
            log::warn!("{e:#}");
        }
    }
}
