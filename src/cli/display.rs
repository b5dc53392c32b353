//! Terminal display for the timer
//!
//! Renders the live countdown, period transitions, and prompts.
//! All output goes to stderr so stdout remains clean for piping.

use std::io::Write as IoWrite;

use colored::Colorize;

use crate::cycle::clock::PeriodKind;
use crate::log::CompletionRecord;

/// Name printed in the version banner
pub const CANONICAL_NAME: &str = "Nightshade Pomedoro";

const LICENSE_NOTICE: &str = "\
License GPLv3+: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>
This is free software: you are free to change and redistribute it.
There is NO WARRANTY, to the extent permitted by law.";

/// Width the countdown line is padded to, so a shorter line fully
/// overwrites a longer one
const LINE_WIDTH: usize = 60;

/// Format whole seconds as `H:MM:SS`
#[must_use]
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{hours}:{mins:02}:{secs:02}")
}

/// Text printed for `--version`
#[must_use]
pub fn version_banner() -> String {
    format!(
        "{CANONICAL_NAME} {}\n{LICENSE_NOTICE}\nWritten by {}\n",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    )
}

/// Plain text of one countdown tick, without color or padding
#[must_use]
pub fn tick_line(kind: PeriodKind, elapsed_secs: u64, remaining_secs: u64) -> String {
    format!(
        "{kind} Period | Elapsed {} | Remaining {}",
        format_hms(elapsed_secs),
        format_hms(remaining_secs)
    )
}

/// Display handler for one timer session
pub struct PeriodDisplay {
    topic: String,
}

impl PeriodDisplay {
    /// Create a new display handler for the given topic
    #[must_use]
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
        }
    }

    /// Print the header when a period starts
    pub fn print_period_start(&self, kind: PeriodKind, cycle: u32) {
        match kind {
            PeriodKind::Work => eprintln!(
                "{} {} {}",
                "Working on:".bold().cyan(),
                self.topic.bold(),
                format!("| Cycle #{cycle}").dimmed()
            ),
            PeriodKind::Rest => eprintln!(
                "{} {}",
                "Resting".bold().green(),
                format!("| Cycle #{cycle}").dimmed()
            ),
        }
    }

    /// Overwrite the current terminal line with the countdown
    pub fn render_tick(&self, kind: PeriodKind, elapsed_secs: u64, remaining_secs: u64) {
        let line = tick_line(kind, elapsed_secs, remaining_secs);
        overwrite_line(&format!("{line:<LINE_WIDTH$}"));
    }

    /// Replace the countdown line with the completion message
    pub fn print_period_complete(&self, kind: PeriodKind) {
        let message = format!("{kind} Period Complete");
        eprintln!("\r{}{}", message.bold(), " ".repeat(LINE_WIDTH - message.len()));
    }

    /// Print the logged cycle and ask for the go-ahead
    pub fn print_cycle_logged(&self, record: &CompletionRecord, cycles_completed: u32) {
        eprintln!("{}", "─".repeat(50).dimmed());
        eprintln!(
            "  {} {} | {} work, {} rest | {} cycle(s) this session",
            "LOGGED".green().bold(),
            record.topic.bold(),
            format_hms(record.completed_work_seconds),
            format_hms(record.completed_rest_seconds),
            cycles_completed
        );
        eprint!("{} ", "Press ENTER to start the next cycle".yellow());
        flush_stderr();
    }

    /// Announce the interrupt before the final record is written
    pub fn print_interrupt_received(&self) {
        eprintln!();
        eprintln!("{}", "Interrupt received, writing final log...".yellow().bold());
    }

    /// Report what the interrupt saved
    pub fn print_saved(&self, record: Option<&CompletionRecord>) {
        match record {
            Some(record) => eprintln!(
                "  {} {} work, {} rest",
                "Saved".green(),
                format_hms(record.completed_work_seconds),
                format_hms(record.completed_rest_seconds)
            ),
            None => eprintln!("  {}", "No period in progress, nothing to save".dimmed()),
        }
    }

    /// Announce that no further acknowledgment can arrive
    pub fn print_input_closed(&self) {
        eprintln!();
        eprintln!("{}", "Input closed, stopping.".dimmed());
    }
}

fn overwrite_line(text: &str) {
    eprint!("\r{text}");
    flush_stderr();
}

fn flush_stderr() {
    // A terminal that cannot be flushed only delays the redraw
    let _ = std::io::stderr().flush();
}
