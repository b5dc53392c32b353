//! CLI output formatting
//!
//! Provides human-readable terminal display for the running timer.

pub mod display;

pub use display::format_hms;
pub use display::version_banner;
pub use display::PeriodDisplay;
