//! Session logging
//!
//! This module provides the append-only CSV log of completed work and
//! rest time.

pub mod csv;

pub use csv::{read_records, CompletionRecord, SessionLog};
