//! Cycle management
//!
//! This module handles the schedule, period timing, and the work/rest
//! state machine.

pub mod clock;
pub mod config;
pub mod engine;
