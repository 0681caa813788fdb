//! `sar-gate` library crate.
//!
//! The binary (`sar`) is a thin wrapper around this library so that:
//!
//! - the gate rules are testable without spawning processes
//! - batch evaluation and report compilation are reusable from other tools
//! - code stays easy to navigate as the rule set grows

pub mod app;
pub mod calibration;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod gate;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod sar;
