//! Input/output helpers.
//!
//! - manifest loading (`manifest`)
//! - metrics ingest + validation (`ingest`)
//! - per-target SAR JSON files (`sar`)
//! - table and report exports (`export`)

pub mod export;
pub mod ingest;
pub mod manifest;
pub mod sar;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
pub use sar::*;
