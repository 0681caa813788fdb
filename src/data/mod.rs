//! Stand-in data sources.

pub mod stub;

pub use stub::*;
