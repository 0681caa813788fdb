//! Structural audit record assembly and validation.

pub mod batch;
pub mod builder;
pub mod validate;

pub use batch::*;
pub use builder::*;
pub use validate::*;

/// Default SAR schema version.
pub const SAR_VERSION: &str = "1.0";
