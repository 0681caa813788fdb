//! Decision-gate engine.
//!
//! Pure rule functions, applied per target in this order:
//!
//! - classify confidence signals into bands (`confidence`)
//! - look up the expected error range for the overall band (`error_range`)
//! - classify the failure mode against that range (`failure`)
//! - assign the decision gate and recommended action (`decision`)

pub mod confidence;
pub mod decision;
pub mod error_range;
pub mod failure;

pub use confidence::*;
pub use decision::*;
pub use error_range::*;
pub use failure::*;
