//! Repository layer: entity-scoped database operations.
//!
//! Plain functions over a borrowed `Connection`; the caller decides how
//! long the connection lives.

mod diet_plan;
mod doctor;
mod patient;

pub use diet_plan::*;
pub use doctor::*;
pub use patient::*;
