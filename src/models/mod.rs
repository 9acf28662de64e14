pub mod diet_plan;
pub mod doctor;
pub mod enums;
pub mod identity;
pub mod patient;

pub use diet_plan::*;
pub use doctor::*;
pub use enums::*;
pub use identity::*;
pub use patient::*;
