//! Motion patterns
//!
//! Target points for mixing moves. Kinematics and geometry resolution stay
//! with the driver; these are symbolic locations only.

pub mod resuspend;

pub use resuspend::{MixMove, MixMoves, ResuspensionMotion};
