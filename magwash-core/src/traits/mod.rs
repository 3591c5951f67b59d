//! Hardware abstraction traits
//!
//! These traits define the interface between the bookkeeping logic
//! and robot-specific driver implementations.

pub mod module;
pub mod operator;
pub mod pipette;
pub mod workcell;

pub use module::{MagnetStatus, MagneticModule, ModuleError, Thermocycler};
pub use operator::Operator;
pub use pipette::{FlowRates, Pipette, PipetteError};
pub use workcell::{Instrument, Workcell};
