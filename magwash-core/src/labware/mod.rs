//! Labware references
//!
//! Wells and locations are symbolic. Resolving them to deck coordinates is
//! the driver's job.

pub mod location;

pub use location::{Anchor, LabwareId, Location, Point, WellRef, PLATE_COLUMNS, PLATE_ROWS};
