//! Vendor-agnostic core logic for bead-wash protocols
//!
//! This crate contains all bookkeeping and orchestration logic that does
//! not depend on a specific robot or driver:
//!
//! - Hardware abstraction traits (pipette, magnet, thermocycler, operator)
//! - Symbolic labware locations
//! - Tip, trash and liquid-waste accounting
//! - Resuspension motion patterns
//! - Step planners and the re-entrant plan executor
//! - Recipe sequencing and the run state machine
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod inventory;
pub mod labware;
pub mod motion;
pub mod recipe;
pub mod scheduler;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;
