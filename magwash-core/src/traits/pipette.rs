//! Pipette driver trait

use core::fmt;

use crate::labware::Location;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors that can occur with pipette operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipetteError {
    /// Liquid handling attempted without a tip
    NoTip,
    /// Pick-up attempted while a tip is already attached
    TipAttached,
    /// Requested volume exceeds the tip/pipette capacity
    OverCapacity,
    /// Dispense requested more than the pipette holds
    InsufficientVolume,
    /// Motion or plunger fault reported by the hardware
    Fault,
}

impl fmt::Display for PipetteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipetteError::NoTip => f.write_str("no tip attached"),
            PipetteError::TipAttached => f.write_str("tip already attached"),
            PipetteError::OverCapacity => f.write_str("volume exceeds pipette capacity"),
            PipetteError::InsufficientVolume => f.write_str("not enough liquid in tip"),
            PipetteError::Fault => f.write_str("pipette hardware fault"),
        }
    }
}

impl core::error::Error for PipetteError {}

/// Plunger flow rates in µl/s
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowRates {
    pub aspirate: f32,
    pub dispense: f32,
    pub blow_out: f32,
}

impl FlowRates {
    /// Create a set of flow rates
    pub const fn new(aspirate: f32, dispense: f32, blow_out: f32) -> Self {
        Self {
            aspirate,
            dispense,
            blow_out,
        }
    }

    /// Same rates with a different aspirate speed
    pub const fn with_aspirate(self, aspirate: f32) -> Self {
        Self { aspirate, ..self }
    }

    /// Same rates with a different dispense speed
    pub const fn with_dispense(self, dispense: f32) -> Self {
        Self { dispense, ..self }
    }
}

impl Default for FlowRates {
    fn default() -> Self {
        Self::new(50.0, 150.0, 300.0)
    }
}

/// Trait for a liquid-handling pipette
///
/// Every call blocks until the motion completes. Volumes are in µl and
/// `rate` is a multiplier on the configured flow rate.
pub trait Pipette {
    /// Number of channels on the head (1 or 8)
    fn channels(&self) -> u8;

    /// Maximum tip volume in µl
    fn max_volume(&self) -> f32;

    /// Volume (liquid and air) currently held in the tip
    fn current_volume(&self) -> f32;

    /// Check if a tip is attached
    fn has_tip(&self) -> bool;

    /// Get the current flow rates
    fn flow_rates(&self) -> FlowRates;

    /// Set the flow rates used by subsequent moves
    fn set_flow_rates(&mut self, rates: FlowRates);

    /// Pick up a tip from the given rack position
    fn pick_up_tip(&mut self, at: Location) -> Result<(), PipetteError>;

    /// Drop the attached tip at the given location
    fn drop_tip(&mut self, at: Location) -> Result<(), PipetteError>;

    /// Aspirate `volume` at a location
    fn aspirate(&mut self, volume: f32, at: Location, rate: f32) -> Result<(), PipetteError>;

    /// Dispense `volume` at a location
    fn dispense(&mut self, volume: f32, at: Location, rate: f32) -> Result<(), PipetteError>;

    /// Expel everything, including residual droplets
    fn blow_out(&mut self, at: Location) -> Result<(), PipetteError>;

    /// Draw air into the tip at the current position
    fn air_gap(&mut self, volume: f32) -> Result<(), PipetteError>;

    /// Move without liquid handling
    fn move_to(&mut self, at: Location) -> Result<(), PipetteError>;

    /// Aspirate and dispense `volume` in place `reps` times
    fn mix(&mut self, reps: u8, volume: f32, at: Location) -> Result<(), PipetteError>;

    /// Touch the tip against the walls of the current well
    fn touch_tip(&mut self) -> Result<(), PipetteError>;

    /// Home the pipette axes
    fn home(&mut self) -> Result<(), PipetteError>;

    /// Dispense whatever the tip holds
    fn dispense_all(&mut self, at: Location, rate: f32) -> Result<(), PipetteError> {
        let volume = self.current_volume();
        if volume > 0.0 {
            self.dispense(volume, at, rate)
        } else {
            Ok(())
        }
    }
}
