//! Deck module traits
//!
//! This module defines traits for the powered modules a bead protocol uses:
//! - Magnetic module (bead separation)
//! - Thermocycler (block and heated lid)

use core::fmt;
use core::time::Duration;

/// Errors that can occur with module operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleError {
    /// Module did not respond
    NotConnected,
    /// Requested magnet height outside the module's travel
    HeightOutOfRange,
    /// Requested temperature outside the module's range
    TemperatureOutOfRange,
    /// Lid motion blocked or lid in the wrong position
    LidFault,
    /// Generic hardware fault
    Fault,
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::NotConnected => f.write_str("module not connected"),
            ModuleError::HeightOutOfRange => f.write_str("magnet height out of range"),
            ModuleError::TemperatureOutOfRange => f.write_str("temperature out of range"),
            ModuleError::LidFault => f.write_str("thermocycler lid fault"),
            ModuleError::Fault => f.write_str("module hardware fault"),
        }
    }
}

impl core::error::Error for ModuleError {}

/// Magnet position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagnetStatus {
    /// Magnets raised against the plate
    Engaged,
    /// Magnets lowered away from the plate
    #[default]
    Disengaged,
}

/// Trait for a magnetic separation module
pub trait MagneticModule {
    /// Raise the magnets to `height_mm` above the plate base
    fn engage(&mut self, height_mm: f32) -> Result<(), ModuleError>;

    /// Lower the magnets
    fn disengage(&mut self) -> Result<(), ModuleError>;

    /// Get the current magnet position
    fn status(&self) -> MagnetStatus;

    /// Check if the magnets are engaged
    fn is_engaged(&self) -> bool {
        self.status() == MagnetStatus::Engaged
    }
}

/// Trait for a thermocycler with a heated lid
///
/// Temperature calls block until the block reaches the target and, when a
/// hold is given, until the hold elapses.
pub trait Thermocycler {
    /// Set the block temperature, optionally holding and ramping
    ///
    /// `ramp_rate` is in °C/s; `None` uses the module's maximum.
    fn set_block_temperature(
        &mut self,
        celsius: f32,
        hold: Option<Duration>,
        ramp_rate: Option<f32>,
    ) -> Result<(), ModuleError>;

    /// Set the heated lid temperature
    fn set_lid_temperature(&mut self, celsius: f32) -> Result<(), ModuleError>;

    /// Turn the lid heater off
    fn deactivate_lid(&mut self) -> Result<(), ModuleError>;

    /// Open the lid
    fn open_lid(&mut self) -> Result<(), ModuleError>;

    /// Close the lid
    fn close_lid(&mut self) -> Result<(), ModuleError>;
}
