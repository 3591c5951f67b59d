//! Run errors

use core::fmt;

use crate::config::ConfigError;
use crate::state::ErrorKind;
use crate::traits::{Instrument, ModuleError, PipetteError};

/// Fault that stops a run
///
/// Driver errors pass through unchanged; nothing here retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunError {
    /// Step parameters or layout rejected before any motion
    Config(ConfigError),
    /// Pipette driver fault
    Pipette(PipetteError),
    /// Magnet or thermocycler driver fault
    Module(ModuleError),
    /// Plan released a tip that was never picked up
    NoTipHeld,
    /// Plan addressed a pipette that is not mounted
    NoInstrument(Instrument),
    /// Plan switched pipettes while a tip was still on the active one
    TipStillHeld,
}

impl RunError {
    /// State machine error kind for this fault
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Config(_) => ErrorKind::Config,
            RunError::Pipette(_) => ErrorKind::Pipette,
            RunError::Module(_) => ErrorKind::Module,
            RunError::NoTipHeld => ErrorKind::NoTipHeld,
            RunError::NoInstrument(_) => ErrorKind::Config,
            RunError::TipStillHeld => ErrorKind::Pipette,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "configuration error: {}", e),
            RunError::Pipette(e) => write!(f, "pipette error: {}", e),
            RunError::Module(e) => write!(f, "module error: {}", e),
            RunError::NoTipHeld => f.write_str("tip release without a held tip"),
            RunError::NoInstrument(Instrument::Primary) => f.write_str("no primary pipette mounted"),
            RunError::NoInstrument(Instrument::Secondary) => {
                f.write_str("no secondary pipette mounted")
            }
            RunError::TipStillHeld => f.write_str("pipette switch with a tip attached"),
        }
    }
}

impl core::error::Error for RunError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            RunError::Config(e) => Some(e),
            RunError::Pipette(e) => Some(e),
            RunError::Module(e) => Some(e),
            RunError::NoTipHeld | RunError::NoInstrument(_) | RunError::TipStillHeld => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

impl From<PipetteError> for RunError {
    fn from(e: PipetteError) -> Self {
        RunError::Pipette(e)
    }
}

impl From<ModuleError> for RunError {
    fn from(e: ModuleError) -> Self {
        RunError::Module(e)
    }
}
