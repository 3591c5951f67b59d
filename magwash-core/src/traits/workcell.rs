//! Workcell aggregate
//!
//! A workcell bundles the drivers of one robot. Planners and executors take
//! a workcell instead of four separate driver handles.

use super::module::{MagneticModule, Thermocycler};
use super::operator::Operator;
use super::pipette::Pipette;

/// Which of the mounted pipettes an operation uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instrument {
    /// The pipette running the protocol
    #[default]
    Primary,
    /// Optional low-volume pipette
    Secondary,
}

/// One robot: pipette, magnet, thermocycler and operator channel
///
/// Implementations may return the same object from several accessors.
pub trait Workcell {
    type Pipette: Pipette;
    type Magnet: MagneticModule;
    type Thermocycler: Thermocycler;
    type Operator: Operator;

    /// The pipette used by the protocol
    fn pipette(&mut self) -> &mut Self::Pipette;

    /// The low-volume pipette, if one is mounted
    fn secondary_pipette(&mut self) -> Option<&mut Self::Pipette> {
        None
    }

    /// Pipette for `instrument`
    fn instrument(&mut self, instrument: Instrument) -> Option<&mut Self::Pipette> {
        match instrument {
            Instrument::Primary => Some(self.pipette()),
            Instrument::Secondary => self.secondary_pipette(),
        }
    }

    /// The magnetic module holding the sample plate
    fn magnet(&mut self) -> &mut Self::Magnet;

    /// The thermocycler
    fn thermocycler(&mut self) -> &mut Self::Thermocycler;

    /// The operator channel
    fn operator(&mut self) -> &mut Self::Operator;
}
