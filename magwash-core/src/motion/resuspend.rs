//! Pellet resuspension pattern
//!
//! Liquid is drawn from the well center near the bottom and dispensed hard
//! against the upper wall on the side away from the magnet, then the lower
//! wall, so the jet washes the pellet off. Which side is "away" depends on
//! the column parity of the well.
//!
//! All points are relative to the well bottom.

use crate::labware::{Location, Point, WellRef};
use crate::traits::{FlowRates, Pipette, PipetteError};

/// Height of the aspirate point above the well bottom (mm)
pub const CENTER_Z_MM: f32 = 0.5;

/// Lateral offset of the dispense quadrants (mm)
pub const QUADRANT_OFFSET_MM: f32 = 3.8;

/// Height of the dispense quadrants above the well bottom (mm)
pub const QUADRANT_Z_MM: f32 = 10.0;

/// Fraction of the reference volume moved per stroke
pub const MIX_FRACTION: f32 = 0.9;

/// Rate multiplier for every stroke
pub const MIX_RATE: f32 = 2.0;

/// Aspirate flow rate during resuspension (µl/s)
pub const MIX_ASPIRATE_FLOW: f32 = 150.0;

/// Dispense flow rate during resuspension (µl/s)
pub const MIX_DISPENSE_FLOW: f32 = 500.0;

/// Strokes per repetition against each wall
const STROKES_PER_WALL: u16 = 2;

/// Primitive moves per repetition (aspirate + dispense per stroke, two walls)
const MOVES_PER_REP: u16 = STROKES_PER_WALL * 2 * 2;

/// One primitive of the mix pattern
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MixMove {
    MoveTo(Location),
    Aspirate { volume: f32, at: Location },
    Dispense { volume: f32, at: Location },
}

/// Resuspension targets for one well
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResuspensionMotion {
    well: WellRef,
}

impl ResuspensionMotion {
    /// Targets for `well`
    pub const fn new(well: WellRef) -> Self {
        Self { well }
    }

    /// Aspirate point
    pub fn center(&self) -> Location {
        self.well.bottom(0.0).moved(Point::new(0.0, 0.0, CENTER_Z_MM))
    }

    /// Upper dispense point
    pub fn top(&self) -> Location {
        self.quadrant(QUADRANT_OFFSET_MM)
    }

    /// Lower dispense point
    pub fn bottom(&self) -> Location {
        self.quadrant(-QUADRANT_OFFSET_MM)
    }

    fn quadrant(&self, y: f32) -> Location {
        let x = if self.well.parity() == 0 {
            -QUADRANT_OFFSET_MM
        } else {
            QUADRANT_OFFSET_MM
        };
        self.well.bottom(0.0).moved(Point::new(x, y, QUADRANT_Z_MM))
    }

    /// Stroke volume for a reference volume
    pub fn mix_volume(reference_ul: f32) -> f32 {
        MIX_FRACTION * reference_ul
    }

    /// Flow rates used for the pattern, keeping the blow-out rate
    pub fn flow_rates(base: FlowRates) -> FlowRates {
        base.with_aspirate(MIX_ASPIRATE_FLOW)
            .with_dispense(MIX_DISPENSE_FLOW)
    }

    /// The full move sequence for `reps` repetitions
    pub fn moves(&self, reference_ul: f32, reps: u8) -> MixMoves {
        MixMoves {
            motion: *self,
            volume: Self::mix_volume(reference_ul),
            total: 1 + reps as u16 * MOVES_PER_REP,
            index: 0,
        }
    }

    /// Run the pattern on `pipette`
    ///
    /// Flow rates are switched for the duration of the pattern and put back
    /// afterwards, also when a move fails.
    pub fn execute<P: Pipette + ?Sized>(
        &self,
        pipette: &mut P,
        reference_ul: f32,
        reps: u8,
    ) -> Result<(), PipetteError> {
        let previous = pipette.flow_rates();
        pipette.set_flow_rates(Self::flow_rates(previous));

        let result = self.moves(reference_ul, reps).try_for_each(|mv| match mv {
            MixMove::MoveTo(at) => pipette.move_to(at),
            MixMove::Aspirate { volume, at } => pipette.aspirate(volume, at, MIX_RATE),
            MixMove::Dispense { volume, at } => pipette.dispense(volume, at, MIX_RATE),
        });

        pipette.set_flow_rates(previous);
        result
    }
}

/// Iterator over the moves of a resuspension
#[derive(Debug, Clone)]
pub struct MixMoves {
    motion: ResuspensionMotion,
    volume: f32,
    total: u16,
    index: u16,
}

impl Iterator for MixMoves {
    type Item = MixMove;

    fn next(&mut self) -> Option<MixMove> {
        if self.index >= self.total {
            return None;
        }
        let index = self.index;
        self.index += 1;

        if index == 0 {
            return Some(MixMove::MoveTo(self.motion.center()));
        }

        let within = (index - 1) % MOVES_PER_REP;
        let stroke = within / 2;
        let volume = self.volume;
        if within % 2 == 0 {
            return Some(MixMove::Aspirate {
                volume,
                at: self.motion.center(),
            });
        }

        let at = if stroke < STROKES_PER_WALL {
            self.motion.top()
        } else {
            self.motion.bottom()
        };
        Some(MixMove::Dispense { volume, at })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.index) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for MixMoves {}
