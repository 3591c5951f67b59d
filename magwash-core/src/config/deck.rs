//! Symbolic deck layout
//!
//! Slot assignments for the labware a run touches. Geometry stays with the
//! driver; the layout only names wells.

use heapless::Vec;

use super::error::ConfigError;
use super::types::{is_positive, RunConfig, MAX_TARGETS, MAX_TIP_RACKS};
use crate::labware::{LabwareId, WellRef, PLATE_COLUMNS, PLATE_ROWS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Well positions on a plate for `count` pipette positions
///
/// Multi-channel heads address row A of each column; single-channel heads
/// walk the plate column-major.
pub fn plate_positions(labware: LabwareId, channels: u8, count: usize) -> Vec<WellRef, MAX_TARGETS> {
    let per_plate = if channels == 1 {
        (PLATE_ROWS * PLATE_COLUMNS) as usize
    } else {
        PLATE_COLUMNS as usize
    };

    (0..count.min(per_plate))
        .map(|i| {
            if channels == 1 {
                WellRef::column_major(labware, i as u8)
            } else {
                WellRef::new(labware, 0, i as u8)
            }
        })
        .collect()
}

/// Labware placement for one run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeckLayout {
    /// Deepwell plate on the magnetic module
    pub sample_plate: LabwareId,
    /// Clean plate receiving eluate
    pub elution_plate: Option<LabwareId>,
    /// Reagent reservoir
    pub reservoir: LabwareId,
    /// Usable volume of one reservoir channel (µl)
    pub reservoir_well_capacity_ul: f32,
    /// Liquid waste well
    pub liquid_waste: WellRef,
    /// Tip trash well
    pub trash: WellRef,
    /// Tip racks in consumption order
    pub tip_racks: Vec<LabwareId, MAX_TIP_RACKS>,
    /// Tip racks of the secondary pipette
    #[cfg_attr(feature = "serde", serde(default))]
    pub secondary_tip_racks: Vec<LabwareId, MAX_TIP_RACKS>,
    /// Rack holding parked tips between steps
    pub parking_rack: Option<LabwareId>,
}

impl DeckLayout {
    /// Reservoir channel `column`
    pub const fn reservoir_well(&self, column: u8) -> WellRef {
        WellRef::new(self.reservoir, 0, column)
    }

    /// Sample wells addressed by the pipette, one per position
    pub fn sample_wells(&self, config: &RunConfig) -> Vec<WellRef, MAX_TARGETS> {
        plate_positions(
            self.sample_plate,
            config.channels(),
            config.positions() as usize,
        )
    }

    /// Parking spots for the first `count` positions
    pub fn parking_spots(
        &self,
        config: &RunConfig,
        count: usize,
    ) -> Result<Vec<WellRef, MAX_TARGETS>, ConfigError> {
        let rack = self.parking_rack.ok_or(ConfigError::MissingParkingRack)?;
        Ok(plate_positions(rack, config.channels(), count))
    }

    /// Elution wells for the first `count` positions
    pub fn elution_wells(
        &self,
        config: &RunConfig,
        count: usize,
    ) -> Result<Vec<WellRef, MAX_TARGETS>, ConfigError> {
        let plate = self.elution_plate.ok_or(ConfigError::MissingElutionPlate)?;
        Ok(plate_positions(plate, config.channels(), count))
    }

    /// Validate the layout against a run configuration
    pub fn validate(&self, config: &RunConfig) -> Result<(), ConfigError> {
        if self.tip_racks.is_empty() {
            return Err(ConfigError::NoTipRacks);
        }
        if config.secondary.is_some() && self.secondary_tip_racks.is_empty() {
            return Err(ConfigError::NoTipRacks);
        }
        if !is_positive(self.reservoir_well_capacity_ul) {
            return Err(ConfigError::InvalidVolume);
        }
        if config.park_tips && self.parking_rack.is_none() {
            return Err(ConfigError::MissingParkingRack);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{PipetteConfig, PipetteKind};

    fn deck() -> DeckLayout {
        DeckLayout {
            sample_plate: LabwareId(4),
            elution_plate: Some(LabwareId(7)),
            reservoir: LabwareId(5),
            reservoir_well_capacity_ul: 15_000.0,
            liquid_waste: WellRef::first(LabwareId(9)),
            trash: WellRef::first(LabwareId(12)),
            tip_racks: Vec::from_slice(&[LabwareId(2), LabwareId(3)]).unwrap(),
            secondary_tip_racks: Vec::new(),
            parking_rack: Some(LabwareId(1)),
        }
    }

    #[test]
    fn test_multichannel_sample_wells_use_row_a() {
        let config = RunConfig {
            samples: 24,
            ..Default::default()
        };
        let wells = deck().sample_wells(&config);
        assert_eq!(wells.len(), 3);
        assert!(wells.iter().all(|w| w.row == 0));
        assert_eq!(wells[2].column, 2);
    }

    #[test]
    fn test_single_channel_sample_wells_column_major() {
        let config = RunConfig {
            samples: 10,
            pipette: PipetteConfig {
                kind: PipetteKind::SingleChannel,
                ..Default::default()
            },
            ..Default::default()
        };
        let wells = deck().sample_wells(&config);
        assert_eq!(wells.len(), 10);
        assert_eq!(wells[8], WellRef::new(LabwareId(4), 0, 1));
    }

    #[test]
    fn test_parking_requires_rack() {
        let config = RunConfig {
            park_tips: true,
            ..Default::default()
        };
        let mut layout = deck();
        assert_eq!(layout.validate(&config), Ok(()));
        assert_eq!(layout.parking_spots(&config, 2).unwrap().len(), 2);

        layout.parking_rack = None;
        assert_eq!(
            layout.validate(&config),
            Err(ConfigError::MissingParkingRack)
        );
        assert_eq!(
            layout.parking_spots(&config, 2),
            Err(ConfigError::MissingParkingRack)
        );
    }

    #[test]
    fn test_empty_tip_racks_rejected() {
        let mut layout = deck();
        layout.tip_racks.clear();
        assert_eq!(
            layout.validate(&RunConfig::default()),
            Err(ConfigError::NoTipRacks)
        );
    }

    #[test]
    fn test_secondary_pipette_needs_racks() {
        let config = RunConfig {
            secondary: Some(PipetteConfig {
                max_volume_ul: 20.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut layout = deck();
        assert_eq!(layout.validate(&config), Err(ConfigError::NoTipRacks));

        layout.secondary_tip_racks.push(LabwareId(6)).unwrap();
        assert_eq!(layout.validate(&config), Ok(()));
    }

    #[test]
    fn test_elution_wells() {
        let config = RunConfig::default();
        let wells = deck().elution_wells(&config, 1).unwrap();
        assert_eq!(wells[0], WellRef::first(LabwareId(7)));

        let mut layout = deck();
        layout.elution_plate = None;
        assert_eq!(
            layout.elution_wells(&config, 1),
            Err(ConfigError::MissingElutionPlate)
        );
    }
}
