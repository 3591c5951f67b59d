//! Planning context
//!
//! Everything a step planner needs to resolve wells: the run configuration,
//! the deck, and the target, parking and elution wells for this run.

use heapless::Vec;

use crate::config::{
    ConfigError, DeckLayout, RunConfig, TransferConfig, MAX_SOURCES, MAX_TARGETS,
};
use crate::labware::WellRef;

/// Target wells and their companion positions for one run
#[derive(Debug, Clone)]
pub struct PlanContext<'a> {
    pub config: &'a RunConfig,
    pub deck: &'a DeckLayout,
    wells: Vec<WellRef, MAX_TARGETS>,
    parking: Option<Vec<WellRef, MAX_TARGETS>>,
    elution: Option<Vec<WellRef, MAX_TARGETS>>,
}

impl<'a> PlanContext<'a> {
    /// Context over every sample position of the run
    pub fn new(config: &'a RunConfig, deck: &'a DeckLayout) -> Result<Self, ConfigError> {
        config.validate()?;
        deck.validate(config)?;
        let wells = deck.sample_wells(config);
        Ok(Self::build(config, deck, wells))
    }

    /// Context over an explicit list of target wells
    pub fn with_targets(
        config: &'a RunConfig,
        deck: &'a DeckLayout,
        targets: &[WellRef],
    ) -> Result<Self, ConfigError> {
        deck.validate(config)?;
        let wells = Vec::from_slice(targets).map_err(|_| ConfigError::SampleCountOutOfRange {
            samples: targets.len().min(u8::MAX as usize) as u8,
            max: MAX_TARGETS as u8,
        })?;
        Ok(Self::build(config, deck, wells))
    }

    fn build(config: &'a RunConfig, deck: &'a DeckLayout, wells: Vec<WellRef, MAX_TARGETS>) -> Self {
        let count = wells.len();
        Self {
            config,
            deck,
            parking: deck.parking_spots(config, count).ok(),
            elution: deck.elution_wells(config, count).ok(),
            wells,
        }
    }

    /// Target wells in processing order
    pub fn wells(&self) -> &[WellRef] {
        &self.wells
    }

    /// Transfer limits
    pub fn transfer(&self) -> &TransferConfig {
        &self.config.transfer
    }

    /// Parking spots, one per target
    pub fn parking(&self) -> Result<&[WellRef], ConfigError> {
        let spots = self
            .parking
            .as_deref()
            .ok_or(ConfigError::MissingParkingRack)?;
        self.one_per_target(spots)
    }

    /// Elution wells, one per target
    pub fn elution(&self) -> Result<&[WellRef], ConfigError> {
        let wells = self
            .elution
            .as_deref()
            .ok_or(ConfigError::MissingElutionPlate)?;
        self.one_per_target(wells)
    }

    fn one_per_target<'b>(&self, positions: &'b [WellRef]) -> Result<&'b [WellRef], ConfigError> {
        if positions.len() < self.wells.len() {
            return Err(ConfigError::TooManyTargets {
                targets: self.wells.len().min(u8::MAX as usize) as u8,
                positions: positions.len() as u8,
            });
        }
        Ok(positions)
    }

    /// Parking spot per target when `park` is set
    ///
    /// Each entry is `None` when tips go to the trash instead.
    pub fn parking_for(&self, park: bool) -> Result<Vec<Option<WellRef>, MAX_TARGETS>, ConfigError> {
        if !park {
            return Ok(self.wells.iter().map(|_| None).collect());
        }
        Ok(self.parking()?.iter().copied().map(Some).collect())
    }

    /// Magnet engage height
    pub fn magnet_height(&self) -> f32 {
        self.config.magnet.engage_height_mm()
    }
}

/// Validate a source list against the target count
pub fn check_sources(sources: &[WellRef], targets: usize) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::NoSources);
    }
    if sources.len() > MAX_SOURCES || sources.len() > targets {
        return Err(ConfigError::TooManySources);
    }
    if targets % sources.len() != 0 {
        return Err(ConfigError::UnevenSourcePartition {
            targets: targets as u8,
            sources: sources.len() as u8,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labware::LabwareId;
    use crate::testing::deck;

    #[test]
    fn test_context_over_run() {
        let config = RunConfig {
            samples: 24,
            ..Default::default()
        };
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        assert_eq!(ctx.wells().len(), 3);
        assert_eq!(ctx.parking().unwrap().len(), 3);
        assert_eq!(ctx.elution().unwrap()[2], WellRef::new(LabwareId(7), 0, 2));
    }

    #[test]
    fn test_context_rejects_bad_config() {
        let config = RunConfig {
            samples: 9,
            ..Default::default()
        };
        let layout = deck();
        assert!(matches!(
            PlanContext::new(&config, &layout),
            Err(ConfigError::SampleCountNotMultiple { .. })
        ));
    }

    #[test]
    fn test_parking_for() {
        let config = RunConfig::default();
        let mut layout = deck();
        let targets = [WellRef::first(LabwareId(4)), WellRef::new(LabwareId(4), 0, 1)];

        {
            let ctx = PlanContext::with_targets(&config, &layout, &targets).unwrap();
            let spots = ctx.parking_for(true).unwrap();
            assert_eq!(spots[1], Some(WellRef::new(LabwareId(1), 0, 1)));
            assert!(ctx.parking_for(false).unwrap().iter().all(Option::is_none));
        }

        layout.parking_rack = None;
        let ctx = PlanContext::with_targets(&config, &layout, &targets).unwrap();
        assert_eq!(ctx.parking_for(true), Err(ConfigError::MissingParkingRack));
    }

    #[test]
    fn test_targets_beyond_parking_rack_rejected() {
        // an 8-channel head has 12 parking columns
        let config = RunConfig::default();
        let layout = deck();
        let targets: Vec<WellRef, 16> = (0..16)
            .map(|i| WellRef::new(LabwareId(4), i / 12, i % 12))
            .collect();

        let ctx = PlanContext::with_targets(&config, &layout, &targets).unwrap();
        assert_eq!(ctx.wells().len(), 16);
        let expected = ConfigError::TooManyTargets {
            targets: 16,
            positions: 12,
        };
        assert_eq!(ctx.parking_for(true), Err(expected));
        assert_eq!(ctx.elution(), Err(expected));
        assert_eq!(ctx.parking_for(false).unwrap().len(), 16);
    }

    #[test]
    fn test_check_sources() {
        let a = WellRef::first(LabwareId(5));
        let b = WellRef::new(LabwareId(5), 0, 1);
        assert_eq!(check_sources(&[a], 3), Ok(()));
        assert_eq!(check_sources(&[], 3), Err(ConfigError::NoSources));
        assert_eq!(
            check_sources(&[a, b], 3),
            Err(ConfigError::UnevenSourcePartition {
                targets: 3,
                sources: 2
            })
        );
        assert_eq!(check_sources(&[a, b], 1), Err(ConfigError::TooManySources));
    }
}
