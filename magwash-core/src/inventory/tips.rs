//! Tip inventory
//!
//! Slots are not stored; slot `n` is computed from the rack list and the
//! head's channel width. A multi-channel head consumes row A of each rack
//! (12 pick-ups per rack), a single-channel head consumes every well
//! column-major (96 per rack).

use heapless::Vec;

use super::trash::TrashBin;
use crate::config::{ConfigError, DeckLayout, PipetteConfig, RunConfig, MAX_TIP_RACKS};
use crate::labware::{LabwareId, WellRef, PLATE_COLUMNS, PLATE_ROWS};
use crate::state::Prompt;
use crate::traits::{Pipette, PipetteError};

/// A tip currently on the pipette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TipHandle {
    /// Where the tip was picked up
    pub origin: WellRef,
    /// Whether the pick-up consumed a slot from the inventory
    pub counted: bool,
}

/// Outcome of an acquire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// Tip is on the pipette
    Tip(TipHandle),
    /// Racks exhausted; nothing moved
    Suspended(Prompt),
}

/// Outcome of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Released {
    /// Tip dropped
    Dropped,
    /// Tip dropped in the trash and the trash is now full
    Suspended(Prompt),
}

/// Tip consumption state for one pipette
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TipInventory {
    channels: u8,
    max_volume_ul: u16,
    racks: Vec<LabwareId, MAX_TIP_RACKS>,
    count: u16,
    trash: TrashBin,
}

impl TipInventory {
    /// Create an inventory over `racks`, consumed in order
    pub fn new(
        channels: u8,
        max_volume_ul: u16,
        racks: &[LabwareId],
        trash: TrashBin,
    ) -> Result<Self, ConfigError> {
        if channels != 1 && channels != 8 {
            return Err(ConfigError::UnsupportedChannels(channels));
        }
        if racks.is_empty() {
            return Err(ConfigError::NoTipRacks);
        }
        let racks = Vec::from_slice(racks).map_err(|_| ConfigError::TooManyTipRacks)?;

        Ok(Self {
            channels,
            max_volume_ul,
            racks,
            count: 0,
            trash,
        })
    }

    /// Create the inventory for a configured run
    pub fn from_config(config: &RunConfig, deck: &DeckLayout) -> Result<Self, ConfigError> {
        Self::for_pipette(&config.pipette, &deck.tip_racks, TrashBin::new(deck.trash, &config.trash))
    }

    /// Create the inventory of one pipette over its racks
    pub fn for_pipette(
        pipette: &PipetteConfig,
        racks: &[LabwareId],
        trash: TrashBin,
    ) -> Result<Self, ConfigError> {
        Self::new(
            pipette.kind.channels(),
            pipette.max_volume_ul as u16,
            racks,
            trash,
        )
    }

    /// Pick-ups available per rack
    pub fn per_rack(&self) -> u16 {
        if self.channels == 1 {
            (PLATE_ROWS * PLATE_COLUMNS) as u16
        } else {
            PLATE_COLUMNS as u16
        }
    }

    /// Total pick-ups across all racks
    pub fn max(&self) -> u16 {
        self.per_rack() * self.racks.len() as u16
    }

    /// Pick-ups consumed since the racks were last replaced
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Pick-ups left before a replacement prompt
    pub fn remaining(&self) -> u16 {
        self.max() - self.count
    }

    /// Channel width of the head
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Trash bin state
    pub fn trash(&self) -> &TrashBin {
        &self.trash
    }

    /// Well for slot `index`, if it exists
    pub fn slot(&self, index: u16) -> Option<WellRef> {
        let per_rack = self.per_rack();
        let rack = *self.racks.get((index / per_rack) as usize)?;
        let within = (index % per_rack) as u8;
        Some(if self.channels == 1 {
            WellRef::column_major(rack, within)
        } else {
            WellRef::new(rack, 0, within)
        })
    }

    /// Pick up a tip
    ///
    /// With `explicit` the tip comes from that position and the count is
    /// untouched. Otherwise the next counted slot is used; when none is left
    /// this returns a replacement prompt without moving.
    pub fn acquire<P: Pipette + ?Sized>(
        &mut self,
        pipette: &mut P,
        explicit: Option<WellRef>,
    ) -> Result<Acquired, PipetteError> {
        if let Some(origin) = explicit {
            pipette.pick_up_tip(origin.top(0.0))?;
            return Ok(Acquired::Tip(TipHandle {
                origin,
                counted: false,
            }));
        }

        let Some(origin) = self.slot(self.count) else {
            return Ok(Acquired::Suspended(Prompt::ReplaceTips {
                max_volume_ul: self.max_volume_ul,
            }));
        };

        pipette.pick_up_tip(origin.top(0.0))?;
        self.count += 1;
        Ok(Acquired::Tip(TipHandle {
            origin,
            counted: true,
        }))
    }

    /// Drop the held tip
    ///
    /// With `destination` the tip is parked there and nothing is counted.
    /// Otherwise it goes to the trash at the rotating offset; a full trash
    /// returns an empty-trash prompt after the drop.
    pub fn release<P: Pipette + ?Sized>(
        &mut self,
        pipette: &mut P,
        _tip: TipHandle,
        destination: Option<WellRef>,
    ) -> Result<Released, PipetteError> {
        if let Some(spot) = destination {
            pipette.drop_tip(spot.top(0.0))?;
            return Ok(Released::Dropped);
        }

        pipette.drop_tip(self.trash.next_drop())?;
        if self.trash.record_drop(self.channels) {
            Ok(Released::Suspended(Prompt::EmptyTrash))
        } else {
            Ok(Released::Dropped)
        }
    }

    /// Operator replaced every tip rack
    pub fn acknowledge_replacement(&mut self) {
        self.count = 0;
    }

    /// Operator emptied the trash
    pub fn acknowledge_trash_emptied(&mut self) {
        self.trash.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrashConfig;
    use crate::testing::MockPipette;
    use proptest::prelude::*;

    fn inventory(channels: u8, racks: &[LabwareId]) -> TipInventory {
        TipInventory::new(
            channels,
            300,
            racks,
            TrashBin::new(WellRef::first(LabwareId(12)), &TrashConfig::default()),
        )
        .unwrap()
    }

    fn tip(outcome: Acquired) -> TipHandle {
        match outcome {
            Acquired::Tip(tip) => tip,
            Acquired::Suspended(prompt) => panic!("unexpected prompt {:?}", prompt),
        }
    }

    #[test]
    fn test_rejects_bad_setup() {
        let trash = TrashBin::new(WellRef::first(LabwareId(12)), &TrashConfig::default());
        assert_eq!(
            TipInventory::new(4, 300, &[LabwareId(1)], trash.clone()),
            Err(ConfigError::UnsupportedChannels(4))
        );
        assert_eq!(
            TipInventory::new(8, 300, &[], trash.clone()),
            Err(ConfigError::NoTipRacks)
        );
        let many = [LabwareId(1); MAX_TIP_RACKS + 1];
        assert_eq!(
            TipInventory::new(8, 300, &many, trash),
            Err(ConfigError::TooManyTipRacks)
        );
    }

    #[test]
    fn test_slot_order() {
        let multi = inventory(8, &[LabwareId(2), LabwareId(3)]);
        assert_eq!(multi.max(), 24);
        assert_eq!(multi.slot(0), Some(WellRef::new(LabwareId(2), 0, 0)));
        assert_eq!(multi.slot(11), Some(WellRef::new(LabwareId(2), 0, 11)));
        assert_eq!(multi.slot(12), Some(WellRef::new(LabwareId(3), 0, 0)));
        assert_eq!(multi.slot(24), None);

        let single = inventory(1, &[LabwareId(2)]);
        assert_eq!(single.max(), 96);
        assert_eq!(single.slot(9), Some(WellRef::new(LabwareId(2), 1, 1)));
    }

    #[test]
    fn test_rack_size_follows_plate_geometry() {
        use crate::labware::{PLATE_COLUMNS, PLATE_ROWS};

        assert_eq!(inventory(8, &[LabwareId(2)]).per_rack(), PLATE_COLUMNS as u16);
        assert_eq!(
            inventory(1, &[LabwareId(2)]).per_rack(),
            (PLATE_ROWS * PLATE_COLUMNS) as u16
        );
    }

    #[test]
    fn test_acquire_counts_then_suspends() {
        let mut tips = inventory(8, &[LabwareId(2)]);
        let mut pipette = MockPipette::new(8);

        for expected in 1..=12 {
            let handle = tip(tips.acquire(&mut pipette, None).unwrap());
            assert!(handle.counted);
            assert_eq!(tips.count(), expected);
            tips.release(&mut pipette, handle, None).unwrap();
        }

        let outcome = tips.acquire(&mut pipette, None).unwrap();
        assert_eq!(
            outcome,
            Acquired::Suspended(Prompt::ReplaceTips { max_volume_ul: 300 })
        );
        assert_eq!(tips.count(), 12);
        assert!(!pipette.has_tip());

        tips.acknowledge_replacement();
        let handle = tip(tips.acquire(&mut pipette, None).unwrap());
        assert_eq!(handle.origin, WellRef::first(LabwareId(2)));
        assert_eq!(tips.count(), 1);
    }

    #[test]
    fn test_explicit_pickup_leaves_count() {
        let mut tips = inventory(8, &[LabwareId(2)]);
        let mut pipette = MockPipette::new(8);
        let spot = WellRef::new(LabwareId(1), 0, 3);

        let handle = tip(tips.acquire(&mut pipette, Some(spot)).unwrap());
        assert_eq!(handle.origin, spot);
        assert!(!handle.counted);
        assert_eq!(tips.count(), 0);
    }

    #[test]
    fn test_parking_release_leaves_counts() {
        let mut tips = inventory(8, &[LabwareId(2)]);
        let mut pipette = MockPipette::new(8);
        let spot = WellRef::new(LabwareId(1), 0, 0);

        let handle = tip(tips.acquire(&mut pipette, None).unwrap());
        let released = tips.release(&mut pipette, handle, Some(spot)).unwrap();
        assert_eq!(released, Released::Dropped);
        assert_eq!(tips.count(), 1);
        assert_eq!(tips.trash().dropped(), 0);
        assert_eq!(pipette.last_drop, Some(spot.top(0.0)));
    }

    #[test]
    fn test_trash_full_after_drop() {
        let trash = TrashBin::new(
            WellRef::first(LabwareId(12)),
            &TrashConfig {
                drop_threshold: 16,
                ..Default::default()
            },
        );
        let mut tips = TipInventory::new(8, 300, &[LabwareId(2)], trash).unwrap();
        let mut pipette = MockPipette::new(8);

        let first = tip(tips.acquire(&mut pipette, None).unwrap());
        assert_eq!(
            tips.release(&mut pipette, first, None).unwrap(),
            Released::Dropped
        );

        let second = tip(tips.acquire(&mut pipette, None).unwrap());
        assert_eq!(
            tips.release(&mut pipette, second, None).unwrap(),
            Released::Suspended(Prompt::EmptyTrash)
        );
        // the tip went into the bin before the prompt
        assert!(!pipette.has_tip());

        tips.acknowledge_trash_emptied();
        assert_eq!(tips.trash().dropped(), 0);
    }

    #[test]
    fn test_pickup_fault_leaves_count() {
        let mut tips = inventory(8, &[LabwareId(2)]);
        let mut pipette = MockPipette::new(8);
        pipette.fail_next = Some(PipetteError::Fault);

        assert_eq!(tips.acquire(&mut pipette, None), Err(PipetteError::Fault));
        assert_eq!(tips.count(), 0);
    }

    proptest! {
        #[test]
        fn prop_count_stays_within_max(racks in 1usize..=3, picks in 0usize..80) {
            let rack_ids = [LabwareId(2), LabwareId(3), LabwareId(6)];
            let mut tips = inventory(8, &rack_ids[..racks]);
            let mut pipette = MockPipette::new(8);

            for _ in 0..picks {
                match tips.acquire(&mut pipette, None).unwrap() {
                    Acquired::Tip(handle) => {
                        tips.release(&mut pipette, handle, None).unwrap();
                    }
                    Acquired::Suspended(_) => {
                        prop_assert_eq!(tips.count(), tips.max());
                        tips.acknowledge_replacement();
                    }
                }
                prop_assert!(tips.count() <= tips.max());
            }
        }
    }
}
