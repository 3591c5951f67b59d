//! Tip trash drop policy
//!
//! Drops alternate between two lateral offsets from the trash top so tips
//! do not pile up in one spot. Each drop adds the head's channel count to a
//! running total; once the total reaches the threshold the bin is full.

use crate::config::TrashConfig;
use crate::labware::{Location, Point, WellRef};

/// Rotating tip trash
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrashBin {
    well: WellRef,
    offsets_mm: [f32; 2],
    side: usize,
    dropped: u16,
    threshold: u16,
}

impl TrashBin {
    /// Create a trash bin at `well`
    pub fn new(well: WellRef, config: &TrashConfig) -> Self {
        Self {
            well,
            offsets_mm: config.offsets_mm,
            side: 0,
            dropped: 0,
            threshold: config.drop_threshold,
        }
    }

    /// Where the next tip will be dropped
    pub fn next_drop(&self) -> Location {
        self.well.top(0.0).moved(Point::x(self.offsets_mm[self.side]))
    }

    /// Record a drop of `channels` tips
    ///
    /// Returns true when the bin has reached its threshold.
    pub fn record_drop(&mut self, channels: u8) -> bool {
        self.side ^= 1;
        self.dropped = self.dropped.saturating_add(channels as u16);
        self.is_full()
    }

    /// Check if the drop total has reached the threshold
    pub fn is_full(&self) -> bool {
        self.dropped >= self.threshold
    }

    /// Operator emptied the bin
    pub fn reset(&mut self) {
        self.dropped = 0;
    }

    /// Tips dropped since the bin was last emptied
    pub fn dropped(&self) -> u16 {
        self.dropped
    }

    /// Drop total that triggers an empty-trash prompt
    pub fn threshold(&self) -> u16 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labware::LabwareId;

    fn bin() -> TrashBin {
        TrashBin::new(WellRef::first(LabwareId(12)), &TrashConfig::default())
    }

    #[test]
    fn test_offsets_alternate() {
        let mut trash = bin();
        assert_eq!(trash.next_drop().offset.x, 30.0);
        trash.record_drop(8);
        assert_eq!(trash.next_drop().offset.x, -18.0);
        trash.record_drop(8);
        assert_eq!(trash.next_drop().offset.x, 30.0);
    }

    #[test]
    fn test_threshold_with_multichannel() {
        let mut trash = bin();
        // 24 drops of 8 tips = 192, one short of 193
        for _ in 0..24 {
            assert!(!trash.record_drop(8));
        }
        assert_eq!(trash.dropped(), 192);
        assert!(trash.record_drop(8));
        assert_eq!(trash.dropped(), 200);

        trash.reset();
        assert_eq!(trash.dropped(), 0);
        assert!(!trash.is_full());
    }

    #[test]
    fn test_threshold_with_single_channel() {
        let mut trash = TrashBin::new(
            WellRef::first(LabwareId(12)),
            &TrashConfig {
                drop_threshold: 3,
                ..Default::default()
            },
        );
        assert!(!trash.record_drop(1));
        assert!(!trash.record_drop(1));
        assert!(trash.record_drop(1));
    }
}
