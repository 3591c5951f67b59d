//! Liquid waste accounting
//!
//! Volume is tracked once per transfer into waste, before the transfer
//! happens. A transfer that would reach capacity is held back until the
//! operator empties the reservoir; it then counts against the fresh total.

use crate::config::{is_positive, ConfigError};

/// Outcome of tracking a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tracked {
    /// Volume added to the running total
    Recorded,
    /// Reservoir must be emptied first
    Full,
}

/// Liquid waste accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WasteTracker {
    accumulated_ul: f32,
    capacity_ul: f32,
    pending_ul: Option<f32>,
}

impl WasteTracker {
    /// Create an empty tracker
    pub fn new(capacity_ul: f32) -> Result<Self, ConfigError> {
        if !is_positive(capacity_ul) {
            return Err(ConfigError::InvalidVolume);
        }
        Ok(Self {
            accumulated_ul: 0.0,
            capacity_ul,
            pending_ul: None,
        })
    }

    /// Account for `volume_ul` about to go to waste
    pub fn track(&mut self, volume_ul: f32) -> Tracked {
        if self.accumulated_ul + volume_ul >= self.capacity_ul {
            self.pending_ul = Some(volume_ul);
            Tracked::Full
        } else {
            self.accumulated_ul += volume_ul;
            Tracked::Recorded
        }
    }

    /// Operator emptied the reservoir
    ///
    /// Resets the total, then applies the transfer that triggered the prompt.
    pub fn acknowledge_empty(&mut self) {
        self.accumulated_ul = 0.0;
        if let Some(volume) = self.pending_ul.take() {
            self.accumulated_ul += volume;
        }
    }

    /// Volume accumulated since the last empty (µl)
    pub fn accumulated(&self) -> f32 {
        self.accumulated_ul
    }

    /// Volume that triggers an empty prompt (µl)
    pub fn capacity(&self) -> f32 {
        self.capacity_ul
    }

    /// Check if a transfer is waiting on an empty reservoir
    pub fn is_waiting(&self) -> bool {
        self.pending_ul.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_bad_capacity() {
        assert_eq!(WasteTracker::new(0.0), Err(ConfigError::InvalidVolume));
        assert_eq!(WasteTracker::new(-5.0), Err(ConfigError::InvalidVolume));
    }

    #[test]
    fn test_threshold_then_reset() {
        let mut waste = WasteTracker::new(100.0).unwrap();
        assert_eq!(waste.track(60.0), Tracked::Recorded);
        assert_eq!(waste.accumulated(), 60.0);

        assert_eq!(waste.track(50.0), Tracked::Full);
        assert_eq!(waste.accumulated(), 60.0);
        assert!(waste.is_waiting());

        waste.acknowledge_empty();
        assert_eq!(waste.accumulated(), 50.0);
        assert!(!waste.is_waiting());
    }

    #[test]
    fn test_reaching_capacity_exactly_triggers() {
        let mut waste = WasteTracker::new(100.0).unwrap();
        assert_eq!(waste.track(40.0), Tracked::Recorded);
        assert_eq!(waste.track(60.0), Tracked::Full);
    }

    #[test]
    fn test_acknowledge_without_pending() {
        let mut waste = WasteTracker::new(100.0).unwrap();
        waste.track(30.0);
        waste.acknowledge_empty();
        assert_eq!(waste.accumulated(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_total_stays_below_capacity(volumes in prop::collection::vec(1.0f32..90.0, 0..60)) {
            let mut waste = WasteTracker::new(100.0).unwrap();
            for volume in volumes {
                if waste.track(volume) == Tracked::Full {
                    waste.acknowledge_empty();
                    prop_assert_eq!(waste.accumulated(), volume);
                }
                prop_assert!(waste.accumulated() < 100.0);
                prop_assert!(waste.accumulated() >= 0.0);
            }
        }
    }
}
