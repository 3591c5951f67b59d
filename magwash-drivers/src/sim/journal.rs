//! Call journal

use alloc::vec::Vec;
use core::time::Duration;

use magwash_core::labware::Location;
use magwash_core::state::Message;
use magwash_core::traits::FlowRates;

/// One recorded driver call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Entry {
    PickUp(Location),
    Drop(Location),
    Aspirate { volume: f32, at: Location, rate: f32 },
    Dispense { volume: f32, at: Location, rate: f32 },
    BlowOut(Location),
    AirGap(f32),
    MoveTo(Location),
    Mix { reps: u8, volume: f32, at: Location },
    TouchTip,
    Home,
    FlowRates(FlowRates),
    Engage(f32),
    Disengage,
    Block { celsius: f32, hold: Option<Duration> },
    Lid(f32),
    LidOff,
    OpenLid,
    CloseLid,
    Pause(Message),
    Delay(Duration),
    Light(bool),
    Comment(Message),
}

impl Entry {
    /// Check if this call moved liquid or tips
    pub fn is_liquid_handling(&self) -> bool {
        matches!(
            self,
            Entry::PickUp(_)
                | Entry::Drop(_)
                | Entry::Aspirate { .. }
                | Entry::Dispense { .. }
                | Entry::BlowOut(_)
                | Entry::AirGap(_)
                | Entry::Mix { .. }
        )
    }
}

/// Ordered record of driver calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    entries: Vec<Entry>,
}

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// All entries in call order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries matching `pred`
    pub fn count(&self, pred: impl Fn(&Entry) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(e)).count()
    }

    /// Index of the first entry matching `pred`
    pub fn position(&self, pred: impl Fn(&Entry) -> bool) -> Option<usize> {
        self.entries.iter().position(pred)
    }

    /// Total volume aspirated (µl), air gaps excluded
    pub fn aspirated(&self) -> f32 {
        self.entries
            .iter()
            .map(|e| match e {
                Entry::Aspirate { volume, .. } => *volume,
                _ => 0.0,
            })
            .sum()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
