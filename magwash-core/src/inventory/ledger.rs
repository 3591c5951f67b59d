//! Per-run resource ledger

use super::tips::TipInventory;
use super::trash::TrashBin;
use super::waste::WasteTracker;
use crate::config::{ConfigError, DeckLayout, RunConfig};
use crate::state::Prompt;
use crate::traits::Instrument;

/// Consumable state for one run
///
/// Created at run start and passed by `&mut` to every operation that picks
/// up tips or sends liquid to waste. Each mounted pipette has its own tip
/// inventory; both drop into the same physical trash.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ledger {
    pub tips: TipInventory,
    pub secondary_tips: Option<TipInventory>,
    pub waste: WasteTracker,
}

impl Ledger {
    /// Create a fresh ledger for a single pipette
    pub fn new(tips: TipInventory, waste: WasteTracker) -> Self {
        Self {
            tips,
            secondary_tips: None,
            waste,
        }
    }

    /// Add the secondary pipette's inventory
    pub fn with_secondary(mut self, tips: TipInventory) -> Self {
        self.secondary_tips = Some(tips);
        self
    }

    /// Create the ledger for a configured run
    pub fn from_config(config: &RunConfig, deck: &DeckLayout) -> Result<Self, ConfigError> {
        let ledger = Self::new(
            TipInventory::from_config(config, deck)?,
            WasteTracker::new(config.waste.capacity_ul)?,
        );
        match &config.secondary {
            Some(pipette) => Ok(ledger.with_secondary(TipInventory::for_pipette(
                pipette,
                &deck.secondary_tip_racks,
                TrashBin::new(deck.trash, &config.trash),
            )?)),
            None => Ok(ledger),
        }
    }

    /// Tip inventory of `instrument`, if that pipette is mounted
    pub fn tips_for(&mut self, instrument: Instrument) -> Option<&mut TipInventory> {
        match instrument {
            Instrument::Primary => Some(&mut self.tips),
            Instrument::Secondary => self.secondary_tips.as_mut(),
        }
    }

    /// Tips in the trash from every pipette
    pub fn tips_in_trash(&self) -> u16 {
        let secondary = self
            .secondary_tips
            .as_ref()
            .map_or(0, |tips| tips.trash().dropped());
        self.tips.trash().dropped().saturating_add(secondary)
    }

    /// Apply the operator's acknowledgement of `prompt`
    pub fn acknowledge(&mut self, prompt: &Prompt) {
        self.acknowledge_for(Instrument::Primary, prompt);
    }

    /// Apply an acknowledgement raised while `instrument` was in use
    ///
    /// Tip replacement only refills that pipette's racks. Emptying the trash
    /// clears the drops of every pipette.
    pub fn acknowledge_for(&mut self, instrument: Instrument, prompt: &Prompt) {
        match prompt {
            Prompt::ReplaceTips { .. } => {
                if let Some(tips) = self.tips_for(instrument) {
                    tips.acknowledge_replacement();
                }
            }
            Prompt::EmptyTrash => {
                self.tips.acknowledge_trash_emptied();
                if let Some(tips) = self.secondary_tips.as_mut() {
                    tips.acknowledge_trash_emptied();
                }
            }
            Prompt::EmptyLiquidWaste => self.waste.acknowledge_empty(),
            Prompt::Operator(_) => {}
        }
    }
}
