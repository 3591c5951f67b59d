//! Configuration type definitions
//!
//! These types describe one protocol run: pipette, magnet, transfer limits
//! and the thresholds for tip trash and liquid waste.

use core::time::Duration;

use super::error::ConfigError;
use crate::traits::FlowRates;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum samples per run (one full plate)
pub const MAX_SAMPLES: u8 = 96;

/// Maximum target wells per step
pub const MAX_TARGETS: usize = 96;

/// Maximum tip racks per pipette
pub const MAX_TIP_RACKS: usize = 8;

/// Maximum liquid sources per step
pub const MAX_SOURCES: usize = 12;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 32;

/// Maximum operator message length
pub const MAX_MESSAGE_LEN: usize = 96;

/// Default per-aspirate volume cap (µl)
pub const DEFAULT_MAX_ASPIRATE_UL: f32 = 200.0;

/// Default air gap (µl)
pub const DEFAULT_AIR_GAP_UL: f32 = 20.0;

/// Default number of tips the trash holds before prompting
pub const DEFAULT_DROP_THRESHOLD: u16 = 193;

/// Default liquid waste capacity (µl)
pub const DEFAULT_WASTE_CAPACITY_UL: f32 = 185_000.0;

/// Check that a volume is usable as a divisor or threshold
pub(crate) fn is_positive(volume: f32) -> bool {
    volume.is_finite() && volume > 0.0
}

/// Pipette head type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PipetteKind {
    /// One channel
    SingleChannel,
    /// Eight channels, one plate column at a time
    #[default]
    MultiChannel,
}

impl PipetteKind {
    /// Channel width of the head
    pub const fn channels(&self) -> u8 {
        match self {
            PipetteKind::SingleChannel => 1,
            PipetteKind::MultiChannel => 8,
        }
    }
}

/// Pipette configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipetteConfig {
    /// Head type
    pub kind: PipetteKind,
    /// Tip capacity (µl)
    pub max_volume_ul: f32,
    /// Baseline flow rates
    pub flow: FlowRates,
}

impl Default for PipetteConfig {
    fn default() -> Self {
        Self {
            kind: PipetteKind::MultiChannel,
            max_volume_ul: 300.0,
            flow: FlowRates::default(),
        }
    }
}

/// Magnetic module generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MagnetGeneration {
    /// First generation magdeck
    MagDeck,
    /// Second generation magnetic module
    #[default]
    Gen2,
}

impl MagnetGeneration {
    /// Engage height for a deepwell plate on this module (mm)
    pub const fn engage_height_mm(&self) -> f32 {
        match self {
            MagnetGeneration::MagDeck => 13.6,
            MagnetGeneration::Gen2 => 6.5,
        }
    }
}

/// Magnetic module configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MagnetConfig {
    /// Module generation
    pub generation: MagnetGeneration,
    /// Explicit engage height, overriding the generation default
    pub height_mm: Option<f32>,
}

impl MagnetConfig {
    /// Height to engage at (mm)
    pub fn engage_height_mm(&self) -> f32 {
        self.height_mm
            .unwrap_or_else(|| self.generation.engage_height_mm())
    }
}

/// Transfer limits and supernatant removal geometry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransferConfig {
    /// Largest single aspirate (µl)
    pub max_aspirate_ul: f32,
    /// Air gap drawn between sub-transfers (µl)
    pub air_gap_ul: f32,
    /// Lateral offset away from the bead pellet during removal (mm)
    pub removal_offset_mm: f32,
    /// Height above the well bottom for removal (mm)
    pub removal_depth_mm: f32,
    /// Aspirate flow rate while removing supernatant (µl/s)
    pub removal_aspirate_flow: f32,
    /// Aspirate flow rate restored after removal (µl/s)
    pub aspirate_flow: f32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_aspirate_ul: DEFAULT_MAX_ASPIRATE_UL,
            air_gap_ul: DEFAULT_AIR_GAP_UL,
            removal_offset_mm: 2.0,
            removal_depth_mm: 0.5,
            removal_aspirate_flow: 30.0,
            aspirate_flow: 150.0,
        }
    }
}

/// Liquid waste reservoir configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WasteConfig {
    /// Volume that triggers an empty-waste prompt (µl)
    pub capacity_ul: f32,
}

impl Default for WasteConfig {
    fn default() -> Self {
        Self {
            capacity_ul: DEFAULT_WASTE_CAPACITY_UL,
        }
    }
}

/// Tip trash configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrashConfig {
    /// Tips dropped before the operator must empty the bin
    pub drop_threshold: u16,
    /// Alternating lateral drop offsets from the bin top (mm)
    pub offsets_mm: [f32; 2],
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            drop_threshold: DEFAULT_DROP_THRESHOLD,
            offsets_mm: [30.0, -18.0],
        }
    }
}

/// Run configuration
///
/// Created once at run start and never mutated during the run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Number of samples on the plate
    pub samples: u8,
    /// Park tips between adding liquid and removing supernatant
    pub park_tips: bool,
    /// Default settle time on the magnet (minutes)
    pub settle_minutes: u16,
    /// Pipette configuration
    pub pipette: PipetteConfig,
    /// Low-volume pipette for the final eluate transfer
    pub secondary: Option<PipetteConfig>,
    /// Magnetic module configuration
    pub magnet: MagnetConfig,
    /// Transfer limits
    pub transfer: TransferConfig,
    /// Liquid waste configuration
    pub waste: WasteConfig,
    /// Tip trash configuration
    pub trash: TrashConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            samples: 8,
            park_tips: false,
            settle_minutes: 5,
            pipette: PipetteConfig::default(),
            secondary: None,
            magnet: MagnetConfig::default(),
            transfer: TransferConfig::default(),
            waste: WasteConfig::default(),
            trash: TrashConfig::default(),
        }
    }
}

impl RunConfig {
    /// Channel width of the configured pipette
    pub const fn channels(&self) -> u8 {
        self.pipette.kind.channels()
    }

    /// Number of pipette positions needed to cover all samples
    pub const fn positions(&self) -> u8 {
        self.samples.div_ceil(self.channels())
    }

    /// Default settle time
    pub const fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_minutes as u64 * 60)
    }

    /// Validate the configuration
    ///
    /// Must pass before any hardware motion begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let channels = self.channels();
        if self.samples == 0 || self.samples % channels != 0 {
            return Err(ConfigError::SampleCountNotMultiple {
                samples: self.samples,
                channels,
            });
        }
        if self.samples > MAX_SAMPLES {
            return Err(ConfigError::SampleCountOutOfRange {
                samples: self.samples,
                max: MAX_SAMPLES,
            });
        }

        if let Some(secondary) = &self.secondary {
            if !is_positive(secondary.max_volume_ul) {
                return Err(ConfigError::InvalidVolume);
            }
        }

        let volumes = [
            self.pipette.max_volume_ul,
            self.transfer.max_aspirate_ul,
            self.transfer.removal_aspirate_flow,
            self.transfer.aspirate_flow,
            self.waste.capacity_ul,
        ];
        if !volumes.iter().all(|v| is_positive(*v)) {
            return Err(ConfigError::InvalidVolume);
        }
        if !self.transfer.air_gap_ul.is_finite() || self.transfer.air_gap_ul < 0.0 {
            return Err(ConfigError::InvalidVolume);
        }
        if self.trash.drop_threshold == 0 {
            return Err(ConfigError::InvalidVolume);
        }

        Ok(())
    }
}
