//! Run file schema
//!
//! Mirrors the TOML layout. Pipette, magnet, transfer, waste and trash
//! tables deserialize straight into the core config types; the deck,
//! reagents and steps are resolved by the loader. A `[secondary_pipette]`
//! table mounts the low-volume pipette.

use std::collections::BTreeMap;

use magwash_core::config::{
    MagnetConfig, PipetteConfig, TransferConfig, TrashConfig, WasteConfig,
};
use serde::Deserialize;

/// Whole run file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    #[serde(default)]
    pub run: RunSection,
    #[serde(default)]
    pub pipette: PipetteConfig,
    pub secondary_pipette: Option<PipetteConfig>,
    #[serde(default)]
    pub magnet: MagnetConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub waste: WasteConfig,
    #[serde(default)]
    pub trash: TrashConfig,
    pub deck: DeckSection,
    /// Reagent name to reservoir column(s), 1-based
    #[serde(default)]
    pub reagents: BTreeMap<String, Columns>,
    #[serde(default, rename = "step")]
    pub steps: Vec<StepEntry>,
}

/// `[run]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub samples: u8,
    pub park_tips: bool,
    pub settle_minutes: u16,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            samples: 8,
            park_tips: false,
            settle_minutes: 5,
        }
    }
}

fn default_reservoir_capacity() -> f32 {
    15_000.0
}

fn default_trash_slot() -> u8 {
    12
}

/// `[deck]`, labware by slot number
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeckSection {
    pub sample_plate: u8,
    pub elution_plate: Option<u8>,
    pub reservoir: u8,
    #[serde(default = "default_reservoir_capacity")]
    pub reservoir_well_capacity_ul: f32,
    pub liquid_waste: u8,
    #[serde(default = "default_trash_slot")]
    pub trash: u8,
    pub tip_racks: Vec<u8>,
    #[serde(default)]
    pub secondary_tip_racks: Vec<u8>,
    pub parking_rack: Option<u8>,
}

/// One reservoir column or several
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Columns {
    One(u8),
    Many(Vec<u8>),
}

impl Columns {
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            Columns::One(c) => vec![*c],
            Columns::Many(cs) => cs.clone(),
        }
    }
}

/// `[[step]]`
#[derive(Debug, Clone, Deserialize)]
pub struct StepEntry {
    pub label: Option<String>,
    #[serde(flatten)]
    pub spec: StepSpec,
}

fn yes() -> bool {
    true
}

/// Step parameters, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    Wash {
        reagent: String,
        volume_ul: f32,
        #[serde(default)]
        park: bool,
        #[serde(default = "yes")]
        resuspend: bool,
        #[serde(default = "yes")]
        discard_supernatant: bool,
        mix_reps: Option<u8>,
        settle_minutes: Option<f32>,
    },
    Bind {
        reagent: String,
        volume_ul: f32,
        #[serde(default)]
        park: bool,
        rounds: Option<u8>,
        round_delay_s: Option<f32>,
        settle_minutes: Option<f32>,
        starting_volume_ul: Option<f32>,
    },
    RemoveSupernatant {
        volume_ul: f32,
        #[serde(default)]
        park: bool,
    },
    MixRound {
        volume_ul: f32,
        reps: u8,
        #[serde(default)]
        park: bool,
        #[serde(default)]
        return_tip: bool,
        #[serde(default)]
        touch_tip: bool,
    },
    Elute {
        reagent: String,
        volume_ul: f32,
        #[serde(default)]
        park: bool,
        settle_minutes: Option<f32>,
    },
    Engage {
        height_mm: Option<f32>,
    },
    Disengage,
    Delay {
        #[serde(default)]
        minutes: f32,
        #[serde(default)]
        seconds: f32,
        message: Option<String>,
    },
    Pause {
        message: String,
    },
    Comment {
        text: String,
    },
    Light {
        on: bool,
    },
    BlockTemperature {
        celsius: f32,
        hold_s: Option<f32>,
        ramp_rate: Option<f32>,
    },
    LidTemperature {
        celsius: f32,
    },
    DeactivateLid,
    OpenLid,
    CloseLid,
}

impl StepSpec {
    /// The `kind` tag as written in the run file
    pub fn kind(&self) -> &'static str {
        match self {
            StepSpec::Wash { .. } => "wash",
            StepSpec::Bind { .. } => "bind",
            StepSpec::RemoveSupernatant { .. } => "remove_supernatant",
            StepSpec::MixRound { .. } => "mix_round",
            StepSpec::Elute { .. } => "elute",
            StepSpec::Engage { .. } => "engage",
            StepSpec::Disengage => "disengage",
            StepSpec::Delay { .. } => "delay",
            StepSpec::Pause { .. } => "pause",
            StepSpec::Comment { .. } => "comment",
            StepSpec::Light { .. } => "light",
            StepSpec::BlockTemperature { .. } => "block_temperature",
            StepSpec::LidTemperature { .. } => "lid_temperature",
            StepSpec::DeactivateLid => "deactivate_lid",
            StepSpec::OpenLid => "open_lid",
            StepSpec::CloseLid => "close_lid",
        }
    }
}
