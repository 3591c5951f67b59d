//! Run file loader
//!
//! Reads a run file, resolves slot numbers and reagent names into wells,
//! and compiles every step once so a bad parameter is reported before
//! anything moves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use heapless::Vec as BoundedVec;
use magwash_core::config::{ConfigError, DeckLayout, RunConfig};
use magwash_core::labware::{LabwareId, WellRef, PLATE_COLUMNS};
use magwash_core::recipe::{Recipe, Step};
use magwash_core::scheduler::{
    BindParams, EluteParams, MixRoundParams, PlanContext, RemovalParams, WashParams,
};
use magwash_core::state::message;
use thiserror::Error;
use tracing::{debug, info};

use super::schema::{Columns, DeckSection, RunFile, StepEntry, StepSpec};

/// Run file errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run file")]
    Parse(#[from] toml::de::Error),

    #[error("step {step}: unknown reagent '{name}'")]
    UnknownReagent { step: usize, name: String },

    #[error("reagent '{name}': column {column} is outside 1..={max}", max = PLATE_COLUMNS)]
    InvalidColumn { name: String, column: u8 },

    #[error("reagent '{name}' lists no columns")]
    EmptyReagent { name: String },

    #[error("step {step}: duration must be finite and not negative")]
    InvalidDuration { step: usize },

    #[error("step {step} ({label}) is invalid")]
    Step {
        step: usize,
        label: String,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a run needs, validated
#[derive(Debug, Clone)]
pub struct RunSetup {
    pub config: RunConfig,
    pub deck: DeckLayout,
    pub recipe: Recipe,
}

impl RunSetup {
    /// Planning context over this setup
    pub fn context(&self) -> Result<PlanContext<'_>, ConfigError> {
        PlanContext::new(&self.config, &self.deck)
    }
}

/// Load and validate a run file from disk
pub fn load(path: &Path) -> Result<RunSetup, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "read run file");
    parse(&text)
}

/// Parse and validate run file text
pub fn parse(text: &str) -> Result<RunSetup, LoadError> {
    let file: RunFile = toml::from_str(text)?;

    let config = RunConfig {
        samples: file.run.samples,
        park_tips: file.run.park_tips,
        settle_minutes: file.run.settle_minutes,
        pipette: file.pipette,
        secondary: file.secondary_pipette,
        magnet: file.magnet,
        transfer: file.transfer,
        waste: file.waste,
        trash: file.trash,
    };
    config.validate()?;

    let deck = deck_layout(&file.deck)?;
    deck.validate(&config)?;

    let reagents = resolve_reagents(&deck, &file.reagents)?;

    let mut recipe = Recipe::new();
    for (index, entry) in file.steps.iter().enumerate() {
        let step = build_step(index + 1, entry, &reagents)?;
        match &entry.label {
            Some(label) => recipe.push(label, step),
            None => recipe.push_step(step),
        };
    }

    let ctx = PlanContext::new(&config, &deck)?;
    for (index, entry) in recipe.steps().iter().enumerate() {
        entry.step.plan(&ctx).map_err(|source| LoadError::Step {
            step: index + 1,
            label: entry.label.to_string(),
            source,
        })?;
    }

    Ok(RunSetup {
        config,
        deck,
        recipe,
    })
}

fn deck_layout(section: &DeckSection) -> Result<DeckLayout, ConfigError> {
    let racks = |slots: &[u8]| {
        let ids = slots.iter().map(|slot| LabwareId(*slot)).collect::<Vec<_>>();
        BoundedVec::from_slice(&ids).map_err(|_| ConfigError::TooManyTipRacks)
    };

    Ok(DeckLayout {
        sample_plate: LabwareId(section.sample_plate),
        elution_plate: section.elution_plate.map(LabwareId),
        reservoir: LabwareId(section.reservoir),
        reservoir_well_capacity_ul: section.reservoir_well_capacity_ul,
        liquid_waste: WellRef::first(LabwareId(section.liquid_waste)),
        trash: WellRef::first(LabwareId(section.trash)),
        tip_racks: racks(&section.tip_racks)?,
        secondary_tip_racks: racks(&section.secondary_tip_racks)?,
        parking_rack: section.parking_rack.map(LabwareId),
    })
}

fn resolve_reagents(
    deck: &DeckLayout,
    reagents: &BTreeMap<String, Columns>,
) -> Result<BTreeMap<String, Vec<WellRef>>, LoadError> {
    let mut resolved = BTreeMap::new();
    for (name, columns) in reagents {
        let columns = columns.to_vec();
        if columns.is_empty() {
            return Err(LoadError::EmptyReagent { name: name.clone() });
        }

        let mut wells = Vec::with_capacity(columns.len());
        for column in columns {
            if !(1..=PLATE_COLUMNS).contains(&column) {
                return Err(LoadError::InvalidColumn {
                    name: name.clone(),
                    column,
                });
            }
            wells.push(deck.reservoir_well(column - 1));
        }
        resolved.insert(name.clone(), wells);
    }
    Ok(resolved)
}

fn duration_from_minutes(step: usize, minutes: Option<f32>) -> Result<Option<Duration>, LoadError> {
    minutes
        .map(|m| seconds(step, m * 60.0))
        .transpose()
}

fn seconds(step: usize, secs: f32) -> Result<Duration, LoadError> {
    Duration::try_from_secs_f32(secs).map_err(|_| LoadError::InvalidDuration { step })
}

fn build_step(
    index: usize,
    entry: &StepEntry,
    reagents: &BTreeMap<String, Vec<WellRef>>,
) -> Result<Step, LoadError> {
    let sources = |name: &str| {
        reagents
            .get(name)
            .map(|wells| wells.as_slice())
            .ok_or_else(|| LoadError::UnknownReagent {
                step: index,
                name: name.to_string(),
            })
    };
    let invalid = |source: ConfigError| LoadError::Step {
        step: index,
        label: entry.label.clone().unwrap_or_else(|| entry.spec.kind().to_string()),
        source,
    };

    let step = match &entry.spec {
        StepSpec::Wash {
            reagent,
            volume_ul,
            park,
            resuspend,
            discard_supernatant,
            mix_reps,
            settle_minutes,
        } => {
            let mut params = WashParams::new(*volume_ul, sources(reagent.as_str())?).map_err(invalid)?;
            params.park = *park;
            params.resuspend = *resuspend;
            params.discard_supernatant = *discard_supernatant;
            if let Some(reps) = mix_reps {
                params.mix_reps = *reps;
            }
            params.settle = duration_from_minutes(index, *settle_minutes)?;
            Step::Wash(params)
        }
        StepSpec::Bind {
            reagent,
            volume_ul,
            park,
            rounds,
            round_delay_s,
            settle_minutes,
            starting_volume_ul,
        } => {
            let mut params = BindParams::new(*volume_ul, sources(reagent.as_str())?).map_err(invalid)?;
            params.park = *park;
            if let Some(rounds) = rounds {
                params.rounds = *rounds;
            }
            if let Some(delay) = round_delay_s {
                params.round_delay = seconds(index, *delay)?;
            }
            params.settle = duration_from_minutes(index, *settle_minutes)?;
            if let Some(volume) = starting_volume_ul {
                params.starting_volume_ul = *volume;
            }
            Step::Bind(params)
        }
        StepSpec::RemoveSupernatant { volume_ul, park } => Step::RemoveSupernatant(RemovalParams {
            volume_ul: *volume_ul,
            park: *park,
        }),
        StepSpec::MixRound {
            volume_ul,
            reps,
            park,
            return_tip,
            touch_tip,
        } => Step::MixRound(MixRoundParams {
            volume_ul: *volume_ul,
            reps: *reps,
            park: *park,
            return_tip: *return_tip,
            touch_tip: *touch_tip,
        }),
        StepSpec::Elute {
            reagent,
            volume_ul,
            park,
            settle_minutes,
        } => {
            // Elution buffer comes from the reagent's first column
            let source = sources(reagent.as_str())?
                .first()
                .copied()
                .ok_or_else(|| LoadError::EmptyReagent {
                    name: reagent.clone(),
                })?;
            let mut params = EluteParams::new(*volume_ul, source);
            params.park = *park;
            params.settle = duration_from_minutes(index, *settle_minutes)?;
            Step::Elute(params)
        }
        StepSpec::Engage { height_mm } => Step::Engage {
            height_mm: *height_mm,
        },
        StepSpec::Disengage => Step::Disengage,
        StepSpec::Delay {
            minutes,
            seconds: secs,
            message: text,
        } => Step::Delay {
            duration: seconds(index, minutes * 60.0 + secs)?,
            message: text.as_deref().map(message),
        },
        StepSpec::Pause { message: text } => Step::Pause(message(text)),
        StepSpec::Comment { text } => Step::Comment(message(text)),
        StepSpec::Light { on } => Step::Light(*on),
        StepSpec::BlockTemperature {
            celsius,
            hold_s,
            ramp_rate,
        } => Step::BlockTemperature {
            celsius: *celsius,
            hold: hold_s.map(|s| seconds(index, s)).transpose()?,
            ramp_rate: *ramp_rate,
        },
        StepSpec::LidTemperature { celsius } => Step::LidTemperature(*celsius),
        StepSpec::DeactivateLid => Step::DeactivateLid,
        StepSpec::OpenLid => Step::OpenLid,
        StepSpec::CloseLid => Step::CloseLid,
    };
    Ok(step)
}

/// Log a summary of the loaded run
pub fn log_config_summary(setup: &RunSetup) {
    let config = &setup.config;
    info!(
        samples = config.samples,
        channels = config.channels(),
        steps = setup.recipe.len(),
        "Run file loaded"
    );
    debug!("  pipette: {:?}, {}µl tips", config.pipette.kind, config.pipette.max_volume_ul);
    debug!(
        "  magnet: {:?}, engage at {}mm",
        config.magnet.generation,
        config.magnet.engage_height_mm()
    );
    debug!("  {} tip racks", setup.deck.tip_racks.len());
    if let Some(secondary) = &config.secondary {
        debug!(
            "  secondary pipette: {:?}, {}µl tips, {} tip racks",
            secondary.kind,
            secondary.max_volume_ul,
            setup.deck.secondary_tip_racks.len()
        );
    }
    debug!("  trash prompt after {} tips", config.trash.drop_threshold);
    debug!("  waste prompt at {}µl", config.waste.capacity_ul);
    for (index, entry) in setup.recipe.steps().iter().enumerate() {
        debug!("  step {}: {} ({})", index + 1, entry.label, entry.step);
    }
}
