//! Bead wash cycle
//!
//! Add liquid to every target well, optionally resuspend the pellet, then
//! settle on the magnet and remove the supernatant.

use core::time::Duration;

use heapless::Vec;

use super::context::{check_sources, PlanContext};
use super::plan::{Op, Plan, Stage};
use super::removal::{push_removal, push_settle, RemovalParams};
use super::split::{source_index, split_volume};
use crate::config::{ConfigError, MAX_SOURCES};
use crate::labware::WellRef;

/// Default resuspension reference volume (µl)
pub const DEFAULT_REFERENCE_UL: f32 = 180.0;

/// Default resuspension repetitions
pub const DEFAULT_MIX_REPS: u8 = 5;

/// Wash parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WashParams {
    /// Volume added to each well (µl)
    pub volume_ul: f32,
    /// Reagent sources; targets are divided evenly across them
    pub sources: Vec<WellRef, MAX_SOURCES>,
    /// Resuspension repetitions
    pub mix_reps: u8,
    /// Park tips between adding liquid and removing supernatant
    pub park: bool,
    /// Resuspend the pellet after adding liquid
    pub resuspend: bool,
    /// Settle on the magnet and remove the supernatant
    pub discard_supernatant: bool,
    /// Settle time; `None` uses the run default
    pub settle: Option<Duration>,
    /// Resuspension reference volume (µl)
    pub reference_ul: f32,
}

impl WashParams {
    /// Wash with default flags: resuspend and discard
    pub fn new(volume_ul: f32, sources: &[WellRef]) -> Result<Self, ConfigError> {
        Ok(Self {
            volume_ul,
            sources: Vec::from_slice(sources).map_err(|_| ConfigError::TooManySources)?,
            mix_reps: DEFAULT_MIX_REPS,
            park: false,
            resuspend: true,
            discard_supernatant: true,
            settle: None,
            reference_ul: DEFAULT_REFERENCE_UL,
        })
    }
}

/// Compile a wash into a plan
pub fn plan_wash(ctx: &PlanContext<'_>, params: &WashParams) -> Result<Plan, ConfigError> {
    let wells = ctx.wells();
    check_sources(&params.sources, wells.len())?;

    let transfer = ctx.transfer();
    let split = split_volume(params.volume_ul, transfer.max_aspirate_ul)
        .ok_or(ConfigError::InvalidVolume)?;
    let parking = ctx.parking_for(params.park)?;

    let mut plan = Plan::new();
    if params.resuspend {
        plan.push(Op::DisengageIfEngaged);
    }

    for (i, (well, spot)) in wells.iter().zip(parking.iter()).enumerate() {
        let source = params.sources[source_index(i, wells.len(), params.sources.len())?];

        plan.stage(Stage::AddLiquid);
        plan.push(Op::PickUpTip { explicit: None });
        for sub in 0..split.count {
            plan.push(Op::VoidResidual { at: source.top(0.0) });
            plan.push(Op::Aspirate {
                volume: split.volume_ul,
                at: source.bottom(1.0),
                rate: 1.0,
            });
            plan.push(Op::Dispense {
                volume: split.volume_ul,
                at: well.top(0.0),
                rate: 1.0,
            });
            if split.air_gap_after(sub) {
                plan.push(Op::AirGap(transfer.air_gap_ul));
            }
        }

        if params.resuspend {
            plan.stage(Stage::Resuspend);
            plan.push(Op::Resuspend {
                well: *well,
                reference_ul: params.reference_ul,
                reps: params.mix_reps,
            });
        }

        plan.stage(Stage::AddLiquid);
        plan.push(Op::BlowOut(well.top(0.0)));
        plan.push(Op::AirGap(transfer.air_gap_ul));
        plan.push(Op::ReleaseTip { park: *spot });
    }

    if params.discard_supernatant {
        push_settle(&mut plan, ctx, params.settle, true);
        push_removal(
            &mut plan,
            ctx,
            &RemovalParams {
                volume_ul: params.volume_ul,
                park: params.park,
            },
        )?;
    }

    Ok(plan)
}
