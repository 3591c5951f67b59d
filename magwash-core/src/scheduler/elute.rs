//! Elution
//!
//! Elution buffer goes onto the side of the pellet and the pellet is
//! resuspended off the magnet. After settling, the eluate is drawn from the
//! opposite side and moved to the elution plate. Without parking, a mounted
//! secondary pipette makes that last transfer with a fresh tip per
//! sub-transfer.

use core::time::Duration;

use super::context::PlanContext;
use super::plan::{Op, Plan, Stage};
use super::removal::push_settle;
use super::split::split_volume;
use crate::config::{is_positive, ConfigError, PipetteConfig};
use crate::labware::{Location, Point, WellRef};
use crate::traits::Instrument;

/// Air gap drawn by the secondary pipette before dispensing eluate (µl)
pub const SECONDARY_AIR_GAP_UL: f32 = 2.0;

/// Elution parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EluteParams {
    /// Elution buffer per well (µl)
    pub volume_ul: f32,
    /// Elution buffer source
    pub source: WellRef,
    /// Park tips after resuspension and reuse them for the transfer
    pub park: bool,
    /// Settle time; `None` uses the run default
    pub settle: Option<Duration>,
    /// Resuspension reference volume (µl)
    pub reference_ul: f32,
    /// Resuspension repetitions
    pub mix_reps: u8,
}

impl EluteParams {
    /// Elute with the default resuspension
    pub fn new(volume_ul: f32, source: WellRef) -> Self {
        Self {
            volume_ul,
            source,
            park: false,
            settle: None,
            reference_ul: 50.0,
            mix_reps: 5,
        }
    }
}

/// Compile an elution into a plan
pub fn plan_elute(ctx: &PlanContext<'_>, params: &EluteParams) -> Result<Plan, ConfigError> {
    if !is_positive(params.volume_ul) || params.volume_ul > ctx.transfer().max_aspirate_ul {
        return Err(ConfigError::InvalidVolume);
    }
    let transfer = ctx.transfer();
    let elution = ctx.elution()?;
    let parking = ctx.parking_for(params.park)?;
    let offset = transfer.removal_offset_mm;
    let depth = transfer.removal_depth_mm;

    let mut plan = Plan::new();
    plan.push(Op::Disengage);

    plan.stage(Stage::AddLiquid);
    for (i, (well, spot)) in ctx.wells().iter().zip(parking.iter()).enumerate() {
        let side = if i % 2 == 0 { 1.0 } else { -1.0 };
        let onto_pellet = well.bottom(0.0).moved(Point::new(side * offset, 0.0, depth));

        plan.push(Op::PickUpTip { explicit: None });
        plan.push(Op::Aspirate {
            volume: params.volume_ul,
            at: params.source.bottom(1.0),
            rate: 1.0,
        });
        plan.push(Op::MoveTo(well.center()));
        plan.push(Op::Dispense {
            volume: params.volume_ul,
            at: onto_pellet,
            rate: 1.0,
        });
        plan.push(Op::Resuspend {
            well: *well,
            reference_ul: params.reference_ul,
            reps: params.mix_reps,
        });
        plan.push(Op::BlowOut(well.bottom(5.0)));
        plan.push(Op::AirGap(transfer.air_gap_ul));
        plan.push(Op::ReleaseTip { park: *spot });
    }

    push_settle(&mut plan, ctx, params.settle, false);

    plan.stage(Stage::Elute);
    if let (false, Some(small)) = (params.park, ctx.config.secondary.as_ref()) {
        push_secondary_transfer(&mut plan, ctx, small, params.volume_ul, elution)?;
        return Ok(plan);
    }

    let targets = ctx.wells().iter().zip(elution.iter()).zip(parking.iter());
    for (i, ((well, dest), spot)) in targets.enumerate() {
        plan.push(Op::PickUpTip { explicit: *spot });
        plan.push(Op::Aspirate {
            volume: params.volume_ul,
            at: off_pellet(*well, i, offset, depth),
            rate: 1.0,
        });
        plan.push(Op::AirGap(transfer.air_gap_ul));
        plan.push(Op::DispenseAll {
            at: dest.bottom(5.0),
            rate: 1.0,
        });
        plan.push(Op::BlowOut(dest.top(-2.0)));
        plan.push(Op::AirGap(transfer.air_gap_ul));
        plan.push(Op::ReleaseTip { park: None });
    }

    Ok(plan)
}

/// Aspirate point for the eluate of the `index`-th well
fn off_pellet(well: WellRef, index: usize, offset: f32, depth: f32) -> Location {
    let side = if index % 2 == 0 { -1.0 } else { 1.0 };
    well.bottom(0.0).moved(Point::new(side * offset, 0.0, depth))
}

fn push_secondary_transfer(
    plan: &mut Plan,
    ctx: &PlanContext<'_>,
    pipette: &PipetteConfig,
    volume_ul: f32,
    elution: &[WellRef],
) -> Result<(), ConfigError> {
    let transfer = ctx.transfer();
    let split = split_volume(volume_ul, pipette.max_volume_ul - SECONDARY_AIR_GAP_UL)
        .ok_or(ConfigError::InvalidVolume)?;

    plan.push(Op::Select(Instrument::Secondary));
    for (i, (well, dest)) in ctx.wells().iter().zip(elution.iter()).enumerate() {
        let from = off_pellet(*well, i, transfer.removal_offset_mm, transfer.removal_depth_mm);
        for _ in 0..split.count {
            plan.push(Op::PickUpTip { explicit: None });
            plan.push(Op::Aspirate {
                volume: split.volume_ul,
                at: from,
                rate: 1.0,
            });
            plan.push(Op::AirGap(SECONDARY_AIR_GAP_UL));
            plan.push(Op::DispenseAll {
                at: dest.bottom(5.0),
                rate: 1.0,
            });
            plan.push(Op::BlowOut(dest.top(-2.0)));
            plan.push(Op::ReleaseTip { park: None });
        }
    }
    plan.push(Op::Select(Instrument::Primary));
    Ok(())
}
