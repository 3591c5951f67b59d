//! Magnetic settle and supernatant removal

use core::fmt::Write;
use core::time::Duration;

use super::context::PlanContext;
use super::plan::{Op, Plan, Stage};
use super::split::split_volume;
use crate::config::ConfigError;
use crate::labware::Point;
use crate::state::Message;

/// Supernatant removal parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemovalParams {
    /// Volume to remove from each well (µl)
    pub volume_ul: f32,
    /// Pick up the tip parked for each well instead of a fresh one
    pub park: bool,
}

/// Delay message shown while beads settle
pub fn settle_message(settle: Duration) -> Message {
    let mut text = Message::new();
    let secs = settle.as_secs();
    let _ = if secs % 60 == 0 {
        write!(text, "Incubating on magnet for {} minutes.", secs / 60)
    } else {
        write!(text, "Incubating on magnet for {} seconds.", secs)
    };
    text
}

/// Engage the magnet and wait for the beads
///
/// With `only_if_disengaged` an already engaged magnet is left alone.
pub fn push_settle(plan: &mut Plan, ctx: &PlanContext<'_>, settle: Option<Duration>, only_if_disengaged: bool) {
    let height_mm = ctx.magnet_height();
    let duration = settle.unwrap_or_else(|| ctx.config.settle());

    plan.stage(Stage::Settle);
    if only_if_disengaged {
        plan.push(Op::EngageIfDisengaged { height_mm });
    } else {
        plan.push(Op::Engage { height_mm });
    }
    plan.push(Op::Delay {
        duration,
        message: Some(settle_message(duration)),
    });
}

/// Append supernatant removal for every target well
pub fn push_removal(plan: &mut Plan, ctx: &PlanContext<'_>, params: &RemovalParams) -> Result<(), ConfigError> {
    let transfer = ctx.transfer();
    let split = split_volume(params.volume_ul, transfer.max_aspirate_ul)
        .ok_or(ConfigError::InvalidVolume)?;
    let parking = ctx.parking_for(params.park)?;
    let waste = ctx.deck.liquid_waste.top(0.0);
    let base = ctx.config.pipette.flow;

    plan.stage(Stage::RemoveSupernatant);
    plan.push(Op::FlowRates(
        base.with_aspirate(transfer.removal_aspirate_flow),
    ));

    for (i, (well, spot)) in ctx.wells().iter().zip(parking.iter()).enumerate() {
        plan.push(Op::PickUpTip { explicit: *spot });

        // stay on the side away from the pellet
        let side = if i % 2 == 0 { -1.0 } else { 1.0 };
        let at = well.bottom(0.0).moved(Point::new(
            side * transfer.removal_offset_mm,
            0.0,
            transfer.removal_depth_mm,
        ));

        for _ in 0..split.count {
            plan.push(Op::TrackWaste(split.volume_ul));
            plan.push(Op::VoidResidual { at: well.top(0.0) });
            plan.push(Op::MoveTo(well.center()));
            plan.push(Op::Aspirate {
                volume: split.volume_ul,
                at,
                rate: 1.0,
            });
            plan.push(Op::AirGap(transfer.air_gap_ul));
            plan.push(Op::DispenseAll { at: waste, rate: 1.0 });
            plan.push(Op::BlowOut(waste));
            plan.push(Op::AirGap(transfer.air_gap_ul));
        }
        plan.push(Op::ReleaseTip { park: None });
    }

    plan.push(Op::FlowRates(base.with_aspirate(transfer.aspirate_flow)));
    Ok(())
}

/// Plan a standalone supernatant removal
pub fn plan_removal(ctx: &PlanContext<'_>, params: &RemovalParams) -> Result<Plan, ConfigError> {
    let mut plan = Plan::new();
    push_removal(&mut plan, ctx, params)?;
    Ok(plan)
}
