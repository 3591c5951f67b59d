//! Timed mixing rounds
//!
//! Mixes each well in place with a tip that is either parked for that well
//! or freshly counted. Recipes put delays between rounds to time an
//! incubation.

use super::context::PlanContext;
use super::plan::{Op, Plan, Stage};
use crate::config::{is_positive, ConfigError};

/// One mixing pass over every target well
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MixRoundParams {
    /// Mix volume (µl)
    pub volume_ul: f32,
    /// Mix repetitions per well
    pub reps: u8,
    /// Use each well's parked tip
    pub park: bool,
    /// Put the tip back in its parking spot instead of the trash
    pub return_tip: bool,
    /// Touch the tip to the well walls after mixing
    pub touch_tip: bool,
}

/// Compile a mixing round into a plan
pub fn plan_mix_round(ctx: &PlanContext<'_>, params: &MixRoundParams) -> Result<Plan, ConfigError> {
    if !is_positive(params.volume_ul) {
        return Err(ConfigError::InvalidVolume);
    }
    let parking = ctx.parking_for(params.park)?;

    let mut plan = Plan::new();
    plan.stage(Stage::Mix);
    for (well, spot) in ctx.wells().iter().zip(parking.iter()) {
        plan.push(Op::PickUpTip { explicit: *spot });
        plan.push(Op::Mix {
            reps: params.reps,
            volume: params.volume_ul,
            at: well.bottom(0.5),
        });
        plan.push(Op::BlowOut(well.top(-2.0)));
        if params.touch_tip {
            plan.push(Op::TouchTip);
        }
        let back = if params.return_tip { *spot } else { None };
        plan.push(Op::ReleaseTip { park: back });
    }
    Ok(plan)
}
