//! Recipe steps
//!
//! A step is one entry of a recipe. Liquid-handling steps compile through
//! their planner; module and operator steps compile to a single operation.

use core::fmt;
use core::time::Duration;

use crate::config::ConfigError;
use crate::scheduler::{
    plan_bind, plan_elute, plan_mix_round, plan_removal, plan_wash, BindParams, EluteParams,
    MixRoundParams, Op, Plan, PlanContext, RemovalParams, Stage, WashParams,
};
use crate::state::Message;

/// One recipe step
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Add liquid, resuspend, settle and remove supernatant
    Wash(WashParams),
    /// Bead binding with mixing rounds
    Bind(BindParams),
    /// Settle-free supernatant removal
    RemoveSupernatant(RemovalParams),
    /// One in-place mixing pass
    MixRound(MixRoundParams),
    /// Elution into the elution plate
    Elute(EluteParams),
    /// Engage the magnet; `None` uses the configured height
    Engage { height_mm: Option<f32> },
    Disengage,
    Delay {
        duration: Duration,
        message: Option<Message>,
    },
    /// Wait for the operator
    Pause(Message),
    Comment(Message),
    Light(bool),
    BlockTemperature {
        celsius: f32,
        hold: Option<Duration>,
        ramp_rate: Option<f32>,
    },
    LidTemperature(f32),
    DeactivateLid,
    OpenLid,
    CloseLid,
}

impl Step {
    /// Short name of the step kind
    pub fn name(&self) -> &'static str {
        match self {
            Step::Wash(_) => "wash",
            Step::Bind(_) => "bind",
            Step::RemoveSupernatant(_) => "remove_supernatant",
            Step::MixRound(_) => "mix_round",
            Step::Elute(_) => "elute",
            Step::Engage { .. } => "engage",
            Step::Disengage => "disengage",
            Step::Delay { .. } => "delay",
            Step::Pause(_) => "pause",
            Step::Comment(_) => "comment",
            Step::Light(_) => "light",
            Step::BlockTemperature { .. } => "block_temperature",
            Step::LidTemperature(_) => "lid_temperature",
            Step::DeactivateLid => "deactivate_lid",
            Step::OpenLid => "open_lid",
            Step::CloseLid => "close_lid",
        }
    }

    /// Compile the step into a plan
    pub fn plan(&self, ctx: &PlanContext<'_>) -> Result<Plan, ConfigError> {
        let single = |stage: Stage, op: Op| -> Result<Plan, ConfigError> {
            let mut plan = Plan::new();
            plan.stage(stage).push(op);
            Ok(plan)
        };

        match self {
            Step::Wash(params) => plan_wash(ctx, params),
            Step::Bind(params) => plan_bind(ctx, params),
            Step::RemoveSupernatant(params) => plan_removal(ctx, params),
            Step::MixRound(params) => plan_mix_round(ctx, params),
            Step::Elute(params) => plan_elute(ctx, params),
            Step::Engage { height_mm } => single(
                Stage::Setup,
                Op::Engage {
                    height_mm: height_mm.unwrap_or_else(|| ctx.magnet_height()),
                },
            ),
            Step::Disengage => single(Stage::Setup, Op::Disengage),
            Step::Delay { duration, message } => single(
                Stage::Operator,
                Op::Delay {
                    duration: *duration,
                    message: message.clone(),
                },
            ),
            Step::Pause(text) => single(Stage::Operator, Op::Pause(text.clone())),
            Step::Comment(text) => single(Stage::Operator, Op::Comment(text.clone())),
            Step::Light(on) => single(Stage::Operator, Op::Light(*on)),
            Step::BlockTemperature {
                celsius,
                hold,
                ramp_rate,
            } => single(
                Stage::Thermocycle,
                Op::BlockTemperature {
                    celsius: *celsius,
                    hold: *hold,
                    ramp_rate: *ramp_rate,
                },
            ),
            Step::LidTemperature(celsius) => {
                single(Stage::Thermocycle, Op::LidTemperature(*celsius))
            }
            Step::DeactivateLid => single(Stage::Thermocycle, Op::DeactivateLid),
            Step::OpenLid => single(Stage::Thermocycle, Op::OpenLid),
            Step::CloseLid => single(Stage::Thermocycle, Op::CloseLid),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Wash(p) => write!(f, "wash {}µl", p.volume_ul),
            Step::Bind(p) => write!(f, "bind {}µl", p.volume_ul),
            Step::RemoveSupernatant(p) => write!(f, "remove {}µl supernatant", p.volume_ul),
            Step::MixRound(p) => write!(f, "mix {} x {}µl", p.reps, p.volume_ul),
            Step::Elute(p) => write!(f, "elute {}µl", p.volume_ul),
            Step::Delay { duration, .. } => write!(f, "delay {}s", duration.as_secs()),
            Step::BlockTemperature { celsius, .. } => write!(f, "block to {}°C", celsius),
            Step::LidTemperature(celsius) => write!(f, "lid to {}°C", celsius),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::labware::{LabwareId, WellRef};
    use crate::state::message;
    use crate::testing::deck;

    #[test]
    fn test_engage_defaults_to_configured_height() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();

        let plan = Step::Engage { height_mm: None }.plan(&ctx).unwrap();
        assert_eq!(plan.ops()[0].op, Op::Engage { height_mm: 6.5 });

        let plan = Step::Engage {
            height_mm: Some(10.0),
        }
        .plan(&ctx)
        .unwrap();
        assert_eq!(plan.ops()[0].op, Op::Engage { height_mm: 10.0 });
    }

    #[test]
    fn test_module_steps_are_single_ops() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();

        let steps = [
            Step::Disengage,
            Step::Pause(message("Add DNase by hand")),
            Step::Light(true),
            Step::LidTemperature(105.0),
            Step::OpenLid,
        ];
        for step in &steps {
            assert_eq!(step.plan(&ctx).unwrap().len(), 1, "{}", step);
        }

        let plan = Step::BlockTemperature {
            celsius: 65.0,
            hold: Some(Duration::from_secs(300)),
            ramp_rate: None,
        }
        .plan(&ctx)
        .unwrap();
        assert_eq!(plan.ops()[0].stage, Stage::Thermocycle);
    }

    #[test]
    fn test_planner_errors_surface() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let step = Step::Elute(EluteParams::new(0.0, WellRef::first(LabwareId(5))));
        assert_eq!(step.plan(&ctx), Err(ConfigError::InvalidVolume));
    }

    #[test]
    fn test_display() {
        use alloc::string::ToString;

        let wash = Step::Wash(WashParams::new(150.0, &[WellRef::first(LabwareId(5))]).unwrap());
        assert_eq!(wash.to_string(), "wash 150µl");
        assert_eq!(Step::OpenLid.to_string(), "open_lid");
    }
}
