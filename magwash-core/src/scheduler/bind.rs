//! Bead binding
//!
//! Beads settle in the reservoir, so each reservoir channel is premixed the
//! first time it is drawn from. Channels are consumed in order as each one
//! runs dry. After the transfer the samples go through several pipette
//! mixing rounds, then settle and lose their supernatant.

use core::time::Duration;

use heapless::Vec;

use super::context::PlanContext;
use super::plan::{Op, Plan, Stage};
use super::removal::{push_removal, push_settle, RemovalParams};
use super::split::split_volume;
use crate::config::{is_positive, ConfigError, MAX_SOURCES};
use crate::labware::WellRef;

/// Fraction of a reservoir channel that can be drawn before moving on
const USABLE_FRACTION: f32 = 0.95;

/// Bead premix strokes when a channel is first used
pub const PREMIX_STROKES: u8 = 11;

/// Bead premix stroke volume (µl)
pub const PREMIX_VOLUME_UL: f32 = 180.0;

/// Bind parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BindParams {
    /// Binding buffer added to each well (µl)
    pub volume_ul: f32,
    /// Reservoir channels holding binding buffer, in consumption order
    pub sources: Vec<WellRef, MAX_SOURCES>,
    /// Park tips after the transfer for supernatant removal
    pub park: bool,
    /// Pipette mixing rounds after the transfer
    pub rounds: u8,
    /// Delay after each mixing round
    pub round_delay: Duration,
    /// Settle time; `None` uses the run default
    pub settle: Option<Duration>,
    /// Liquid already in each well (µl), removed with the buffer
    pub starting_volume_ul: f32,
    /// Mix repetitions right after the transfer
    pub transfer_mix_reps: u8,
    /// Mix repetitions per round
    pub round_mix_reps: u8,
    /// Mix volume in the well (µl)
    pub mix_volume_ul: f32,
}

impl BindParams {
    /// Bind with the default mixing schedule
    pub fn new(volume_ul: f32, sources: &[WellRef]) -> Result<Self, ConfigError> {
        Ok(Self {
            volume_ul,
            sources: Vec::from_slice(sources).map_err(|_| ConfigError::TooManySources)?,
            park: false,
            rounds: 5,
            round_delay: Duration::from_secs(60),
            settle: None,
            starting_volume_ul: 0.0,
            transfer_mix_reps: 5,
            round_mix_reps: 6,
            mix_volume_ul: 200.0,
        })
    }
}

/// Compile a bind step into a plan
pub fn plan_bind(ctx: &PlanContext<'_>, params: &BindParams) -> Result<Plan, ConfigError> {
    if params.sources.is_empty() {
        return Err(ConfigError::NoSources);
    }
    if !is_positive(params.mix_volume_ul) || params.starting_volume_ul < 0.0 {
        return Err(ConfigError::InvalidVolume);
    }

    let transfer = ctx.transfer();
    let split = split_volume(params.volume_ul, transfer.max_aspirate_ul)
        .ok_or(ConfigError::InvalidVolume)?;
    let draw_per_sub = split.volume_ul * ctx.config.channels() as f32;
    let draws_per_channel = (USABLE_FRACTION * ctx.deck.reservoir_well_capacity_ul / draw_per_sub) as usize;
    if draws_per_channel == 0 {
        return Err(ConfigError::InvalidVolume);
    }

    let wells = ctx.wells();
    let parking = ctx.parking_for(params.park)?;
    let mut plan = Plan::new();
    let mut latest: Option<usize> = None;

    plan.stage(Stage::AddLiquid);
    for (i, (well, spot)) in wells.iter().zip(parking.iter()).enumerate() {
        plan.push(Op::PickUpTip { explicit: None });

        for sub in 0..split.count {
            let channel = (i * split.count as usize + sub as usize) / draws_per_channel;
            let source = *params.sources.get(channel).ok_or(ConfigError::SourceChannelOutOfRange {
                channel: channel as u8,
                sources: params.sources.len() as u8,
            })?;

            plan.push(Op::VoidResidual { at: source.top(0.0) });
            if latest.map_or(true, |seen| channel > seen) {
                for _ in 0..PREMIX_STROKES {
                    plan.push(Op::Aspirate {
                        volume: PREMIX_VOLUME_UL,
                        at: source.bottom(0.5),
                        rate: 2.0,
                    });
                    plan.push(Op::Dispense {
                        volume: PREMIX_VOLUME_UL,
                        at: source.bottom(5.0),
                        rate: 2.0,
                    });
                }
                latest = Some(channel);
            }

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

        plan.push(Op::Mix {
            reps: params.transfer_mix_reps,
            volume: params.mix_volume_ul,
            at: well.bottom(1.0),
        });
        plan.push(Op::BlowOut(well.top(-2.0)));
        plan.push(Op::TouchTip);
        plan.push(Op::AirGap(transfer.air_gap_ul));
        plan.push(Op::ReleaseTip { park: *spot });
    }

    for _ in 0..params.rounds {
        plan.stage(Stage::Mix);
        for well in wells {
            plan.push(Op::PickUpTip { explicit: None });
            plan.push(Op::Mix {
                reps: params.round_mix_reps,
                volume: params.mix_volume_ul,
                at: well.bottom(1.0),
            });
            plan.push(Op::BlowOut(well.top(0.0)));
            plan.push(Op::TouchTip);
            plan.push(Op::ReleaseTip { park: None });
        }
        plan.push(Op::Delay {
            duration: params.round_delay,
            message: None,
        });
    }

    push_settle(&mut plan, ctx, params.settle, false);
    push_removal(
        &mut plan,
        ctx,
        &RemovalParams {
            volume_ul: params.volume_ul + params.starting_volume_ul,
            park: params.park,
        },
    )?;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::labware::LabwareId;
    use crate::testing::deck;

    fn channel(c: u8) -> WellRef {
        WellRef::new(LabwareId(5), 0, c)
    }

    fn premixes(plan: &Plan) -> usize {
        plan.count(|op| matches!(op, Op::Aspirate { volume, rate, .. } if *volume == PREMIX_VOLUME_UL && *rate == 2.0))
    }

    #[test]
    fn test_channels_advance_as_they_empty() {
        // 420 µl in 3 x 140 µl; 8 channels draw 1120 µl per sub-transfer;
        // 0.95 * 15000 / 1120 = 12 draws per reservoir channel
        let config = RunConfig {
            samples: 48,
            ..Default::default()
        };
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let params = BindParams::new(420.0, &[channel(0), channel(1)]).unwrap();

        let plan = plan_bind(&ctx, &params).unwrap();
        // 6 wells x 3 subs = 18 draws: first 12 from channel 0, rest from 1
        assert_eq!(premixes(&plan), 2 * PREMIX_STROKES as usize);

        let draws_from_second = plan.count(|op| {
            matches!(op, Op::Aspirate { at, rate, .. } if at.well == channel(1) && *rate == 1.0)
        });
        assert_eq!(draws_from_second, 6);
    }

    #[test]
    fn test_out_of_range_channel_rejected() {
        let config = RunConfig {
            samples: 48,
            ..Default::default()
        };
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let params = BindParams::new(420.0, &[channel(0)]).unwrap();

        assert_eq!(
            plan_bind(&ctx, &params),
            Err(ConfigError::SourceChannelOutOfRange {
                channel: 1,
                sources: 1
            })
        );
    }

    #[test]
    fn test_rounds_and_removal() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut params = BindParams::new(420.0, &[channel(0)]).unwrap();
        params.starting_volume_ul = 200.0;

        let plan = plan_bind(&ctx, &params).unwrap();
        assert_eq!(premixes(&plan), PREMIX_STROKES as usize);
        // one transfer tip, five round tips, one removal tip
        assert_eq!(
            plan.count(|op| matches!(op, Op::PickUpTip { explicit: None })),
            7
        );
        assert_eq!(
            plan.count(|op| matches!(op, Op::Delay { message: None, .. })),
            5
        );
        assert_eq!(plan.count(|op| matches!(op, Op::Engage { .. })), 1);
        // 620 µl removed in 4 x 155 µl
        assert_eq!(
            plan.count(|op| matches!(op, Op::TrackWaste(v) if *v == 155.0)),
            4
        );
    }
}
