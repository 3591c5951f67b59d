//! Plan executor
//!
//! Walks a compiled [`Plan`] one operation per call to [`Executor::step`].
//! When an operation needs the operator the executor stops with
//! [`Progress::Suspended`] and stays there until [`Executor::resume`]
//! applies the acknowledgement to the ledger. Whether the suspending
//! operation is retried or skipped depends on when the prompt was raised:
//!
//! - tip replacement is raised before the pick-up, so the pick-up is retried
//! - a full trash is raised after the drop, so execution moves on
//! - a full liquid waste is raised before the transfer, so execution moves
//!   on and the ledger applies the held-back volume on acknowledgement
//! - an operator pause moves on
//!
//! Pipette operations go to the instrument chosen by the last
//! [`Op::Select`]; a plan starts on the primary pipette.

use super::error::RunError;
use super::plan::{Op, Plan, Stage};
use crate::inventory::{Acquired, Ledger, Released, TipHandle, Tracked};
use crate::motion::ResuspensionMotion;
use crate::state::Prompt;
use crate::traits::{Instrument, MagneticModule, Operator, Pipette, Thermocycler, Workcell};

/// Result of one executor step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Operation performed; more remain
    Continue,
    /// Waiting on the operator
    Suspended(Prompt),
    /// Plan finished
    Complete,
}

/// Outcome of a single operation
enum Outcome {
    /// Done; move to the next operation
    Done,
    /// Not performed; retry it after acknowledgement
    Retry(Prompt),
    /// Done; acknowledgement required before the next operation
    Advance(Prompt),
}

/// Re-entrant cursor over a plan
#[derive(Debug, Clone)]
pub struct Executor {
    plan: Plan,
    pc: usize,
    held: Option<TipHandle>,
    active: Instrument,
    pending: Option<Prompt>,
}

impl Executor {
    /// Create an executor positioned at the first operation
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            pc: 0,
            held: None,
            active: Instrument::Primary,
            pending: None,
        }
    }

    /// Index of the next operation
    pub fn position(&self) -> usize {
        self.pc
    }

    /// Number of operations in the plan
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Check if the plan has no operations
    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Check if every operation has run and no prompt is pending
    pub fn is_complete(&self) -> bool {
        self.pc >= self.plan.len() && self.pending.is_none()
    }

    /// Stage of the next operation
    pub fn stage(&self) -> Option<Stage> {
        self.plan.get(self.pc).map(|planned| planned.stage)
    }

    /// Prompt awaiting acknowledgement
    pub fn pending(&self) -> Option<&Prompt> {
        self.pending.as_ref()
    }

    /// Check if the executor believes a tip is on the pipette
    pub fn holds_tip(&self) -> bool {
        self.held.is_some()
    }

    /// Instrument receiving pipette operations
    pub fn instrument(&self) -> Instrument {
        self.active
    }

    /// The plan being executed
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Perform the next operation
    pub fn step<W: Workcell>(
        &mut self,
        cell: &mut W,
        ledger: &mut Ledger,
    ) -> Result<Progress, RunError> {
        if let Some(prompt) = &self.pending {
            return Ok(Progress::Suspended(prompt.clone()));
        }
        let Some(planned) = self.plan.get(self.pc) else {
            return Ok(Progress::Complete);
        };

        let mut turn = Turn {
            held: &mut self.held,
            active: &mut self.active,
        };
        match perform(&planned.op, &mut turn, cell, ledger)? {
            Outcome::Done => {
                self.pc += 1;
                if self.pc >= self.plan.len() {
                    Ok(Progress::Complete)
                } else {
                    Ok(Progress::Continue)
                }
            }
            Outcome::Retry(prompt) => {
                self.pending = Some(prompt.clone());
                Ok(Progress::Suspended(prompt))
            }
            Outcome::Advance(prompt) => {
                self.pc += 1;
                self.pending = Some(prompt.clone());
                Ok(Progress::Suspended(prompt))
            }
        }
    }

    /// Acknowledge the pending prompt
    ///
    /// Returns the acknowledged prompt, or `None` if nothing was pending.
    pub fn resume(&mut self, ledger: &mut Ledger) -> Option<Prompt> {
        let prompt = self.pending.take()?;
        ledger.acknowledge_for(self.active, &prompt);
        Some(prompt)
    }
}

/// Executor state an operation may change
struct Turn<'a> {
    held: &'a mut Option<TipHandle>,
    active: &'a mut Instrument,
}

fn pipette<W: Workcell>(cell: &mut W, which: Instrument) -> Result<&mut W::Pipette, RunError> {
    cell.instrument(which).ok_or(RunError::NoInstrument(which))
}

fn perform<W: Workcell>(
    op: &Op,
    turn: &mut Turn<'_>,
    cell: &mut W,
    ledger: &mut Ledger,
) -> Result<Outcome, RunError> {
    let active = *turn.active;
    match op {
        Op::Select(which) => {
            if turn.held.is_some() {
                return Err(RunError::TipStillHeld);
            }
            pipette(cell, *which)?;
            *turn.active = *which;
        }
        Op::FlowRates(rates) => pipette(cell, active)?.set_flow_rates(*rates),
        Op::PickUpTip { explicit } => {
            let tips = ledger
                .tips_for(active)
                .ok_or(RunError::NoInstrument(active))?;
            match tips.acquire(pipette(cell, active)?, *explicit)? {
                Acquired::Tip(tip) => *turn.held = Some(tip),
                Acquired::Suspended(prompt) => return Ok(Outcome::Retry(prompt)),
            }
        }
        Op::ReleaseTip { park } => {
            let tip = turn.held.take().ok_or(RunError::NoTipHeld)?;
            let tips = ledger
                .tips_for(active)
                .ok_or(RunError::NoInstrument(active))?;
            if let Released::Suspended(prompt) = tips.release(pipette(cell, active)?, tip, *park)? {
                return Ok(Outcome::Advance(prompt));
            }
        }
        Op::VoidResidual { at } => {
            let pip = pipette(cell, active)?;
            let residual = pip.current_volume();
            if residual > 0.0 {
                pip.dispense(residual, *at, 1.0)?;
            }
        }
        Op::Aspirate { volume, at, rate } => pipette(cell, active)?.aspirate(*volume, *at, *rate)?,
        Op::Dispense { volume, at, rate } => pipette(cell, active)?.dispense(*volume, *at, *rate)?,
        Op::DispenseAll { at, rate } => pipette(cell, active)?.dispense_all(*at, *rate)?,
        Op::AirGap(volume) => pipette(cell, active)?.air_gap(*volume)?,
        Op::BlowOut(at) => pipette(cell, active)?.blow_out(*at)?,
        Op::MoveTo(at) => pipette(cell, active)?.move_to(*at)?,
        Op::Mix { reps, volume, at } => pipette(cell, active)?.mix(*reps, *volume, *at)?,
        Op::TouchTip => pipette(cell, active)?.touch_tip()?,
        Op::Resuspend {
            well,
            reference_ul,
            reps,
        } => ResuspensionMotion::new(*well).execute(pipette(cell, active)?, *reference_ul, *reps)?,
        Op::TrackWaste(volume) => {
            if ledger.waste.track(*volume) == Tracked::Full {
                return Ok(Outcome::Advance(Prompt::EmptyLiquidWaste));
            }
        }
        Op::DisengageIfEngaged => {
            let magnet = cell.magnet();
            if magnet.is_engaged() {
                magnet.disengage()?;
            }
        }
        Op::EngageIfDisengaged { height_mm } => {
            let magnet = cell.magnet();
            if !magnet.is_engaged() {
                magnet.engage(*height_mm)?;
            }
        }
        Op::Engage { height_mm } => cell.magnet().engage(*height_mm)?,
        Op::Disengage => cell.magnet().disengage()?,
        Op::Delay { duration, message } => cell
            .operator()
            .delay(*duration, message.as_ref().map(|m| m.as_str())),
        Op::Pause(message) => return Ok(Outcome::Advance(Prompt::Operator(message.clone()))),
        Op::Comment(text) => cell.operator().comment(text),
        Op::Light(on) => cell.operator().set_indicator_light(*on),
        Op::BlockTemperature {
            celsius,
            hold,
            ramp_rate,
        } => cell
            .thermocycler()
            .set_block_temperature(*celsius, *hold, *ramp_rate)?,
        Op::LidTemperature(celsius) => cell.thermocycler().set_lid_temperature(*celsius)?,
        Op::DeactivateLid => cell.thermocycler().deactivate_lid()?,
        Op::OpenLid => cell.thermocycler().open_lid()?,
        Op::CloseLid => cell.thermocycler().close_lid()?,
    }
    Ok(Outcome::Done)
}
