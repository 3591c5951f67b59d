//! Recipe execution
//!
//! Walks the compiled steps of a recipe and reports state machine events.
//! Every step is compiled when the runner is built, so a bad parameter is
//! reported before anything moves. Steps advance automatically; the only
//! thing that stops a run is an operator prompt or a driver fault.

use alloc::vec::Vec;
use core::mem;

use super::{Label, Recipe};
use crate::config::ConfigError;
use crate::inventory::Ledger;
use crate::scheduler::{serve_prompt, Executor, Plan, PlanContext, Progress, RunError};
use crate::state::{Event, Prompt, State};
use crate::traits::Workcell;

#[derive(Debug, Clone)]
struct CompiledStep {
    label: Label,
    plan: Plan,
}

/// Step-by-step recipe executor
#[derive(Debug, Clone)]
pub struct RecipeRunner {
    steps: Vec<CompiledStep>,
    index: usize,
    executor: Option<Executor>,
    state: State,
}

impl RecipeRunner {
    /// Compile every step of `recipe`
    pub fn new(recipe: &Recipe, ctx: &PlanContext<'_>) -> Result<Self, ConfigError> {
        let steps = recipe
            .steps()
            .iter()
            .map(|entry| {
                Ok(CompiledStep {
                    label: entry.label.clone(),
                    plan: entry.step.plan(ctx)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            steps,
            index: 0,
            executor: None,
            state: State::Idle,
        })
    }

    /// Current run state
    pub fn state(&self) -> State {
        self.state
    }

    /// Index of the current step
    pub fn step_index(&self) -> usize {
        self.index
    }

    /// Number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Label of the current step
    pub fn current_label(&self) -> Option<&str> {
        self.steps.get(self.index).map(|s| s.label.as_str())
    }

    /// Operations done and total in the current step
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.executor.as_ref().map(|e| (e.position(), e.len()))
    }

    /// Prompt awaiting acknowledgement
    pub fn pending(&self) -> Option<&Prompt> {
        self.executor.as_ref().and_then(|e| e.pending())
    }

    fn apply(&mut self, event: Event) -> Option<Event> {
        self.state = self.state.transition(event);
        Some(event)
    }

    fn load(&mut self, index: usize) {
        self.index = index;
        self.executor = self
            .steps
            .get_mut(index)
            .map(|step| Executor::new(mem::take(&mut step.plan)));
    }

    /// Begin the first step
    ///
    /// Returns `None` unless the runner is idle.
    pub fn start(&mut self) -> Option<Event> {
        if self.state != State::Idle {
            return None;
        }
        if self.steps.is_empty() {
            return self.apply(Event::RecipeFinished);
        }
        self.load(0);
        self.apply(Event::Start)
    }

    /// Do one unit of work
    ///
    /// While running this performs one operation. After a step completes
    /// it moves to the next step. Returns the event that changed the
    /// state, if any. A fault moves the runner to `Error` before the error
    /// is returned.
    pub fn advance<W: Workcell>(
        &mut self,
        cell: &mut W,
        ledger: &mut Ledger,
    ) -> Result<Option<Event>, RunError> {
        match self.state {
            State::Running => {
                let Some(executor) = self.executor.as_mut() else {
                    return Ok(self.apply(Event::StepFinished));
                };
                match executor.step(cell, ledger) {
                    Ok(Progress::Continue) => Ok(None),
                    Ok(Progress::Suspended(prompt)) => Ok(self.apply(Event::Suspend(prompt.kind()))),
                    Ok(Progress::Complete) => Ok(self.apply(Event::StepFinished)),
                    Err(e) => {
                        self.apply(Event::ErrorDetected(e.kind()));
                        Err(e)
                    }
                }
            }
            State::StepComplete => {
                let next = self.index + 1;
                if next < self.steps.len() {
                    self.load(next);
                    Ok(self.apply(Event::NextStep))
                } else {
                    self.executor = None;
                    Ok(self.apply(Event::RecipeFinished))
                }
            }
            _ => Ok(None),
        }
    }

    /// Acknowledge the pending prompt
    ///
    /// Applies the acknowledgement to the ledger and returns the prompt.
    pub fn acknowledge(&mut self, ledger: &mut Ledger) -> Option<Prompt> {
        if !self.state.awaiting_operator() {
            return None;
        }
        let prompt = self.executor.as_mut()?.resume(ledger)?;
        self.apply(Event::Acknowledge);
        Some(prompt)
    }

    /// Run to the end, serving prompts on the workcell's operator
    ///
    /// Returns the number of prompts served.
    pub fn run<W: Workcell>(&mut self, cell: &mut W, ledger: &mut Ledger) -> Result<usize, RunError> {
        self.start();
        let mut served = 0;
        while !self.state.is_terminal() {
            self.advance(cell, ledger)?;
            if let Some(prompt) = self.pending().cloned() {
                serve_prompt(cell, &prompt)?;
                self.acknowledge(ledger);
                served += 1;
            }
        }
        Ok(served)
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::config::{ConfigError, RunConfig};
    use crate::labware::{LabwareId, WellRef};
    use crate::recipe::Step;
    use crate::scheduler::{MixRoundParams, WashParams};
    use crate::state::{message, ErrorKind, PromptKind};
    use crate::testing::{deck, Call, MockDeck};
    use crate::traits::PipetteError;

    fn ledger() -> Ledger {
        Ledger::from_config(&RunConfig::default(), &deck()).unwrap()
    }

    #[test]
    fn test_empty_recipe_finishes_immediately() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut runner = RecipeRunner::new(&Recipe::new(), &ctx).unwrap();

        assert_eq!(runner.start(), Some(Event::RecipeFinished));
        assert_eq!(runner.state(), State::RecipeComplete);
    }

    #[test]
    fn test_bad_step_rejected_before_motion() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut recipe = Recipe::new();
        recipe.push_step(Step::Disengage).push_step(Step::MixRound(MixRoundParams {
            volume_ul: -1.0,
            reps: 3,
            park: false,
            return_tip: false,
            touch_tip: false,
        }));

        assert_eq!(
            RecipeRunner::new(&recipe, &ctx).unwrap_err(),
            ConfigError::InvalidVolume
        );
    }

    #[test]
    fn test_steps_advance_in_order() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut recipe = Recipe::new();
        recipe
            .push("lid", Step::CloseLid)
            .push("magnet", Step::Engage { height_mm: None });
        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut cell = MockDeck::new(8);
        let mut ledger = ledger();

        assert_eq!(runner.start(), Some(Event::Start));
        assert_eq!(runner.current_label(), Some("lid"));
        assert_eq!(runner.progress(), Some((0, 1)));

        assert_eq!(runner.advance(&mut cell, &mut ledger), Ok(Some(Event::StepFinished)));
        assert_eq!(runner.state(), State::StepComplete);
        assert_eq!(runner.advance(&mut cell, &mut ledger), Ok(Some(Event::NextStep)));
        assert_eq!(runner.step_index(), 1);
        assert_eq!(runner.current_label(), Some("magnet"));
        assert_eq!(runner.advance(&mut cell, &mut ledger), Ok(Some(Event::StepFinished)));
        assert_eq!(runner.advance(&mut cell, &mut ledger), Ok(Some(Event::RecipeFinished)));
        assert_eq!(runner.state(), State::RecipeComplete);
        assert_eq!(runner.advance(&mut cell, &mut ledger), Ok(None));

        assert_eq!(cell.calls(), &[Call::CloseLid, Call::Engage(6.5)]);
    }

    #[test]
    fn test_pause_suspends_until_acknowledged() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut recipe = Recipe::new();
        recipe
            .push_step(Step::Pause(message("Add DNase by hand")))
            .push_step(Step::Delay {
                duration: Duration::from_secs(600),
                message: None,
            });
        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut cell = MockDeck::new(8);
        let mut ledger = ledger();

        runner.start();
        assert_eq!(
            runner.advance(&mut cell, &mut ledger),
            Ok(Some(Event::Suspend(PromptKind::Operator)))
        );
        assert!(runner.state().awaiting_operator());

        // nothing moves while suspended
        assert_eq!(runner.advance(&mut cell, &mut ledger), Ok(None));
        assert!(cell.calls().is_empty());

        assert_eq!(
            runner.acknowledge(&mut ledger),
            Some(Prompt::Operator(message("Add DNase by hand")))
        );
        assert_eq!(runner.state(), State::Running);
        assert_eq!(runner.acknowledge(&mut ledger), None);
    }

    #[test]
    fn test_driver_fault_moves_to_error() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut recipe = Recipe::new();
        recipe.push_step(Step::Wash(
            WashParams::new(100.0, &[WellRef::first(LabwareId(5))]).unwrap(),
        ));
        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut cell = MockDeck::new(8);
        cell.pipette.fail_next = Some(PipetteError::Fault);
        let mut ledger = ledger();

        assert_eq!(
            runner.run(&mut cell, &mut ledger),
            Err(RunError::Pipette(PipetteError::Fault))
        );
        assert_eq!(runner.state(), State::Error(ErrorKind::Pipette));
    }

    #[test]
    fn test_run_serves_prompts() {
        let config = RunConfig::default();
        let layout = deck();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut recipe = Recipe::new();
        recipe
            .push_step(Step::Pause(message("Load the plate")))
            .push_step(Step::Wash(
                WashParams::new(150.0, &[WellRef::first(LabwareId(5))]).unwrap(),
            ))
            .push_step(Step::Pause(message("Done")));
        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut cell = MockDeck::new(8);
        let mut ledger = ledger();

        assert_eq!(runner.run(&mut cell, &mut ledger), Ok(2));
        assert_eq!(runner.state(), State::RecipeComplete);
        assert_eq!(cell.paused, ["Load the plate", "Done"]);
        // wash tip plus removal tip
        assert_eq!(ledger.tips.count(), 2);
        assert_eq!(ledger.waste.accumulated(), 150.0);
    }
}
