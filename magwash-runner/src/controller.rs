//! Run controller
//!
//! Owns the recipe runner and the tip/waste ledger for one run. The
//! controller drives the runner one unit at a time, serves prompts on the
//! workcell's operator and logs every state change.

use magwash_core::config::ConfigError;
use magwash_core::inventory::Ledger;
use magwash_core::recipe::RecipeRunner;
use magwash_core::scheduler::{serve_prompt, RunError};
use magwash_core::state::{Event, State};
use magwash_core::traits::Workcell;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::RunSetup;

/// Fault that stopped a run
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("recipe rejected")]
    Config(#[from] ConfigError),

    #[error("step {step} ({label}) failed")]
    Run {
        step: usize,
        label: String,
        #[source]
        source: RunError,
    },
}

/// Totals reported after a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Steps finished
    pub steps: usize,
    /// Operator prompts served
    pub prompts: usize,
    /// Primary pipette tip pick-ups since the racks were last replaced
    pub tips_used: u16,
    /// Tips sitting in the trash, from every pipette
    pub tips_in_trash: u16,
    /// Liquid sent to waste since it was last emptied (µl)
    pub waste_ul: f32,
}

/// Run controller
pub struct Controller {
    runner: RecipeRunner,
    ledger: Ledger,
    steps_done: usize,
    prompts: usize,
}

impl Controller {
    /// Compile the recipe and set up the ledger
    pub fn new(setup: &RunSetup) -> Result<Self, ConfigError> {
        let ctx = setup.context()?;
        Ok(Self {
            runner: RecipeRunner::new(&setup.recipe, &ctx)?,
            ledger: Ledger::from_config(&setup.config, &setup.deck)?,
            steps_done: 0,
            prompts: 0,
        })
    }

    /// Get current run state
    pub fn state(&self) -> State {
        self.runner.state()
    }

    /// Tip and waste bookkeeping
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Current totals
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.steps_done,
            prompts: self.prompts,
            tips_used: self.ledger.tips.count(),
            tips_in_trash: self.ledger.tips_in_trash(),
            waste_ul: self.ledger.waste.accumulated(),
        }
    }

    /// Run the recipe to the end
    pub fn run<W: Workcell>(&mut self, cell: &mut W) -> Result<RunSummary, ControlError> {
        if let Some(event) = self.runner.start() {
            self.handle_event(event);
        }

        while !self.runner.state().is_terminal() {
            match self.runner.advance(cell, &mut self.ledger) {
                Ok(Some(event)) => self.handle_event(event),
                Ok(None) => {}
                Err(e) => return Err(self.failed(e)),
            }

            if let Some(prompt) = self.runner.pending().cloned() {
                info!(kind = ?prompt.kind(), "Operator action needed: {}", prompt);
                if let Err(e) = serve_prompt(cell, &prompt) {
                    return Err(self.failed(e));
                }
                self.runner.acknowledge(&mut self.ledger);
                self.prompts += 1;
                debug!("Prompt acknowledged, resuming");
            }
        }

        let summary = self.summary();
        info!(
            steps = summary.steps,
            prompts = summary.prompts,
            "Recipe complete"
        );
        Ok(summary)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start | Event::NextStep => {
                if let Some((index, total)) = self.runner.progress() {
                    info!(
                        "Step {}/{}: {}",
                        index + 1,
                        total,
                        self.runner.current_label().unwrap_or_default()
                    );
                }
            }
            Event::StepFinished => {
                self.steps_done += 1;
                debug!(
                    tips = self.ledger.tips.count(),
                    trash = self.ledger.tips_in_trash(),
                    waste_ul = self.ledger.waste.accumulated(),
                    "Step finished"
                );
            }
            Event::Suspend(kind) => debug!(?kind, "Run suspended"),
            other => debug!(event = ?other, "State now {:?}", self.runner.state()),
        }
    }

    fn failed(&self, source: RunError) -> ControlError {
        let step = self.runner.step_index() + 1;
        let label = self.runner.current_label().unwrap_or_default().to_string();
        error!(step, %label, error = %source, "Run stopped");
        ControlError::Run {
            step,
            label,
            source,
        }
    }
}
