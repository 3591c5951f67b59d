//! Run state machine
//!
//! The runner's externally visible state is a function of the current state
//! and an event. Hardware calls only happen while `Running`.

use super::events::Event;
use super::prompt::PromptKind;

/// Run states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Recipe loaded, nothing moved yet
    Idle,
    /// Executing the current step
    Running,
    /// Waiting for the operator to act on a prompt
    Suspended(PromptKind),
    /// Current step finished, next one not started
    StepComplete,
    /// All steps finished
    RecipeComplete,
    /// Fault reported; nothing else will run
    Error(ErrorKind),
}

/// Types of errors that stop a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Step parameters or layout rejected
    Config,
    /// Pipette driver reported a fault
    Pipette,
    /// Magnet or thermocycler driver reported a fault
    Module,
    /// Liquid handling planned without a tip on the pipette
    NoTipHeld,
}

impl State {
    /// Check if hardware may move in this state
    pub fn motion_allowed(&self) -> bool {
        matches!(self, State::Running)
    }

    /// Check if the run is waiting on the operator
    pub fn awaiting_operator(&self) -> bool {
        matches!(self, State::Suspended(_))
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::RecipeComplete | State::Error(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Idle transitions
            (Idle, Start) => Running,
            (Idle, RecipeFinished) => RecipeComplete,
            (Idle, ErrorDetected(kind)) => Error(kind),

            // Running transitions
            (Running, Suspend(kind)) => Suspended(kind),
            (Running, StepFinished) => StepComplete,
            (Running, ErrorDetected(kind)) => Error(kind),

            // Suspended transitions
            (Suspended(_), Acknowledge) => Running,
            (Suspended(_), ErrorDetected(kind)) => Error(kind),

            // StepComplete transitions
            (StepComplete, NextStep) => Running,
            (StepComplete, RecipeFinished) => RecipeComplete,
            (StepComplete, ErrorDetected(kind)) => Error(kind),

            // Default: stay in current state; Error and RecipeComplete are final
            _ => self,
        }
    }
}
