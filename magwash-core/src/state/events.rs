//! Events that trigger state transitions

use super::machine::ErrorKind;
use super::prompt::PromptKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Execution control events
    /// Begin the first step
    Start,

    // Operator events
    /// Run needs the operator
    Suspend(PromptKind),
    /// Operator acknowledged the prompt
    Acknowledge,

    // Runner events
    /// Current step's plan ran to the end
    StepFinished,
    /// Move to next step
    NextStep,
    /// All steps in the recipe completed
    RecipeFinished,

    // Fault events
    /// Driver or configuration fault
    ErrorDetected(ErrorKind),
}

impl Event {
    /// Check if this event comes from the operator
    pub fn is_operator_event(&self) -> bool {
        matches!(self, Event::Start | Event::Acknowledge)
    }

    /// Check if this event comes from the runner
    pub fn is_runner_event(&self) -> bool {
        matches!(
            self,
            Event::Suspend(_) | Event::StepFinished | Event::NextStep | Event::RecipeFinished
        )
    }

    /// Check if this event indicates an error
    pub fn is_error_event(&self) -> bool {
        matches!(self, Event::ErrorDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_events() {
        assert!(Event::Start.is_operator_event());
        assert!(Event::Acknowledge.is_operator_event());
        assert!(!Event::StepFinished.is_operator_event());
        assert!(!Event::ErrorDetected(ErrorKind::Pipette).is_operator_event());
    }

    #[test]
    fn test_runner_events() {
        assert!(Event::Suspend(PromptKind::EmptyLiquidWaste).is_runner_event());
        assert!(Event::RecipeFinished.is_runner_event());
        assert!(!Event::Start.is_runner_event());
    }

    #[test]
    fn test_error_events() {
        assert!(Event::ErrorDetected(ErrorKind::Config).is_error_event());
        assert!(!Event::Acknowledge.is_error_event());
    }
}
