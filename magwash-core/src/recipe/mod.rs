//! Recipes
//!
//! A recipe is an ordered list of labelled steps. The [`RecipeRunner`]
//! compiles every step up front and then walks them one operation at a
//! time, driving the run state machine.

pub mod runner;
pub mod step;

use alloc::vec::Vec;

use heapless::String;

use crate::config::MAX_LABEL_LEN;
use crate::state::truncated;

pub use runner::RecipeRunner;
pub use step::Step;

/// Step label
pub type Label = String<MAX_LABEL_LEN>;

/// A step with its display label
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecipeStep {
    pub label: Label,
    pub step: Step,
}

/// Ordered list of steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    steps: Vec<RecipeStep>,
}

impl Recipe {
    /// Create an empty recipe
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, truncating the label if needed
    pub fn push(&mut self, label: &str, step: Step) -> &mut Self {
        self.steps.push(RecipeStep {
            label: truncated(label),
            step,
        });
        self
    }

    /// Append a step labelled with its kind
    pub fn push_step(&mut self, step: Step) -> &mut Self {
        let label = step.name();
        self.push(label, step)
    }

    /// Steps in order
    pub fn steps(&self) -> &[RecipeStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the recipe has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
