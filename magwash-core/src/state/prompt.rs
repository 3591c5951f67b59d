//! Operator prompts
//!
//! A prompt is how a run asks the operator for help: replace tips, empty
//! the trash, empty the liquid waste, or act on a free-form pause message.
//! None of these are errors. The run suspends until the prompt is
//! acknowledged, then continues where it stopped.

use core::fmt;

use heapless::String;

use crate::config::MAX_MESSAGE_LEN;

/// Operator message text
pub type Message = String<MAX_MESSAGE_LEN>;

/// Copy `text` into a fixed-capacity string, truncating at a character
/// boundary if needed
pub fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Build a message, truncating if needed
pub fn message(text: &str) -> Message {
    truncated(text)
}

/// Prompt category, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PromptKind {
    /// Tip racks exhausted
    ReplaceTips,
    /// Tip trash full
    EmptyTrash,
    /// Liquid waste full
    EmptyLiquidWaste,
    /// Recipe-requested pause
    Operator,
}

/// Request for operator action
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prompt {
    /// Every tip slot has been consumed
    ReplaceTips { max_volume_ul: u16 },
    /// Trash drop count reached its threshold
    EmptyTrash,
    /// Liquid waste reached its capacity
    EmptyLiquidWaste,
    /// Free-form pause from the recipe
    Operator(Message),
}

impl Prompt {
    /// Category of this prompt
    pub fn kind(&self) -> PromptKind {
        match self {
            Prompt::ReplaceTips { .. } => PromptKind::ReplaceTips,
            Prompt::EmptyTrash => PromptKind::EmptyTrash,
            Prompt::EmptyLiquidWaste => PromptKind::EmptyLiquidWaste,
            Prompt::Operator(_) => PromptKind::Operator,
        }
    }

    /// Whether the pipette should home before the operator reaches in
    pub fn homes_pipette(&self) -> bool {
        matches!(self, Prompt::EmptyTrash | Prompt::EmptyLiquidWaste)
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::ReplaceTips { max_volume_ul } => {
                write!(f, "Replace {}µl tipracks before resuming.", max_volume_ul)
            }
            Prompt::EmptyTrash => f.write_str("Please empty tips from waste before resuming."),
            Prompt::EmptyLiquidWaste => f.write_str("Please empty liquid waste before resuming."),
            Prompt::Operator(text) => f.write_str(text),
        }
    }
}
