//! State machine for recipe execution
//!
//! Defines the externally visible behavior of a run. The state machine is
//! explicit, finite, and deterministic.

pub mod events;
pub mod machine;
pub mod prompt;

pub use events::Event;
pub use machine::{ErrorKind, State};
pub use prompt::{message, truncated, Message, Prompt, PromptKind};
