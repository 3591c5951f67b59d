//! Simulated deck
//!
//! Models enough of a liquid handler to catch protocol mistakes: tips must
//! be attached before liquid handling, the tip never holds more than its
//! capacity, and the thermocycler rejects out-of-range targets. Every call
//! is appended to a [`Journal`].

pub mod deck;
pub mod journal;
pub mod pipette;
pub mod thermocycler;

pub use deck::{SimConfig, SimDeck};
pub use journal::{Entry, Journal};
pub use pipette::TipModel;
pub use thermocycler::{ThermocyclerLimits, ThermocyclerModel};
