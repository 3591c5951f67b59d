//! Configuration types
//!
//! Run configuration and deck layout, validated before any hardware moves.

pub mod deck;
pub mod error;
pub mod types;

pub use deck::*;
pub use error::ConfigError;
pub use types::*;
