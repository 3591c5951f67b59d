//! Run file loading and parsing
//!
//! A run file is TOML. It describes the pipette and modules, where the
//! labware sits on the deck, which reservoir columns hold which reagent,
//! and the recipe as a list of `[[step]]` tables.

pub mod loader;
pub mod schema;

pub use loader::{load, log_config_summary, RunSetup};
