//! Step scheduler
//!
//! Compiles recipe steps into plans of primitive operations and executes
//! them one operation at a time.

pub mod bind;
pub mod context;
pub mod elute;
pub mod error;
pub mod executor;
pub mod mixing;
pub mod plan;
pub mod prompt;
pub mod removal;
pub mod split;
pub mod wash;

pub use bind::{plan_bind, BindParams};
pub use context::{check_sources, PlanContext};
pub use elute::{plan_elute, EluteParams};
pub use error::RunError;
pub use executor::{Executor, Progress};
pub use mixing::{plan_mix_round, MixRoundParams};
pub use plan::{Op, Plan, PlannedOp, Stage};
pub use prompt::{run_plan, serve_prompt};
pub use removal::{plan_removal, RemovalParams};
pub use split::{source_index, split_volume, Split};
pub use wash::{plan_wash, WashParams};
