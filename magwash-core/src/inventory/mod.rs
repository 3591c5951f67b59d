//! Consumable bookkeeping
//!
//! Tips, tip trash and liquid waste. Exhaustion of any of these is never an
//! error: the operation reports a [`Prompt`](crate::state::Prompt) and the
//! run suspends until the operator acknowledges it.

pub mod ledger;
pub mod tips;
pub mod trash;
pub mod waste;

pub use ledger::Ledger;
pub use tips::{Acquired, Released, TipHandle, TipInventory};
pub use trash::TrashBin;
pub use waste::{Tracked, WasteTracker};
