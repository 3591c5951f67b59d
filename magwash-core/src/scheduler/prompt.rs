//! Serving operator prompts
//!
//! The operator is alerted by switching the deck light off for the length
//! of the pause. For trash and liquid waste the pipette homes first so the
//! operator can reach the deck.

use alloc::string::ToString;

use super::error::RunError;
use super::executor::{Executor, Progress};
use crate::inventory::Ledger;
use crate::state::Prompt;
use crate::traits::{Operator, Pipette, Workcell};

/// Show `prompt` to the operator and block until they acknowledge it
pub fn serve_prompt<W: Workcell>(cell: &mut W, prompt: &Prompt) -> Result<(), RunError> {
    if prompt.homes_pipette() {
        cell.pipette().home()?;
    }
    let operator = cell.operator();
    operator.set_indicator_light(false);
    operator.pause(&prompt.to_string());
    operator.set_indicator_light(true);
    Ok(())
}

/// Run a plan to completion, serving prompts as they come up
///
/// Returns the number of prompts served.
pub fn run_plan<W: Workcell>(
    executor: &mut Executor,
    cell: &mut W,
    ledger: &mut Ledger,
) -> Result<usize, RunError> {
    let mut served = 0;
    loop {
        match executor.step(cell, ledger)? {
            Progress::Continue => {}
            Progress::Suspended(prompt) => {
                serve_prompt(cell, &prompt)?;
                executor.resume(ledger);
                served += 1;
            }
            Progress::Complete => return Ok(served),
        }
    }
}
