//! Compiled step plans
//!
//! A step is compiled into a flat list of primitive operations before it
//! runs. The executor walks the list one operation at a time, so the index
//! into the list is the exact point a suspended run resumes from.

use alloc::vec::Vec;
use core::time::Duration;

use crate::labware::{Location, WellRef};
use crate::state::Message;
use crate::traits::{FlowRates, Instrument};

/// Phase of a step an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Magnet or flow-rate preparation
    Setup,
    /// Liquid into the sample wells
    AddLiquid,
    /// Pellet resuspension or bead mixing
    Resuspend,
    /// Waiting on the magnet
    Settle,
    /// Supernatant to liquid waste
    RemoveSupernatant,
    /// Timed mixing rounds
    Mix,
    /// Eluate to the elution plate
    Elute,
    /// Thermocycler control
    Thermocycle,
    /// Pause, delay, comment or light
    Operator,
}

/// Primitive operation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Op {
    /// Route the following pipette operations to this instrument
    Select(Instrument),
    /// Replace the pipette's flow rates
    FlowRates(FlowRates),
    /// Pick up a tip, counted unless `explicit` is given
    PickUpTip { explicit: Option<WellRef> },
    /// Drop the held tip at `park`, or in the trash
    ReleaseTip { park: Option<WellRef> },
    /// Dispense anything left in the tip at `at`
    VoidResidual { at: Location },
    Aspirate { volume: f32, at: Location, rate: f32 },
    Dispense { volume: f32, at: Location, rate: f32 },
    DispenseAll { at: Location, rate: f32 },
    AirGap(f32),
    BlowOut(Location),
    MoveTo(Location),
    Mix { reps: u8, volume: f32, at: Location },
    TouchTip,
    /// Run the resuspension pattern in `well`
    Resuspend { well: WellRef, reference_ul: f32, reps: u8 },
    /// Account for a transfer into liquid waste
    TrackWaste(f32),
    DisengageIfEngaged,
    EngageIfDisengaged { height_mm: f32 },
    Engage { height_mm: f32 },
    Disengage,
    Delay { duration: Duration, message: Option<Message> },
    /// Operator pause; suspends the run
    Pause(Message),
    Comment(Message),
    Light(bool),
    BlockTemperature { celsius: f32, hold: Option<Duration>, ramp_rate: Option<f32> },
    LidTemperature(f32),
    DeactivateLid,
    OpenLid,
    CloseLid,
}

/// Operation tagged with its stage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlannedOp {
    pub stage: Stage,
    pub op: Op,
}

/// Ordered list of operations for one step
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    ops: Vec<PlannedOp>,
    stage: Stage,
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

impl Plan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            stage: Stage::Setup,
        }
    }

    /// Stage assigned to subsequently pushed operations
    pub fn stage(&mut self, stage: Stage) -> &mut Self {
        self.stage = stage;
        self
    }

    /// Append an operation in the current stage
    pub fn push(&mut self, op: Op) -> &mut Self {
        self.ops.push(PlannedOp {
            stage: self.stage,
            op,
        });
        self
    }

    /// Append another plan, keeping its stages
    pub fn append(&mut self, mut other: Plan) -> &mut Self {
        self.ops.append(&mut other.ops);
        self
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the plan is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation at `index`
    pub fn get(&self, index: usize) -> Option<&PlannedOp> {
        self.ops.get(index)
    }

    /// All operations in order
    pub fn ops(&self) -> &[PlannedOp] {
        &self.ops
    }

    /// Iterate over the bare operations
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter().map(|planned| &planned.op)
    }

    /// Count operations matching `pred`
    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.iter().filter(|op| pred(op)).count()
    }
}
