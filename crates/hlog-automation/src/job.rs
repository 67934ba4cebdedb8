//! The single in-flight automation job and its step table.

use std::fmt;

use hlog_host_api::LocalPlayer;
use hlog_types::BlockPos;

use crate::coords::Corner;

/// Confirm attempts allowed per corner after the first one fails.
pub const POS_RETRY_COUNT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Set a single block: both corners are the same position.
    Set,
    /// Fill the cuboid between two corners.
    Fill,
}

impl Operation {
    /// The user-facing command that starts this kind of job.
    pub fn command_name(&self) -> &'static str {
        match self {
            Operation::Set => "//setblock",
            Operation::Fill => "//fillblocks",
        }
    }

    /// The editing-tool command that applies the operation to the selection.
    pub fn apply_command(&self, block_id: &str) -> String {
        match self {
            Operation::Set => format!("//set {block_id}"),
            Operation::Fill => format!("//fill {block_id}"),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub pos1: BlockPos,
    pub pos2: BlockPos,
    pub block_id: String,
    pub operation: Operation,
}

impl JobRequest {
    pub fn set_block(target: BlockPos, block_id: impl Into<String>) -> Self {
        Self {
            pos1: target,
            pos2: target,
            block_id: block_id.into(),
            operation: Operation::Set,
        }
    }

    pub fn fill(pos1: BlockPos, pos2: BlockPos, block_id: impl Into<String>) -> Self {
        Self {
            pos1,
            pos2,
            block_id: block_id.into(),
            operation: Operation::Fill,
        }
    }

    pub fn target(&self, corner: Corner) -> BlockPos {
        match corner {
            Corner::First => self.pos1,
            Corner::Second => self.pos2,
        }
    }
}

/// Workflow position. The happy path runs top to bottom, once per corner for
/// the first four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Teleport(Corner),
    AwaitArrival(Corner),
    Select(Corner),
    Confirm(Corner),
    Apply,
    Return,
    Deselect,
    Finish,
}

impl Step {
    pub const START: Step = Step::Teleport(Corner::First);

    /// The step that follows this one when it succeeds.
    pub fn next(self) -> Step {
        match self {
            Step::Teleport(c) => Step::AwaitArrival(c),
            Step::AwaitArrival(c) => Step::Select(c),
            Step::Select(c) => Step::Confirm(c),
            Step::Confirm(Corner::First) => Step::Teleport(Corner::Second),
            Step::Confirm(Corner::Second) => Step::Apply,
            Step::Apply => Step::Return,
            Step::Return => Step::Deselect,
            Step::Deselect | Step::Finish => Step::Finish,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Teleport(c) => write!(f, "teleport-{c}"),
            Step::AwaitArrival(c) => write!(f, "await-arrival-{c}"),
            Step::Select(c) => write!(f, "select-{c}"),
            Step::Confirm(c) => write!(f, "confirm-{c}"),
            Step::Apply => f.write_str("apply"),
            Step::Return => f.write_str("return"),
            Step::Deselect => f.write_str("deselect"),
            Step::Finish => f.write_str("finish"),
        }
    }
}

/// State of the wait for a corner-selection acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmState {
    pub pending: Option<Corner>,
    pub ticks_remaining: u32,
    /// A matching confirmation arrived.
    pub ok: bool,
    /// A confirmation arrived for a different block.
    pub bad: bool,
    /// Where the player stood when the select command went out.
    pub player_block_at_send: Option<BlockPos>,
}

impl ConfirmState {
    pub fn begin(corner: Corner, timeout_ticks: u32, player_block: BlockPos) -> Self {
        Self {
            pending: Some(corner),
            ticks_remaining: timeout_ticks,
            ok: false,
            bad: false,
            player_block_at_send: Some(player_block),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub request: JobRequest,
    /// Position and view to restore at the end.
    pub return_to: LocalPlayer,
    pub step: Step,
    pub wait_ticks: u32,
    pub tp_wait_ticks: u32,
    pub confirm: ConfirmState,
    retries: [u32; 2],
}

impl Job {
    pub fn new(request: JobRequest, return_to: LocalPlayer) -> Self {
        Self {
            request,
            return_to,
            step: Step::START,
            wait_ticks: 0,
            tp_wait_ticks: 0,
            confirm: ConfirmState::default(),
            retries: [POS_RETRY_COUNT; 2],
        }
    }

    pub fn target(&self, corner: Corner) -> BlockPos {
        self.request.target(corner)
    }

    pub fn retries_remaining(&self, corner: Corner) -> u32 {
        self.retries[corner.index()]
    }

    /// Use up one retry for `corner`. Returns false when none were left.
    pub fn take_retry(&mut self, corner: Corner) -> bool {
        let slot = &mut self.retries[corner.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}
