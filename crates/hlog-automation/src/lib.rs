//! Scripted automation of an in-game region-editing tool over chat commands.
//!
//! A job teleports to each selection corner, selects it, waits for the tool
//! to confirm the selection in chat (retrying a corner that lands on the wrong
//! block), applies the operation, returns the player and clears the selection.

pub mod coords;
pub mod engine;
pub mod job;

pub use coords::{match_confirmation, parse_coords, CoordPattern, Corner, ParsedCoords};
pub use engine::{StartError, WorkflowEngine, WorkflowError};
pub use job::{Job, JobRequest, Operation, Step};
