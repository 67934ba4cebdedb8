//! Client glue for the housing block logger: configuration, the event and
//! command context, and a scripted host for replaying recorded sessions.

pub mod config;
pub mod context;
pub mod error;
pub mod replay;

pub use config::ClientConfig;
pub use context::HousingLogs;
pub use error::ClientError;
pub use replay::{load_scenario, parse_scenario, ScenarioStep, ScriptedHost};
