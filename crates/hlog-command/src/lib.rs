//! Command parsing for `/hlog`, `//setblock` and `//fillblocks`.
//!
//! Parsers turn a typed line into a command value or a validation error.
//! Executing a command is up to whoever owns the registry and the workflow
//! engine; it reports back through [`CommandResult`].

use hlog_types::{BlockPos, ColorError, ColorRgba};
use thiserror::Error;

pub const HLOG_USAGE: &str = "/hlog add <name> <x1> <y1> <z1> <x2> <y2> <z2> [#RRGGBB|#RRGGBBAA] | /hlog remove <name> | /hlog list | /hlog highlight <name> [on|off] | /hlog clear | /hlog on|off | /hlog path";
pub const ADD_USAGE: &str = "/hlog add <name> <x1> <y1> <z1> <x2> <y2> <z2> [#RRGGBB|#RRGGBBAA]";
pub const REMOVE_USAGE: &str = "/hlog remove <name>";
pub const HIGHLIGHT_USAGE: &str = "/hlog highlight <name> [on|off]";
pub const SETBLOCK_USAGE: &str = "//setblock <x> <y> <z> <blockID>";
pub const FILLBLOCKS_USAGE: &str = "//fillblocks <x1> <y1> <z1> <x2> <y2> <z2> <blockID>";

/// A command name and its usage line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Name as registered with the client (one leading `/` already stripped).
    pub name: &'static str,
    pub usage: &'static str,
}

/// Every command this crate parses.
pub const COMMANDS: [CommandSpec; 3] = [
    CommandSpec {
        name: "hlog",
        usage: HLOG_USAGE,
    },
    CommandSpec {
        name: "/setblock",
        usage: SETBLOCK_USAGE,
    },
    CommandSpec {
        name: "/fillblocks",
        usage: FILLBLOCKS_USAGE,
    },
];

/// Result returned by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command executed successfully.
    pub success: bool,
    /// Messages to show the user, in order.
    pub messages: Vec<String>,
}

impl CommandResult {
    /// Create a successful result with a single message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
        }
    }

    /// Create a failed result with a single message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
        }
    }

    pub fn lines(success: bool, messages: Vec<String>) -> Self {
        Self { success, messages }
    }
}

impl From<CommandError> for CommandResult {
    fn from(e: CommandError) -> Self {
        CommandResult::err(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Coordinates must be integers.")]
    NotInteger(String),
    #[error("Invalid color: {0}")]
    InvalidColor(#[from] ColorError),
    #[error("<blockID> cannot be empty.")]
    EmptyBlockId,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// `/hlog` subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditCommand {
    Add {
        name: String,
        a: BlockPos,
        b: BlockPos,
        color: ColorRgba,
    },
    Remove {
        name: String,
    },
    List,
    Clear,
    SetEnabled(bool),
    /// `state: None` toggles.
    Highlight {
        name: String,
        state: Option<bool>,
    },
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationCommand {
    SetBlock {
        target: BlockPos,
        block_id: String,
    },
    FillBlocks {
        pos1: BlockPos,
        pos2: BlockPos,
        block_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Audit(AuditCommand),
    Automation(AutomationCommand),
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse a full chat line such as `/hlog list` or `//setblock 1 2 3 stone`.
pub fn parse_line(line: &str) -> Result<ParsedCommand, CommandError> {
    let trimmed = line.trim();
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let mut parts = body.split_whitespace();
    let name = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    match name.to_lowercase().as_str() {
        "hlog" => parse_hlog(&args).map(ParsedCommand::Audit),
        "/setblock" => parse_setblock(&args).map(ParsedCommand::Automation),
        "/fillblocks" => parse_fillblocks(&args).map(ParsedCommand::Automation),
        _ => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

/// Parse the arguments after `/hlog`.
pub fn parse_hlog(args: &[&str]) -> Result<AuditCommand, CommandError> {
    let Some(sub) = args.first() else {
        return Err(CommandError::Usage(HLOG_USAGE));
    };
    match sub.to_lowercase().as_str() {
        "add" => {
            if args.len() != 8 && args.len() != 9 {
                return Err(CommandError::Usage(ADD_USAGE));
            }
            let a = parse_pos(&args[2..5])?;
            let b = parse_pos(&args[5..8])?;
            let color = match args.get(8) {
                Some(c) => c.parse()?,
                None => ColorRgba::DEFAULT,
            };
            Ok(AuditCommand::Add {
                name: args[1].to_string(),
                a,
                b,
                color,
            })
        }
        "remove" => match args {
            [_, name] => Ok(AuditCommand::Remove {
                name: name.to_string(),
            }),
            _ => Err(CommandError::Usage(REMOVE_USAGE)),
        },
        "list" | "status" => Ok(AuditCommand::List),
        "clear" => Ok(AuditCommand::Clear),
        "on" => Ok(AuditCommand::SetEnabled(true)),
        "off" => Ok(AuditCommand::SetEnabled(false)),
        "highlight" => match args {
            [_, name] => Ok(AuditCommand::Highlight {
                name: name.to_string(),
                state: None,
            }),
            [_, name, state] => {
                let state = match state.to_lowercase().as_str() {
                    "on" => true,
                    "off" => false,
                    _ => return Err(CommandError::Usage(HIGHLIGHT_USAGE)),
                };
                Ok(AuditCommand::Highlight {
                    name: name.to_string(),
                    state: Some(state),
                })
            }
            _ => Err(CommandError::Usage(HIGHLIGHT_USAGE)),
        },
        "path" => Ok(AuditCommand::Path),
        _ => Err(CommandError::Usage(HLOG_USAGE)),
    }
}

/// Parse the arguments after `//setblock`.
pub fn parse_setblock(args: &[&str]) -> Result<AutomationCommand, CommandError> {
    if args.len() != 4 {
        return Err(CommandError::Usage(SETBLOCK_USAGE));
    }
    Ok(AutomationCommand::SetBlock {
        target: parse_pos(&args[0..3])?,
        block_id: parse_block_id(args[3])?,
    })
}

/// Parse the arguments after `//fillblocks`.
pub fn parse_fillblocks(args: &[&str]) -> Result<AutomationCommand, CommandError> {
    if args.len() != 7 {
        return Err(CommandError::Usage(FILLBLOCKS_USAGE));
    }
    Ok(AutomationCommand::FillBlocks {
        pos1: parse_pos(&args[0..3])?,
        pos2: parse_pos(&args[3..6])?,
        block_id: parse_block_id(args[6])?,
    })
}

fn parse_pos(args: &[&str]) -> Result<BlockPos, CommandError> {
    let axis = |s: &str| {
        s.parse::<i32>()
            .map_err(|_| CommandError::NotInteger(s.to_string()))
    };
    Ok(BlockPos::new(axis(args[0])?, axis(args[1])?, axis(args[2])?))
}

fn parse_block_id(s: &str) -> Result<String, CommandError> {
    let id = s.trim();
    if id.is_empty() {
        return Err(CommandError::EmptyBlockId);
    }
    Ok(id.to_string())
}

// ===========================================================================
// Tests
// ===========================================================================
