//! Parsing corner-selection confirmations out of chat lines.
//!
//! The editing tool's wording varies, so three coordinate shapes are tried in
//! order and the first one that matches decides the result.

use std::fmt;
use std::sync::LazyLock;

use hlog_types::BlockPos;
use regex::{Captures, Regex};

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((-?[0-9]+)\s*,\s*(-?[0-9]+)\s*,\s*(-?[0-9]+)\)").expect("parenthesized pattern")
});

static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)x\s*[:=]\s*(-?[0-9]+).{0,24}y\s*[:=]\s*(-?[0-9]+).{0,24}z\s*[:=]\s*(-?[0-9]+)")
        .expect("labelled pattern")
});

static BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?[0-9]+)\s*,\s*(-?[0-9]+)\s*,\s*(-?[0-9]+)").expect("bare pattern")
});

/// Which selection corner a command or confirmation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    First,
    Second,
}

impl Corner {
    pub fn index(&self) -> usize {
        match self {
            Corner::First => 0,
            Corner::Second => 1,
        }
    }

    /// Short label used in commands and messages: `pos1` / `pos2`.
    pub fn label(&self) -> &'static str {
        match self {
            Corner::First => "pos1",
            Corner::Second => "pos2",
        }
    }

    /// The selection command sent to the editing tool.
    pub fn select_command(&self) -> String {
        format!("//{}", self.label())
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Corner::First => &["pos1", "first position", "position 1"],
            Corner::Second => &["pos2", "second position", "position 2"],
        }
    }

    /// Case-insensitive check for any of this corner's keywords.
    pub fn mentioned_in(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords().iter().any(|k| lower.contains(k))
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The shape a coordinate triple was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordPattern {
    /// `(x, y, z)`
    Parenthesized,
    /// `x: 1 y: 2 z: 3` (also `=`)
    Labelled,
    /// `x, y, z`
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCoords {
    pub pos: BlockPos,
    pub pattern: CoordPattern,
}

/// Find the first coordinate triple in `text`. A triple whose numbers do not
/// fit an `i32` yields `None` without trying the later shapes.
pub fn parse_coords(text: &str) -> Option<ParsedCoords> {
    let chain: [(&Regex, CoordPattern); 3] = [
        (&PARENTHESIZED, CoordPattern::Parenthesized),
        (&LABELLED, CoordPattern::Labelled),
        (&BARE, CoordPattern::Bare),
    ];
    let (caps, pattern) = chain
        .iter()
        .find_map(|(re, pattern)| re.captures(text).map(|c| (c, *pattern)))?;
    Some(ParsedCoords {
        pos: block_pos(&caps)?,
        pattern,
    })
}

fn block_pos(caps: &Captures<'_>) -> Option<BlockPos> {
    let axis = |i: usize| caps.get(i)?.as_str().parse::<i32>().ok();
    Some(BlockPos::new(axis(1)?, axis(2)?, axis(3)?))
}

/// Coordinates confirmed for `corner`, if `text` is a confirmation for it.
pub fn match_confirmation(text: &str, corner: Corner) -> Option<BlockPos> {
    if !corner.mentioned_in(text) {
        return None;
    }
    parse_coords(text).map(|p| p.pos)
}
