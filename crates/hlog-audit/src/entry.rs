//! One audit record and its two on-disk renderings.

use chrono::{Local, TimeZone};
use hlog_types::BlockPos;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribution::{AttributionKind, BlockAction, NearbyPlayer};

/// The text log lists at most this many suspects.
const TEXT_NEARBY_LIMIT: usize = 12;

/// A block id and metadata value as captured at change time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    pub block: String,
    pub meta: u8,
}

/// One structured log line. Optional fields are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub ts_ms: u64,
    pub area: String,
    pub action: BlockAction,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub in_housing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<i32>,
    pub old_block: String,
    pub old_meta: u8,
    pub new_block: String,
    pub new_meta: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub attribution: AttributionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearby_players: Option<Vec<NearbyPlayer>>,
}

impl AuditEntry {
    pub fn pos(&self) -> BlockPos {
        BlockPos::new(self.x, self.y, self.z)
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }

    /// The human-readable line, stamped with local wall-clock time.
    /// Timestamps that do not map to a local time fall back to the JSON form.
    pub fn text_line(&self) -> String {
        match Local.timestamp_millis_opt(self.ts_ms as i64).single() {
            Some(t) => self.format_text(&t.format("%H:%M:%S").to_string()),
            None => self.to_json_line(),
        }
    }

    fn format_text(&self, clock: &str) -> String {
        let mut line = format!(
            "[{clock}] [{}] {} ({},{},{}) {}:{} -> {}:{}",
            self.area,
            self.action,
            self.x,
            self.y,
            self.z,
            self.old_block,
            self.old_meta,
            self.new_block,
            self.new_meta,
        );
        match &self.player_name {
            Some(name) => line.push_str(&format!(" player={name}")),
            None => line.push_str(" player=unknown"),
        }
        if let Some(uuid) = &self.player_uuid {
            line.push_str(&format!(" uuid={uuid}"));
        }
        line.push_str(&format!(" attr={}", self.attribution));

        if let Some(nearby) = self.nearby_players.as_deref().filter(|n| !n.is_empty()) {
            let shown: Vec<String> = nearby
                .iter()
                .take(TEXT_NEARBY_LIMIT)
                .map(|p| {
                    let name = p.name.as_deref().unwrap_or("?");
                    if p.distance >= 0.0 {
                        format!("{name}({:.2})", p.distance)
                    } else {
                        name.to_string()
                    }
                })
                .collect();
            line.push_str(&format!(" nearby=[{}", shown.join(", ")));
            if nearby.len() > TEXT_NEARBY_LIMIT {
                line.push_str(", ...");
            }
            line.push(']');
        }
        line
    }
}
