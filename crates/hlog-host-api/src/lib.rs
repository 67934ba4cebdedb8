//! Host API: the boundary between the audit/automation engine and the game
//! client it runs inside.
//!
//! The host owns the world model, the chat channel and the event hooks. This
//! crate only describes what the engine reads from the host (a snapshot of
//! players and the local player) and what it asks the host to do (send a chat
//! command, show a message, freeze movement).

use hlog_types::{BlockPos, ColorRgba, Vec3};
use uuid::Uuid;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A player entity visible to the client, as seen on the current frame.
#[derive(Debug, Clone)]
pub struct PlayerView {
    /// Runtime entity id (what break-animation packets refer to).
    pub entity_id: i32,
    pub uuid: Uuid,
    pub name: String,
    /// Feet position.
    pub position: Vec3,
    pub eye_height: f64,
    /// Look direction; not necessarily normalized.
    pub look: Vec3,
    /// Registry id of the block the held item places, if any.
    pub held_block: Option<String>,
}

impl PlayerView {
    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y + self.eye_height,
            self.position.z,
        )
    }
}

/// The player the client controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPlayer {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl LocalPlayer {
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::from_vec3(&self.position)
    }
}

/// A block state as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    /// Registry id, e.g. `minecraft:stone`. `"unknown"` when unresolvable.
    pub block_id: String,
    pub meta: u8,
    /// Air or a replaceable material (tall grass, water, ...).
    pub replaceable: bool,
}

impl BlockState {
    pub fn new(block_id: impl Into<String>, meta: u8, replaceable: bool) -> Self {
        Self {
            block_id: block_id.into(),
            meta,
            replaceable,
        }
    }

    pub fn air() -> Self {
        Self::new("minecraft:air", 0, true)
    }

    pub fn unknown() -> Self {
        Self::new("unknown", 0, false)
    }
}

/// Phase of a client tick notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Start,
    End,
}

/// Severity of a client-side feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Failure,
}

/// An axis-aligned box in block space for the highlight renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightBox {
    pub min: Vec3,
    pub max: Vec3,
    pub color: ColorRgba,
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Notifications the host delivers on its main thread.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A block is about to change from `old` to `new`.
    BlockChange {
        pos: BlockPos,
        old: BlockState,
        new: BlockState,
        /// False for bulk updates where placer guessing is too noisy.
        allow_heuristic: bool,
    },
    /// Break-animation progress; `-1` means the break finished.
    BreakAnimation {
        pos: BlockPos,
        breaker_entity_id: i32,
        progress: i32,
    },
    /// An incoming chat line, formatting codes already stripped.
    ChatReceived { text: String },
    Tick { phase: TickPhase },
}

// ─── Client API ──────────────────────────────────────────────────────────────

/// Access to the host client, passed to handlers during callbacks.
///
/// Read methods return a snapshot of live state and must be called on the
/// host's main thread. Write methods are fire-and-forget.
pub trait ClientApi {
    // --- World reads ---
    /// Whether the client is in the context auditing applies to.
    fn in_target_context(&self) -> bool;
    fn dimension(&self) -> Option<i32>;
    fn players(&self) -> Vec<PlayerView>;
    fn player_by_entity_id(&self, entity_id: i32) -> Option<PlayerView> {
        self.players()
            .into_iter()
            .find(|p| p.entity_id == entity_id)
    }
    fn local_player(&self) -> Option<LocalPlayer>;

    // --- Outbound effects ---
    /// Send a line on the chat/command channel as if the user typed it.
    fn send_chat_command(&mut self, text: &str);
    /// Show a client-side-only message to the user.
    fn show_message(&mut self, level: MessageLevel, text: &str);
    /// Release movement keys and zero the local player's velocity.
    fn freeze_movement(&mut self);
    fn set_rotation(&mut self, yaw: f32, pitch: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        players: Vec<PlayerView>,
    }

    impl ClientApi for Stub {
        fn in_target_context(&self) -> bool {
            true
        }
        fn dimension(&self) -> Option<i32> {
            None
        }
        fn players(&self) -> Vec<PlayerView> {
            self.players.clone()
        }
        fn local_player(&self) -> Option<LocalPlayer> {
            None
        }
        fn send_chat_command(&mut self, _text: &str) {}
        fn show_message(&mut self, _level: MessageLevel, _text: &str) {}
        fn freeze_movement(&mut self) {}
        fn set_rotation(&mut self, _yaw: f32, _pitch: f32) {}
    }

    fn player(entity_id: i32, name: &str) -> PlayerView {
        PlayerView {
            entity_id,
            uuid: Uuid::nil(),
            name: name.into(),
            position: Vec3::new(0.0, 64.0, 0.0),
            eye_height: 1.62,
            look: Vec3::new(0.0, 0.0, 1.0),
            held_block: None,
        }
    }

    #[test]
    fn eye_position_adds_height() {
        let p = player(1, "Alice");
        assert_eq!(p.eye_position(), Vec3::new(0.0, 65.62, 0.0));
    }

    #[test]
    fn default_entity_lookup() {
        let stub = Stub {
            players: vec![player(1, "Alice"), player(7, "Bob")],
        };
        assert_eq!(stub.player_by_entity_id(7).unwrap().name, "Bob");
        assert!(stub.player_by_entity_id(3).is_none());
    }

    #[test]
    fn local_player_block_pos() {
        let lp = LocalPlayer {
            position: Vec3::new(-0.5, 64.0, 10.99),
            yaw: 0.0,
            pitch: 0.0,
        };
        assert_eq!(lp.block_pos(), BlockPos::new(-1, 64, 10));
    }
}
