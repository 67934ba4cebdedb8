//! Scenario replay: a scripted stand-in for the game client.
//!
//! A scenario is a JSON-lines file. Each line is one step tagged by `op`;
//! blank lines and lines starting with `#` are skipped. With the server
//! simulation on, `/tp` moves the local player and `//pos1`/`//pos2` echo the
//! selection back as chat the way the region tool does.

use std::collections::VecDeque;
use std::path::Path;

use hlog_audit::now_ms;
use hlog_host_api::{BlockState, ClientApi, ClientEvent, LocalPlayer, MessageLevel, PlayerView, TickPhase};
use hlog_types::{BlockPos, Vec3};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::HousingLogs;
use crate::error::ClientError;

/// Milliseconds of virtual time per client tick.
pub const TICK_MS: u64 = 50;

// ─── Scenario format ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScenarioStep {
    Context {
        in_housing: bool,
    },
    Dimension {
        id: Option<i32>,
    },
    Players {
        players: Vec<ScriptedPlayer>,
    },
    LocalPlayer {
        x: f64,
        y: f64,
        z: f64,
        #[serde(default)]
        yaw: f32,
        #[serde(default)]
        pitch: f32,
    },
    BlockChange {
        pos: [i32; 3],
        old: ScriptedBlock,
        new: ScriptedBlock,
        #[serde(default = "default_true")]
        allow_heuristic: bool,
    },
    BreakAnimation {
        pos: [i32; 3],
        entity_id: i32,
        progress: i32,
    },
    Chat {
        text: String,
    },
    Tick {
        #[serde(default = "default_one")]
        count: u32,
    },
    /// Advance the clock without ticking.
    Wait {
        ms: u64,
    },
    Command {
        line: String,
    },
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

fn default_eye_height() -> f64 {
    1.62
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedPlayer {
    pub entity_id: i32,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub pos: [f64; 3],
    #[serde(default = "default_eye_height")]
    pub eye_height: f64,
    pub look: [f64; 3],
    #[serde(default)]
    pub held_block: Option<String>,
}

impl ScriptedPlayer {
    fn to_view(&self) -> PlayerView {
        PlayerView {
            entity_id: self.entity_id,
            uuid: self.uuid.unwrap_or_else(Uuid::new_v4),
            name: self.name.clone(),
            position: Vec3::new(self.pos[0], self.pos[1], self.pos[2]),
            eye_height: self.eye_height,
            look: Vec3::new(self.look[0], self.look[1], self.look[2]),
            held_block: self.held_block.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedBlock {
    pub id: String,
    #[serde(default)]
    pub meta: u8,
    /// Defaults to true for air.
    #[serde(default)]
    pub replaceable: Option<bool>,
}

impl ScriptedBlock {
    fn to_state(&self) -> BlockState {
        let replaceable = self
            .replaceable
            .unwrap_or(matches!(self.id.as_str(), "air" | "minecraft:air"));
        BlockState::new(self.id.clone(), self.meta, replaceable)
    }
}

fn block_pos(p: &[i32; 3]) -> BlockPos {
    BlockPos::new(p[0], p[1], p[2])
}

pub fn parse_scenario(text: &str) -> Result<Vec<ScenarioStep>, ClientError> {
    let mut steps = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(line).map_err(|source| ClientError::Scenario {
            line: i + 1,
            source,
        })?;
        steps.push(step);
    }
    Ok(steps)
}

pub fn load_scenario(path: &Path) -> Result<Vec<ScenarioStep>, ClientError> {
    let text = std::fs::read_to_string(path)?;
    parse_scenario(&text)
}

// ─── Scripted host ───────────────────────────────────────────────────────────

pub struct ScriptedHost {
    in_housing: bool,
    dimension: Option<i32>,
    players: Vec<PlayerView>,
    local: Option<LocalPlayer>,
    simulate_server: bool,
    clock_ms: u64,
    /// Chat lines waiting to be delivered after the next tick.
    inbox: VecDeque<String>,
    pub sent: Vec<String>,
    pub messages: Vec<(MessageLevel, String)>,
}

impl ScriptedHost {
    pub fn new(simulate_server: bool) -> Self {
        Self::starting_at(simulate_server, now_ms())
    }

    pub fn starting_at(simulate_server: bool, clock_ms: u64) -> Self {
        Self {
            in_housing: true,
            dimension: Some(0),
            players: Vec::new(),
            local: None,
            simulate_server,
            clock_ms,
            inbox: VecDeque::new(),
            sent: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn has_message(&self, text: &str) -> bool {
        self.messages.iter().any(|(_, t)| t == text)
    }

    /// Apply one step. `Tick` steps run all their ticks immediately.
    pub fn apply(&mut self, ctx: &mut HousingLogs, step: &ScenarioStep) {
        match step {
            ScenarioStep::Context { in_housing } => self.in_housing = *in_housing,
            ScenarioStep::Dimension { id } => self.dimension = *id,
            ScenarioStep::Players { players } => {
                self.players = players.iter().map(ScriptedPlayer::to_view).collect();
            }
            ScenarioStep::LocalPlayer { x, y, z, yaw, pitch } => {
                self.local = Some(LocalPlayer {
                    position: Vec3::new(*x, *y, *z),
                    yaw: *yaw,
                    pitch: *pitch,
                });
            }
            ScenarioStep::BlockChange {
                pos,
                old,
                new,
                allow_heuristic,
            } => {
                let event = ClientEvent::BlockChange {
                    pos: block_pos(pos),
                    old: old.to_state(),
                    new: new.to_state(),
                    allow_heuristic: *allow_heuristic,
                };
                self.deliver(ctx, &event);
            }
            ScenarioStep::BreakAnimation {
                pos,
                entity_id,
                progress,
            } => {
                let event = ClientEvent::BreakAnimation {
                    pos: block_pos(pos),
                    breaker_entity_id: *entity_id,
                    progress: *progress,
                };
                self.deliver(ctx, &event);
            }
            ScenarioStep::Chat { text } => {
                let event = ClientEvent::ChatReceived { text: text.clone() };
                self.deliver(ctx, &event);
            }
            ScenarioStep::Tick { count } => {
                for _ in 0..*count {
                    self.tick(ctx);
                }
            }
            ScenarioStep::Wait { ms } => self.clock_ms += ms,
            ScenarioStep::Command { line } => {
                debug!("> {line}");
                ctx.run_command(line, self);
            }
        }
    }

    /// One client tick, then any chat the simulated server produced.
    pub fn tick(&mut self, ctx: &mut HousingLogs) {
        self.clock_ms += TICK_MS;
        for phase in [TickPhase::Start, TickPhase::End] {
            self.deliver(ctx, &ClientEvent::Tick { phase });
        }
        while let Some(text) = self.inbox.pop_front() {
            self.deliver(ctx, &ClientEvent::ChatReceived { text });
        }
    }

    fn deliver(&mut self, ctx: &mut HousingLogs, event: &ClientEvent) {
        let now = self.clock_ms;
        ctx.handle_event_at(event, self, now);
    }

    fn simulate(&mut self, text: &str) {
        let mut parts = text.split_whitespace();
        match parts.next() {
            Some("/tp") => {
                let coords: Vec<f64> = parts.filter_map(|p| p.parse().ok()).collect();
                match (self.local.as_mut(), coords.as_slice()) {
                    (Some(local), [x, y, z]) => local.position = Vec3::new(*x, *y, *z),
                    _ => warn!("Ignoring malformed teleport: {text}"),
                }
            }
            Some(cmd @ ("//pos1" | "//pos2")) => {
                if let Some(local) = self.local {
                    let p = local.block_pos();
                    let n = &cmd[5..];
                    self.inbox
                        .push_back(format!("Position {n} set to ({}, {}, {})", p.x, p.y, p.z));
                }
            }
            _ => {}
        }
    }
}

impl ClientApi for ScriptedHost {
    fn in_target_context(&self) -> bool {
        self.in_housing
    }

    fn dimension(&self) -> Option<i32> {
        self.dimension
    }

    fn players(&self) -> Vec<PlayerView> {
        self.players.clone()
    }

    fn local_player(&self) -> Option<LocalPlayer> {
        self.local
    }

    fn send_chat_command(&mut self, text: &str) {
        info!("-> {text}");
        self.sent.push(text.to_string());
        if self.simulate_server {
            self.simulate(text);
        }
    }

    fn show_message(&mut self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Failure => warn!("{text}"),
            _ => info!("{text}"),
        }
        self.messages.push((level, text.to_string()));
    }

    fn freeze_movement(&mut self) {}

    fn set_rotation(&mut self, yaw: f32, pitch: f32) {
        if let Some(local) = self.local.as_mut() {
            local.yaw = yaw;
            local.pitch = pitch;
        }
    }
}
