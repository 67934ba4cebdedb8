//! Host hook handlers for block changes and break animations.
//!
//! Everything that reads live world state happens synchronously in the hook.
//! Scoring and log I/O run on the log worker via [`PendingAudit`].

use std::sync::Arc;

use hlog_host_api::{BlockState, ClientApi};
use hlog_types::BlockPos;
use tracing::debug;
use uuid::Uuid;

use crate::attribution::{
    guess_actor, snapshot_candidates, snapshot_nearby, AttributionKind, BlockAction, Candidate,
    NearbyPlayer, RecentBreakers, UNKNOWN_BREAK_NEARBY_RADIUS,
};
use crate::entry::{AuditEntry, BlockSnapshot};
use crate::logger::LogHandle;
use crate::registry::AreaRegistry;

/// Break-animation progress value meaning "finished".
pub const BREAK_COMPLETE: i32 = -1;

/// A block change captured on the hook thread, waiting for scoring.
#[derive(Debug, Clone)]
pub struct PendingAudit {
    pub ts_ms: u64,
    pub pos: BlockPos,
    pub dimension: Option<i32>,
    pub action: BlockAction,
    pub old: BlockSnapshot,
    pub new: BlockSnapshot,
    pub actor: Option<(Uuid, String)>,
    pub attribution: AttributionKind,
    pub candidates: Vec<Candidate>,
    pub nearby: Vec<NearbyPlayer>,
    /// Every enabled area containing `pos`, in registry order.
    pub areas: Vec<String>,
}

impl PendingAudit {
    /// Run the look heuristic if still unattributed and build one entry per
    /// area.
    pub fn resolve(self) -> Vec<AuditEntry> {
        let is_break = self.action == BlockAction::Break;
        let mut actor = self.actor;
        let mut attribution = self.attribution;

        if actor.is_none() {
            if let Some(guess) = guess_actor(&self.pos, &self.candidates, is_break) {
                attribution = guess.kind(is_break);
                actor = Some((guess.uuid, guess.name));
            }
        }

        let nearby = (is_break && actor.is_none() && !self.nearby.is_empty()).then_some(self.nearby);
        let (player_uuid, player_name) = match actor {
            Some((uuid, name)) => (Some(uuid), Some(name)),
            None => (None, None),
        };

        self.areas
            .into_iter()
            .map(|area| AuditEntry {
                ts_ms: self.ts_ms,
                area,
                action: self.action,
                x: self.pos.x,
                y: self.pos.y,
                z: self.pos.z,
                in_housing: true,
                dimension: self.dimension,
                old_block: self.old.block.clone(),
                old_meta: self.old.meta,
                new_block: self.new.block.clone(),
                new_meta: self.new.meta,
                player_uuid,
                player_name: player_name.clone(),
                attribution,
                nearby_players: nearby.clone(),
            })
            .collect()
    }
}

pub struct BlockAuditor {
    registry: Arc<AreaRegistry>,
    breakers: RecentBreakers,
    log: LogHandle,
}

impl BlockAuditor {
    pub fn new(registry: Arc<AreaRegistry>, log: LogHandle) -> Self {
        Self {
            registry,
            breakers: RecentBreakers::new(),
            log,
        }
    }

    pub fn registry(&self) -> &Arc<AreaRegistry> {
        &self.registry
    }

    pub fn breakers(&self) -> &RecentBreakers {
        &self.breakers
    }

    /// Remember who finished breaking the block at `pos`.
    pub fn note_break_animation(
        &self,
        api: &dyn ClientApi,
        pos: BlockPos,
        breaker_entity_id: i32,
        progress: i32,
        now_ms: u64,
    ) -> bool {
        if !self.registry.is_enabled() || self.registry.matching_enabled(&pos).is_empty() {
            return false;
        }
        if progress != BREAK_COMPLETE {
            return false;
        }
        let Some(player) = api.player_by_entity_id(breaker_entity_id) else {
            return false;
        };
        self.breakers.record(pos, player.uuid, &player.name, now_ms);
        true
    }

    /// Snapshot everything the heuristic needs from the live world, or `None`
    /// when the change is not audited.
    pub fn capture_block_change(
        &self,
        api: &dyn ClientApi,
        pos: BlockPos,
        old: &BlockState,
        new: &BlockState,
        allow_heuristic: bool,
        now_ms: u64,
    ) -> Option<PendingAudit> {
        if !self.registry.is_enabled() {
            return None;
        }
        let matching = self.registry.matching_enabled(&pos);
        if matching.is_empty() || !api.in_target_context() {
            return None;
        }
        if old.block_id == new.block_id && old.meta == new.meta {
            return None;
        }

        let action = BlockAction::classify(old, new);
        let mut actor = None;
        let mut attribution = AttributionKind::Unknown;
        if action == BlockAction::Break {
            if let Some(b) = self.breakers.lookup(&pos, now_ms) {
                actor = Some((b.uuid, b.name));
                attribution = AttributionKind::BreakAnim;
            }
        }

        let wants_guess = action != BlockAction::Change && actor.is_none();
        let players = if wants_guess { api.players() } else { Vec::new() };
        let candidates = if wants_guess && allow_heuristic {
            snapshot_candidates(&players, &pos, new)
        } else {
            Vec::new()
        };
        let nearby = if wants_guess && action == BlockAction::Break {
            snapshot_nearby(&players, &pos, UNKNOWN_BREAK_NEARBY_RADIUS)
        } else {
            Vec::new()
        };

        Some(PendingAudit {
            ts_ms: now_ms,
            pos,
            dimension: api.dimension(),
            action,
            old: snapshot_state(old),
            new: snapshot_state(new),
            actor,
            attribution,
            candidates,
            nearby,
            areas: matching.into_iter().map(|a| a.name).collect(),
        })
    }

    /// Capture and hand off to the log worker. Returns whether the change was
    /// audited.
    pub fn note_block_change(
        &self,
        api: &dyn ClientApi,
        pos: BlockPos,
        old: &BlockState,
        new: &BlockState,
        allow_heuristic: bool,
        now_ms: u64,
    ) -> bool {
        let Some(pending) = self.capture_block_change(api, pos, old, new, allow_heuristic, now_ms)
        else {
            return false;
        };
        debug!(
            "Audit {} at {} in {} area(s)",
            pending.action,
            pending.pos,
            pending.areas.len()
        );
        self.log.resolve(pending);
        true
    }

    /// Drop every area and forget pending break attributions.
    pub fn clear_areas(&self) {
        self.registry.clear_all();
        self.breakers.clear();
    }
}

fn snapshot_state(state: &BlockState) -> BlockSnapshot {
    BlockSnapshot {
        block: state.block_id.clone(),
        meta: state.meta,
    }
}
