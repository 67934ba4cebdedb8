//! Actor attribution for block changes.
//!
//! Breaks are matched first against recent break-animation completions. When
//! that fails (and for every place) the players near the block are scored by
//! how squarely their view ray hits the block center.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use hlog_host_api::{BlockState, PlayerView};
use hlog_types::{BlockPos, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A break animation is only credited for this long after it completes.
pub const BREAK_ATTRIBUTION_WINDOW_MS: u64 = 2500;
/// Candidates farther than this (eye to block center) are never considered.
pub const PLACER_MAX_DIST: f64 = 7.0;
pub const PLACER_LOOK_DOT_MIN: f64 = 0.94;
pub const BREAKER_LOOK_DOT_MIN: f64 = 0.92;
/// Radius (feet to block center) for the suspects attached to unknown breaks.
pub const UNKNOWN_BREAK_NEARBY_RADIUS: f64 = 5.0;

const PLACER_MAX_PERP_SQ: f64 = 1.75;
const BREAKER_MAX_PERP_SQ: f64 = 2.25;
const PLACER_PERP_WEIGHT: f64 = 0.95;
const BREAKER_PERP_WEIGHT: f64 = 0.75;
const DOT_WEIGHT: f64 = 2.2;
const ITEM_MATCH_BONUS: f64 = 0.35;
const MIN_GUESS_SCORE: f64 = 0.25;
const DEGENERATE_SQ: f64 = 0.0001;

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockAction {
    Place,
    Break,
    Change,
}

impl BlockAction {
    /// Air or replaceable counts as empty.
    pub fn classify(old: &BlockState, new: &BlockState) -> Self {
        match (old.replaceable, new.replaceable) {
            (true, false) => BlockAction::Place,
            (false, true) => BlockAction::Break,
            _ => BlockAction::Change,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockAction::Place => "PLACE",
            BlockAction::Break => "BREAK",
            BlockAction::Change => "CHANGE",
        }
    }
}

impl fmt::Display for BlockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the actor on an entry was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionKind {
    BreakAnim,
    HeuristicBreak,
    HeuristicLookItem,
    HeuristicLook,
    Unknown,
}

impl AttributionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionKind::BreakAnim => "break_anim",
            AttributionKind::HeuristicBreak => "heuristic_break",
            AttributionKind::HeuristicLookItem => "heuristic_look_item",
            AttributionKind::HeuristicLook => "heuristic_look",
            AttributionKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AttributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Recent breakers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BreakAttribution {
    pub uuid: Uuid,
    pub name: String,
    pub at_ms: u64,
}

/// Last completed break animation per position. Stale entries are left in
/// place and ignored on lookup.
#[derive(Debug, Default)]
pub struct RecentBreakers {
    inner: Mutex<HashMap<BlockPos, BreakAttribution>>,
}

impl RecentBreakers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, pos: BlockPos, uuid: Uuid, name: &str, at_ms: u64) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(
            pos,
            BreakAttribution {
                uuid,
                name: name.to_string(),
                at_ms,
            },
        );
    }

    /// The breaker at `pos`, if recorded no more than the window before `now_ms`.
    pub fn lookup(&self, pos: &BlockPos, now_ms: u64) -> Option<BreakAttribution> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(pos)
            .filter(|b| now_ms.saturating_sub(b.at_ms) <= BREAK_ATTRIBUTION_WINDOW_MS)
            .cloned()
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

/// Frozen view of a player who may have caused a change.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub uuid: Uuid,
    pub name: String,
    pub eye: Vec3,
    pub look: Vec3,
    /// The held item places the block that appeared.
    pub item_match: bool,
}

/// A player listed as a suspect on an unattributed break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "dist")]
    pub distance: f64,
}

/// Players whose eye is within [`PLACER_MAX_DIST`] of the block center.
pub fn snapshot_candidates(players: &[PlayerView], pos: &BlockPos, new: &BlockState) -> Vec<Candidate> {
    let center = pos.center();
    players
        .iter()
        .filter_map(|p| {
            let eye = p.eye_position();
            let dist_sq = center.distance_sq(&eye);
            if dist_sq <= DEGENERATE_SQ || dist_sq > PLACER_MAX_DIST * PLACER_MAX_DIST {
                return None;
            }
            Some(Candidate {
                uuid: p.uuid,
                name: p.name.clone(),
                eye,
                look: p.look,
                item_match: p.held_block.as_deref() == Some(new.block_id.as_str()),
            })
        })
        .collect()
}

/// Players whose feet are within `radius` of the block center, nearest first.
pub fn snapshot_nearby(players: &[PlayerView], pos: &BlockPos, radius: f64) -> Vec<NearbyPlayer> {
    let center = pos.center();
    let mut out: Vec<NearbyPlayer> = players
        .iter()
        .filter_map(|p| {
            let d2 = center.distance_sq(&p.position);
            (d2 <= radius * radius).then(|| NearbyPlayer {
                uuid: Some(p.uuid),
                name: Some(p.name.clone()),
                distance: d2.sqrt(),
            })
        })
        .collect();
    out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    out
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// Score a candidate against a block center, or `None` if any gate rejects it.
pub fn score_candidate(center: &Vec3, c: &Candidate, is_break: bool) -> Option<f64> {
    let to_block = *center - c.eye;
    let dist_sq = to_block.length_sq();
    if dist_sq <= DEGENERATE_SQ {
        return None;
    }
    let dist = dist_sq.sqrt();
    if dist > PLACER_MAX_DIST {
        return None;
    }

    let look = c.look.normalized()?;
    let dot = look.dot(&to_block) / dist;
    let min_dot = if is_break {
        BREAKER_LOOK_DOT_MIN
    } else {
        PLACER_LOOK_DOT_MIN
    };
    if dot < min_dot {
        return None;
    }

    let t = look.dot(&to_block);
    if t < 0.0 {
        return None;
    }
    let closest = c.eye + look * t;
    let perp_sq = center.distance_sq(&closest);
    let max_perp = if is_break {
        BREAKER_MAX_PERP_SQ
    } else {
        PLACER_MAX_PERP_SQ
    };
    if perp_sq > max_perp {
        return None;
    }

    let perp_weight = if is_break {
        BREAKER_PERP_WEIGHT
    } else {
        PLACER_PERP_WEIGHT
    };
    let mut score = DOT_WEIGHT * dot - dist / PLACER_MAX_DIST - perp_sq * perp_weight;
    if !is_break && c.item_match {
        score += ITEM_MATCH_BONUS;
    }
    Some(score)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guess {
    pub uuid: Uuid,
    pub name: String,
    pub item_match: bool,
    pub score: f64,
}

impl Guess {
    pub fn kind(&self, is_break: bool) -> AttributionKind {
        match (is_break, self.item_match) {
            (true, _) => AttributionKind::HeuristicBreak,
            (false, true) => AttributionKind::HeuristicLookItem,
            (false, false) => AttributionKind::HeuristicLook,
        }
    }
}

/// Highest-scoring candidate, ties going to the earliest. Rejected when the
/// best score is below the minimum.
pub fn guess_actor(pos: &BlockPos, candidates: &[Candidate], is_break: bool) -> Option<Guess> {
    let center = pos.center();
    let mut best: Option<(&Candidate, f64)> = None;
    for c in candidates {
        let Some(score) = score_candidate(&center, c, is_break) else {
            continue;
        };
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((c, score));
        }
    }
    let (c, score) = best?;
    if score < MIN_GUESS_SCORE {
        return None;
    }
    Some(Guess {
        uuid: c.uuid,
        name: c.name.clone(),
        item_match: c.item_match,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, eye: Vec3, look: Vec3, item_match: bool) -> Candidate {
        Candidate {
            uuid: Uuid::new_v4(),
            name: name.into(),
            eye,
            look,
            item_match,
        }
    }

    fn player(name: &str, feet: Vec3, look: Vec3, held: Option<&str>) -> PlayerView {
        PlayerView {
            entity_id: 1,
            uuid: Uuid::new_v4(),
            name: name.into(),
            position: feet,
            eye_height: 1.62,
            look,
            held_block: held.map(str::to_string),
        }
    }

    #[test]
    fn classify_actions() {
        let air = BlockState::air();
        let stone = BlockState::new("minecraft:stone", 0, false);
        let dirt = BlockState::new("minecraft:dirt", 0, false);
        assert_eq!(BlockAction::classify(&air, &stone), BlockAction::Place);
        assert_eq!(BlockAction::classify(&stone, &air), BlockAction::Break);
        assert_eq!(BlockAction::classify(&stone, &dirt), BlockAction::Change);
        assert_eq!(BlockAction::classify(&air, &air), BlockAction::Change);
    }

    #[test]
    fn attribution_kind_wire_names() {
        let json = serde_json::to_string(&AttributionKind::HeuristicLookItem).unwrap();
        assert_eq!(json, "\"heuristic_look_item\"");
        assert_eq!(AttributionKind::BreakAnim.to_string(), "break_anim");
        assert_eq!(serde_json::to_string(&BlockAction::Break).unwrap(), "\"BREAK\"");
    }

    #[test]
    fn breaker_window_is_inclusive() {
        let breakers = RecentBreakers::new();
        let pos = BlockPos::new(1, 2, 3);
        breakers.record(pos, Uuid::nil(), "Steve", 10_000);
        assert!(breakers.lookup(&pos, 12_500).is_some());
        assert!(breakers.lookup(&pos, 12_501).is_none());
        assert!(breakers.lookup(&BlockPos::new(1, 2, 4), 10_000).is_none());
        // Stale entries are not swept.
        assert_eq!(breakers.len(), 1);
    }

    #[test]
    fn breaker_overwrites_and_clears() {
        let breakers = RecentBreakers::new();
        let pos = BlockPos::new(0, 0, 0);
        breakers.record(pos, Uuid::nil(), "Alex", 0);
        breakers.record(pos, Uuid::nil(), "Steve", 100);
        assert_eq!(breakers.lookup(&pos, 200).unwrap().name, "Steve");
        breakers.clear();
        assert!(breakers.is_empty());
    }

    #[test]
    fn on_ray_candidate_beats_off_axis() {
        let pos = BlockPos::new(0, 64, 0);
        let center = pos.center();
        // 3 blocks away on -X, looking straight at the center.
        let good = candidate(
            "Good",
            Vec3::new(-2.5, 64.5, 0.5),
            Vec3::new(1.0, 0.0, 0.0),
            false,
        );
        // Same spot, looking 0.90 cos off.
        let off = candidate(
            "Off",
            Vec3::new(-2.5, 64.5, 0.5),
            Vec3::new(0.9, (1.0f64 - 0.81).sqrt(), 0.0),
            false,
        );

        let s = score_candidate(&center, &good, false).unwrap();
        assert!((s - (2.2 - 3.0 / 7.0)).abs() < 1e-9);
        assert!(score_candidate(&center, &off, false).is_none());
        assert!(score_candidate(&center, &off, true).is_none());

        let guess = guess_actor(&pos, &[off, good], false).unwrap();
        assert_eq!(guess.name, "Good");
        assert_eq!(guess.kind(false), AttributionKind::HeuristicLook);
    }

    #[test]
    fn item_match_adds_bonus_on_place_only() {
        let center = BlockPos::new(0, 0, 0).center();
        let c = candidate("A", Vec3::new(0.5, 0.5, -2.5), Vec3::new(0.0, 0.0, 1.0), true);
        let place = score_candidate(&center, &c, false).unwrap();
        let brk = score_candidate(&center, &c, true).unwrap();
        assert!((place - brk - ITEM_MATCH_BONUS).abs() < 1e-9);
    }

    #[test]
    fn rejects_behind_far_and_degenerate() {
        let center = BlockPos::new(0, 0, 0).center();
        let behind = candidate("B", Vec3::new(0.5, 0.5, -2.5), Vec3::new(0.0, 0.0, -1.0), false);
        let far = candidate("F", Vec3::new(0.5, 0.5, -7.6), Vec3::new(0.0, 0.0, 1.0), false);
        let still = candidate("S", Vec3::new(0.5, 0.5, -2.5), Vec3::ZERO, false);
        let inside = candidate("I", center, Vec3::new(0.0, 0.0, 1.0), false);
        for c in [&behind, &far, &still, &inside] {
            assert!(score_candidate(&center, c, true).is_none(), "{}", c.name);
        }
    }

    #[test]
    fn low_score_winner_is_rejected() {
        // Passes every break gate (dot ~0.977, perp^2 ~2.10) but scores ~-0.41.
        let pos = BlockPos::new(0, 0, 0);
        let c = candidate("Edge", Vec3::new(1.95, 0.5, -6.2), Vec3::new(0.0, 0.0, 1.0), false);
        let score = score_candidate(&pos.center(), &c, true).unwrap();
        assert!(score < MIN_GUESS_SCORE);
        assert!(guess_actor(&pos, &[c], true).is_none());
        assert!(guess_actor(&pos, &[], true).is_none());
    }

    #[test]
    fn snapshot_candidates_filters_by_eye_distance() {
        let pos = BlockPos::new(0, 64, 0);
        let new = BlockState::new("minecraft:stone", 0, false);
        let players = vec![
            player("Near", Vec3::new(0.5, 63.0, -2.0), Vec3::new(0.0, 0.0, 1.0), Some("minecraft:stone")),
            player("Far", Vec3::new(0.5, 64.0, 20.0), Vec3::new(0.0, 0.0, -1.0), None),
            player("Holding", Vec3::new(2.0, 64.0, 0.5), Vec3::new(-1.0, 0.0, 0.0), Some("minecraft:dirt")),
        ];
        let out = snapshot_candidates(&players, &pos, &new);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "Near");
        assert!(out[0].item_match);
        assert_eq!(out[0].eye, Vec3::new(0.5, 64.62, -2.0));
        assert!(!out[1].item_match);
    }

    #[test]
    fn snapshot_nearby_sorted_by_feet_distance() {
        let pos = BlockPos::new(0, 64, 0);
        let look = Vec3::new(0.0, 0.0, 1.0);
        let players = vec![
            player("Mid", Vec3::new(3.5, 64.5, 0.5), look, None),
            player("Close", Vec3::new(1.5, 64.5, 0.5), look, None),
            player("Out", Vec3::new(6.0, 64.5, 0.5), look, None),
        ];
        let out = snapshot_nearby(&players, &pos, UNKNOWN_BREAK_NEARBY_RADIUS);
        let names: Vec<_> = out.iter().map(|p| p.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Close", "Mid"]);
        assert!((out[0].distance - 1.0).abs() < 1e-9);
        assert!((out[1].distance - 3.0).abs() < 1e-9);
    }
}
