//! The area registry: named regions plus the global logging switch.
//!
//! All access goes through one mutex. Readers get deep copies so the renderer
//! and the command lister never see a registry mid-mutation. Every mutation
//! queues a full save on the log worker.

use std::sync::{Mutex, MutexGuard, PoisonError};

use hlog_host_api::HighlightBox;
use hlog_types::{BlockPos, ColorRgba};
use tracing::debug;

use crate::area::{normalize_key, Area};
use crate::area_file::{AreaDocument, LoadedAreas};
use crate::logger::LogHandle;

struct RegistryState {
    enabled: bool,
    /// Insertion order; keys are unique.
    areas: Vec<Area>,
}

impl RegistryState {
    fn find_mut(&mut self, key: &str) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.key == key)
    }

    fn document(&self) -> AreaDocument {
        AreaDocument::new(self.enabled, &self.areas)
    }

    fn any_enabled_area(&self) -> bool {
        self.areas.iter().any(|a| a.enabled)
    }
}

pub struct AreaRegistry {
    state: Mutex<RegistryState>,
    log: LogHandle,
}

impl Default for AreaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaRegistry {
    /// Empty, enabled, not persisted anywhere.
    pub fn new() -> Self {
        Self::with_log(LogHandle::detached())
    }

    pub fn with_log(log: LogHandle) -> Self {
        Self::from_loaded(LoadedAreas::default(), log)
    }

    /// Restore a loaded registry. Makes sure the log files exist when logging
    /// is already active.
    pub fn from_loaded(loaded: LoadedAreas, log: LogHandle) -> Self {
        let registry = Self {
            state: Mutex::new(RegistryState {
                enabled: loaded.enabled,
                areas: loaded.areas,
            }),
            log,
        };
        if registry.is_enabled() && registry.has_any_enabled_area() {
            registry.log.ensure_log_files();
        }
        registry
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, doc: AreaDocument) {
        self.log.save_areas(doc);
    }

    // ─── Mutations ───────────────────────────────────────────────────────────

    /// Add an area or update an existing one's bounds and color. An update
    /// keeps the area's `enabled`/`highlight` flags and its list position.
    /// Returns false for a blank name.
    pub fn upsert(&self, name: &str, a: BlockPos, b: BlockPos, color: ColorRgba) -> bool {
        let Some(area) = Area::new(name, a, b, color) else {
            return false;
        };
        let (doc, enabled) = {
            let mut state = self.lock();
            match state.find_mut(&area.key) {
                Some(existing) => {
                    existing.name = area.name;
                    existing.min = area.min;
                    existing.max = area.max;
                    existing.color = area.color;
                }
                None => {
                    debug!("Added audit area {}", area.name);
                    state.areas.push(area);
                }
            }
            (state.document(), state.enabled)
        };
        self.persist(doc);
        if enabled {
            self.log.ensure_log_files();
        }
        true
    }

    pub fn remove(&self, name: &str) -> bool {
        let key = normalize_key(name);
        let doc = {
            let mut state = self.lock();
            let before = state.areas.len();
            state.areas.retain(|a| a.key != key);
            if state.areas.len() == before {
                return false;
            }
            state.document()
        };
        self.persist(doc);
        true
    }

    pub fn clear_all(&self) {
        let doc = {
            let mut state = self.lock();
            state.areas.clear();
            state.document()
        };
        self.persist(doc);
    }

    pub fn set_highlight(&self, name: &str, on: bool) -> bool {
        self.update_highlight(name, |_| on).is_some()
    }

    /// Flip the highlight flag. Returns the new value, or `None` if no such area.
    pub fn toggle_highlight(&self, name: &str) -> Option<bool> {
        self.update_highlight(name, |current| !current)
    }

    fn update_highlight(&self, name: &str, f: impl FnOnce(bool) -> bool) -> Option<bool> {
        let key = normalize_key(name);
        let (doc, value) = {
            let mut state = self.lock();
            let area = state.find_mut(&key)?;
            area.highlight = f(area.highlight);
            let value = area.highlight;
            (state.document(), value)
        };
        self.persist(doc);
        Some(value)
    }

    pub fn set_global_enabled(&self, enabled: bool) {
        let (doc, any_enabled) = {
            let mut state = self.lock();
            state.enabled = enabled;
            (state.document(), state.any_enabled_area())
        };
        self.persist(doc);
        if enabled && any_enabled {
            self.log.ensure_log_files();
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn has_any_area(&self) -> bool {
        !self.lock().areas.is_empty()
    }

    pub fn has_any_enabled_area(&self) -> bool {
        self.lock().any_enabled_area()
    }

    pub fn get(&self, name: &str) -> Option<Area> {
        let key = normalize_key(name);
        self.lock().areas.iter().find(|a| a.key == key).cloned()
    }

    pub fn list_snapshot(&self) -> Vec<Area> {
        self.lock().areas.clone()
    }

    /// Enabled areas with highlighting on.
    pub fn highlighted_snapshot(&self) -> Vec<Area> {
        self.lock()
            .areas
            .iter()
            .filter(|a| a.enabled && a.highlight)
            .cloned()
            .collect()
    }

    /// Enabled areas containing `pos`, in insertion order.
    pub fn matching_enabled(&self, pos: &BlockPos) -> Vec<Area> {
        self.lock()
            .areas
            .iter()
            .filter(|a| a.enabled && a.contains(pos))
            .cloned()
            .collect()
    }

    pub fn highlight_boxes(&self) -> Vec<HighlightBox> {
        self.highlighted_snapshot()
            .iter()
            .map(Area::highlight_box)
            .collect()
    }

    pub fn document(&self) -> AreaDocument {
        self.lock().document()
    }
}
