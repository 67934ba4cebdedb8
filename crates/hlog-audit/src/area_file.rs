//! Area registry persistence: a single JSON document holding the global
//! logging flag and every area.
//!
//! Older builds stored one area as top-level `min`/`max` fields. That form is
//! still read (as an area named `default`) but never written.

use std::fs;
use std::io;
use std::path::Path;

use hlog_types::{BlockPos, ColorRgba};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::area::{normalize_key, Area};

/// Name given to the area migrated from the legacy single-area document.
pub const LEGACY_AREA_NAME: &str = "default";

#[derive(Debug, Error)]
pub enum AreaFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid area file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One area as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub name: String,
    pub enabled: bool,
    pub highlight: bool,
    pub color: ColorRgba,
    pub min: BlockPos,
    pub max: BlockPos,
}

impl From<&Area> for AreaRecord {
    fn from(area: &Area) -> Self {
        Self {
            name: area.name.clone(),
            enabled: area.enabled,
            highlight: area.highlight,
            color: area.color,
            min: area.min,
            max: area.max,
        }
    }
}

/// The document written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDocument {
    pub enabled: bool,
    pub areas: Vec<AreaRecord>,
}

impl AreaDocument {
    pub fn new(enabled: bool, areas: &[Area]) -> Self {
        Self {
            enabled,
            areas: areas.iter().map(AreaRecord::from).collect(),
        }
    }

    /// Overwrite `path` with this document, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), AreaFileError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Registry state recovered from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAreas {
    pub enabled: bool,
    pub areas: Vec<Area>,
}

impl Default for LoadedAreas {
    fn default() -> Self {
        Self {
            enabled: true,
            areas: Vec::new(),
        }
    }
}

// Lenient read-side shapes: every field optional so one bad record does not
// discard the whole file.

#[derive(Deserialize)]
struct RawDocument {
    enabled: Option<bool>,
    /// Anything but an array is treated as absent.
    areas: Option<serde_json::Value>,
    min: Option<BlockPos>,
    max: Option<BlockPos>,
    highlight: Option<bool>,
}

#[derive(Deserialize)]
struct RawRecord {
    name: Option<String>,
    enabled: Option<bool>,
    highlight: Option<bool>,
    color: Option<String>,
    min: Option<BlockPos>,
    max: Option<BlockPos>,
}

/// Load the area file. A missing file yields an empty registry with logging
/// enabled.
pub fn load(path: &Path) -> Result<LoadedAreas, AreaFileError> {
    if !path.exists() {
        return Ok(LoadedAreas::default());
    }
    let contents = fs::read_to_string(path)?;
    let loaded = decode(&contents)?;
    info!(
        "Loaded {} audit area(s) from {}",
        loaded.areas.len(),
        path.display()
    );
    Ok(loaded)
}

/// Decode either the current or the legacy document form.
pub fn decode(json: &str) -> Result<LoadedAreas, AreaFileError> {
    let raw: RawDocument = serde_json::from_str(json)?;
    let enabled = raw.enabled.unwrap_or(true);
    let mut areas: Vec<Area> = Vec::new();

    if let Some(serde_json::Value::Array(records)) = raw.areas {
        for value in records {
            let record: RawRecord = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping malformed area record: {e}");
                    continue;
                }
            };
            let (Some(name), Some(min), Some(max)) = (record.name, record.min, record.max) else {
                continue;
            };
            let color = record
                .color
                .as_deref()
                .map(|c| ColorRgba::parse_or(c, ColorRgba::DEFAULT))
                .unwrap_or_default();
            let Some(mut area) = Area::new(&name, min, max, color) else {
                continue;
            };
            area.enabled = record.enabled.unwrap_or(true);
            area.highlight = record.highlight.unwrap_or(false);
            insert_or_replace(&mut areas, area);
        }
    } else if let (Some(min), Some(max)) = (raw.min, raw.max) {
        if let Some(mut area) = Area::new(LEGACY_AREA_NAME, min, max, ColorRgba::DEFAULT) {
            area.enabled = raw.enabled.unwrap_or(false);
            area.highlight = raw.highlight.unwrap_or(false);
            areas.push(area);
        }
    }

    Ok(LoadedAreas { enabled, areas })
}

/// Later records with the same key replace earlier ones in place.
fn insert_or_replace(areas: &mut Vec<Area>, area: Area) {
    match areas
        .iter_mut()
        .find(|a| a.key == normalize_key(&area.name))
    {
        Some(slot) => *slot = area,
        None => areas.push(area),
    }
}
