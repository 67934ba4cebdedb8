//! Named cuboid regions with inclusive integer bounds.

use hlog_host_api::HighlightBox;
use hlog_types::{BlockPos, ColorRgba, Vec3};

/// A named audit region. `min <= max` on every axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    /// Normalized name (trimmed, lowercase); unique within a registry.
    pub key: String,
    /// Name as the user typed it (trimmed).
    pub name: String,
    pub min: BlockPos,
    pub max: BlockPos,
    pub color: ColorRgba,
    pub enabled: bool,
    pub highlight: bool,
}

impl Area {
    /// Build an enabled, non-highlighted area from two opposite corners given
    /// in any order. Returns `None` for a blank name.
    pub fn new(name: &str, a: BlockPos, b: BlockPos, color: ColorRgba) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            key: normalize_key(trimmed),
            name: trimmed.to_string(),
            min: a.component_min(&b),
            max: a.component_max(&b),
            color,
            enabled: true,
            highlight: false,
        })
    }

    pub fn contains(&self, pos: &BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Block-space box covering the whole inclusive selection (`max + 1`).
    pub fn highlight_box(&self) -> HighlightBox {
        HighlightBox {
            min: Vec3::new(self.min.x as f64, self.min.y as f64, self.min.z as f64),
            max: Vec3::new(
                self.max.x as f64 + 1.0,
                self.max.y as f64 + 1.0,
                self.max.z as f64 + 1.0,
            ),
            color: self.color,
        }
    }
}

/// Area identity is case-insensitive and ignores surrounding whitespace.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_corners() {
        let area = Area::new(
            "  Shop ",
            BlockPos::new(4, 68, 4),
            BlockPos::new(0, 64, 0),
            ColorRgba::DEFAULT,
        )
        .unwrap();
        assert_eq!(area.key, "shop");
        assert_eq!(area.name, "Shop");
        assert_eq!(area.min, BlockPos::new(0, 64, 0));
        assert_eq!(area.max, BlockPos::new(4, 68, 4));
        assert!(area.enabled);
        assert!(!area.highlight);
    }

    #[test]
    fn blank_name_rejected() {
        let p = BlockPos::new(0, 0, 0);
        assert!(Area::new("   ", p, p, ColorRgba::DEFAULT).is_none());
        assert!(Area::new("", p, p, ColorRgba::DEFAULT).is_none());
    }

    #[test]
    fn contains_is_inclusive() {
        let area = Area::new(
            "a",
            BlockPos::new(0, 64, 0),
            BlockPos::new(4, 68, 4),
            ColorRgba::DEFAULT,
        )
        .unwrap();
        assert!(area.contains(&BlockPos::new(0, 64, 0)));
        assert!(area.contains(&BlockPos::new(4, 68, 4)));
        assert!(area.contains(&BlockPos::new(2, 65, 2)));
        assert!(!area.contains(&BlockPos::new(5, 65, 2)));
        assert!(!area.contains(&BlockPos::new(2, 63, 2)));
        assert!(!area.contains(&BlockPos::new(2, 65, -1)));
    }

    #[test]
    fn highlight_box_extends_max() {
        let area = Area::new(
            "a",
            BlockPos::new(-1, 10, 2),
            BlockPos::new(1, 12, 3),
            ColorRgba(0x11223344),
        )
        .unwrap();
        let bb = area.highlight_box();
        assert_eq!(bb.min, Vec3::new(-1.0, 10.0, 2.0));
        assert_eq!(bb.max, Vec3::new(2.0, 13.0, 4.0));
        assert_eq!(bb.color, ColorRgba(0x11223344));
    }
}
