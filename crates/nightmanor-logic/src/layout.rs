//! Level layout input — the ordered room-rectangle list fed to generation.
//!
//! Rectangles are in grid units. The same records deserialize from
//! `data/manor_layout.json`, so the harness and any front end share one
//! source of truth for the reference manor.

use serde::{Deserialize, Serialize};

/// A feature a room asks for. Only `Cabinet` places geometry today; `Bed`
/// is accepted so layouts can declare it ahead of the furniture it will get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Cabinet,
    Bed,
}

/// One room rectangle in grid coordinates, origin at its minimum corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSpec {
    pub x: usize,
    pub z: usize,
    pub width: usize,
    pub depth: usize,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl RoomSpec {
    /// Whether the full rectangle fits inside a `width × depth` grid.
    pub fn fits(&self, grid_width: usize, grid_depth: usize) -> bool {
        self.x + self.width < grid_width && self.z + self.depth < grid_depth
    }
}

/// The ten-room reference manor (mirrors `data/manor_layout.json`).
pub fn reference_layout() -> Vec<RoomSpec> {
    use Feature::*;
    let room = |x, z, width, depth, features: &[Feature]| RoomSpec {
        x,
        z,
        width,
        depth,
        features: features.to_vec(),
    };
    vec![
        room(5, 5, 15, 15, &[Cabinet, Bed]),
        room(25, 5, 12, 20, &[Cabinet]),
        room(42, 10, 20, 15, &[Bed]),
        room(5, 25, 15, 15, &[Cabinet]),
        room(25, 30, 25, 25, &[Cabinet, Bed]),
        room(55, 30, 15, 15, &[]),
        room(10, 45, 12, 25, &[Bed]),
        room(30, 60, 20, 10, &[Cabinet]),
        room(60, 5, 10, 10, &[]),
        room(60, 55, 15, 15, &[Bed]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::map;

    #[test]
    fn reference_layout_all_fit() {
        for spec in reference_layout() {
            assert!(spec.fits(map::WIDTH, map::DEPTH));
        }
    }

    #[test]
    fn json_layout_matches_reference() {
        let json = include_str!("../../../data/manor_layout.json");
        let parsed: Vec<RoomSpec> = serde_json::from_str(json).unwrap();
        let coded = reference_layout();
        assert_eq!(parsed.len(), coded.len());
        for (a, b) in parsed.iter().zip(&coded) {
            assert_eq!((a.x, a.z, a.width, a.depth), (b.x, b.z, b.width, b.depth));
            assert_eq!(a.features, b.features);
        }
    }

    #[test]
    fn missing_features_field_defaults_empty() {
        let spec: RoomSpec =
            serde_json::from_str(r#"{ "x": 1, "z": 2, "width": 3, "depth": 4 }"#).unwrap();
        assert!(spec.features.is_empty());
    }

    #[test]
    fn oversized_room_does_not_fit() {
        let spec = RoomSpec {
            x: 70,
            z: 5,
            width: 10,
            depth: 5,
            features: vec![],
        };
        assert!(!spec.fits(map::WIDTH, map::DEPTH));
    }
}
