//! Spatial occupancy — the 2D wall/open grid plus the sparse 3D block map.
//!
//! The grid answers "is this cell carved open?" in grid coordinates; the
//! block map holds a unit-cube AABB for every collidable cell (walls,
//! floor, ceiling, furniture) in world coordinates. Both are written once
//! during generation and read-only afterward. Collision, pathfinding
//! traversability, and vision occlusion all query this one model.

use std::collections::HashMap;

use crate::constants::map;
use crate::math::{Aabb, Vec3};

/// Classification of a grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Open,
    OutOfBounds,
}

/// Combined wall/open grid and collidable-block map.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    depth: usize,
    /// Row-major `width × depth`; `true` means wall. Cells default to wall.
    walls: Vec<bool>,
    /// Unit-cube AABBs keyed by rounded world coordinates.
    blocks: HashMap<(i32, i32, i32), Aabb>,
}

impl OccupancyGrid {
    /// A fully walled grid with no blocks placed yet.
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            walls: vec![true; width * depth],
            blocks: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// World-space center of the grid cell `(gx, gz)` at elevation `y`.
    pub fn cell_center(&self, gx: usize, gz: usize, y: f32) -> Vec3 {
        Vec3::new(gx as f32 + map::OFFSET_X, y, gz as f32 + map::OFFSET_Z)
    }

    /// Nearest grid cell to a world position. May be out of bounds.
    pub fn world_to_cell(&self, pos: &Vec3) -> (i32, i32) {
        (
            (pos.x - map::OFFSET_X).round() as i32,
            (pos.z - map::OFFSET_Z).round() as i32,
        )
    }

    /// Classify a grid coordinate. Out-of-bounds is its own answer, never
    /// a panic.
    pub fn cell(&self, gx: i32, gz: i32) -> CellKind {
        if gx < 0 || gz < 0 || gx as usize >= self.width || gz as usize >= self.depth {
            return CellKind::OutOfBounds;
        }
        if self.walls[gx as usize * self.depth + gz as usize] {
            CellKind::Wall
        } else {
            CellKind::Open
        }
    }

    /// Carve a cell open. Out-of-bounds writes are ignored.
    pub(crate) fn carve(&mut self, gx: usize, gz: usize) {
        if gx < self.width && gz < self.depth {
            self.walls[gx * self.depth + gz] = false;
        }
    }

    /// Register a collidable unit cube centered at a world position.
    pub(crate) fn add_block(&mut self, x: f32, y: f32, z: f32) {
        let key = (x.round() as i32, y.round() as i32, z.round() as i32);
        let aabb = Aabb::from_center(Vec3::new(x, y, z), 0.5, 0.5, 0.5);
        self.blocks.insert(key, aabb);
    }

    /// Whether a collidable block occupies the rounded world coordinate.
    pub fn has_block(&self, x: i32, y: i32, z: i32) -> bool {
        self.blocks.contains_key(&(x, y, z))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Whether furniture (or any block) occupies either of the two body
    /// elevations of the open cell `(gx, gz)`. Used by the pathfinder to
    /// treat furnished cells as walls.
    pub fn furniture_at(&self, gx: i32, gz: i32) -> bool {
        let wx = gx + map::OFFSET_X as i32;
        let wz = gz + map::OFFSET_Z as i32;
        self.has_block(wx, 1, wz) || self.has_block(wx, 2, wz)
    }

    /// Test an axis-aligned box against the block map.
    ///
    /// The box is centered horizontally on `pos` with half-extent `radius`,
    /// spans `pos.y + step_height` to `pos.y + height - 0.1` vertically.
    /// Raising the lower face by `step_height` lets horizontal passes slide
    /// over floor seams while vertical passes stay exact. Only the integer
    /// neighborhood that could overlap the box is scanned.
    pub fn box_blocked(&self, pos: &Vec3, radius: f32, height: f32, step_height: f32) -> bool {
        let query = Aabb::new(
            Vec3::new(pos.x - radius, pos.y + step_height, pos.z - radius),
            Vec3::new(pos.x + radius, pos.y + height - 0.1, pos.z + radius),
        );

        let min_x = (pos.x - radius - 1.0).floor() as i32;
        let max_x = (pos.x + radius + 1.0).ceil() as i32;
        let min_y = (pos.y - 1.0).floor() as i32;
        let max_y = (pos.y + height + 1.0).ceil() as i32;
        let min_z = (pos.z - radius - 1.0).floor() as i32;
        let max_z = (pos.z + radius + 1.0).ceil() as i32;

        for x in min_x..=max_x {
            for y in min_y..=max_y {
                for z in min_z..=max_z {
                    if let Some(block) = self.blocks.get(&(x, y, z)) {
                        if query.intersects(block) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Whether any collidable block lies strictly between `from` and `to`.
    ///
    /// Marches the segment in fixed steps and samples the block map, so
    /// occlusion sees exactly the same walls and furniture movement does.
    pub fn segment_occluded(&self, from: &Vec3, to: &Vec3) -> bool {
        const STEP: f32 = 0.25;
        let dist = from.distance(to);
        if dist <= STEP {
            return false;
        }
        let dir = (*to - *from).normalize();
        let mut t = STEP;
        // Stop one step short so the target's own cell never counts.
        while t < dist - STEP {
            let p = *from + dir * t;
            if self.has_block(p.x.round() as i32, p.y.round() as i32, p.z.round() as i32) {
                return true;
            }
            t += STEP;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> OccupancyGrid {
        // 8×8, one open 3×3 room at (2..5, 2..5), walls built up around it.
        let mut occ = OccupancyGrid::new(8, 8);
        for gx in 2..5 {
            for gz in 2..5 {
                occ.carve(gx, gz);
            }
        }
        for gx in 0..8 {
            for gz in 0..8 {
                let x = gx as f32 + map::OFFSET_X;
                let z = gz as f32 + map::OFFSET_Z;
                occ.add_block(x, 0.0, z); // floor
                if occ.cell(gx as i32, gz as i32) == CellKind::Wall {
                    for y in 1..=map::WALL_HEIGHT {
                        occ.add_block(x, y as f32, z);
                    }
                }
            }
        }
        occ
    }

    #[test]
    fn cells_default_to_wall() {
        let occ = OccupancyGrid::new(4, 4);
        assert_eq!(occ.cell(0, 0), CellKind::Wall);
        assert_eq!(occ.cell(3, 3), CellKind::Wall);
    }

    #[test]
    fn out_of_bounds_is_classified_not_panicked() {
        let occ = OccupancyGrid::new(4, 4);
        assert_eq!(occ.cell(-1, 0), CellKind::OutOfBounds);
        assert_eq!(occ.cell(0, 4), CellKind::OutOfBounds);
        assert_eq!(occ.cell(100, 100), CellKind::OutOfBounds);
    }

    #[test]
    fn carve_opens_cell() {
        let mut occ = OccupancyGrid::new(4, 4);
        occ.carve(1, 2);
        assert_eq!(occ.cell(1, 2), CellKind::Open);
        // Out-of-bounds carve is a no-op.
        occ.carve(9, 9);
    }

    #[test]
    fn box_clear_inside_open_cell() {
        let occ = small_grid();
        let center = occ.cell_center(3, 3, 1.0);
        assert!(!occ.box_blocked(&center, 0.25, 1.75, 0.5));
    }

    #[test]
    fn box_blocked_by_wall_stack() {
        let occ = small_grid();
        // Cell (1,3) is wall; standing in it overlaps the stack.
        let inside_wall = occ.cell_center(1, 3, 1.0);
        assert!(occ.box_blocked(&inside_wall, 0.25, 1.75, 0.5));
    }

    #[test]
    fn step_height_ignores_floor() {
        let occ = small_grid();
        // Sunk slightly into the floor: the lenient pass clears, the
        // strict pass collides.
        let center = occ.cell_center(3, 3, 0.3);
        assert!(!occ.box_blocked(&center, 0.25, 1.75, 0.5));
        assert!(occ.box_blocked(&center, 0.25, 1.75, 0.0));
    }

    #[test]
    fn occlusion_through_wall() {
        let occ = small_grid();
        // (2,3) and (4,3) are open with open (3,3) between: clear.
        let a = occ.cell_center(2, 3, 1.5);
        let b = occ.cell_center(4, 3, 1.5);
        assert!(!occ.segment_occluded(&a, &b));
        // Looking from inside the room out across the boundary wall.
        let outside = occ.cell_center(6, 3, 1.5);
        assert!(occ.segment_occluded(&a, &outside));
    }

    #[test]
    fn world_cell_round_trip() {
        let occ = small_grid();
        let p = occ.cell_center(3, 4, 1.0);
        assert_eq!(occ.world_to_cell(&p), (3, 4));
    }
}
