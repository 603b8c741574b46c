//! Level generation — carves the room layout into the grid, builds the 3D
//! occupancy, derives walkable nodes, and places features.
//!
//! Generation never fails: rooms that do not fit are skipped, a switch that
//! finds no free wall cell is simply absent, and a layout with fewer than
//! two rooms gets no exit door or items. The level is always playable with
//! whatever did get placed, and degraded placements log at info level.
//!
//! Corridors connect *consecutive* realized rooms only (an L per pair at
//! their centers). That chain happens to connect the reference layout
//! fully, but an arbitrary layout can leave room groups mutually
//! unreachable; callers supplying their own layouts must order rooms with
//! that in mind.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::map;
use crate::interaction::Interactable;
use crate::layout::{Feature, RoomSpec};
use crate::math::Vec3;
use crate::occupancy::{CellKind, OccupancyGrid};

/// A realized room. Ids are 1-based and count only rooms that fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub x: usize,
    pub z: usize,
    pub width: usize,
    pub depth: usize,
    pub features: Vec<Feature>,
}

impl Room {
    /// Grid cell at the room's center (floored).
    pub fn center_cell(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.z + self.depth / 2)
    }

    /// World-space center of the room rectangle.
    pub fn center_world(&self) -> Vec3 {
        Vec3::new(
            self.x as f32 + map::OFFSET_X + self.width as f32 / 2.0,
            0.0,
            self.z as f32 + map::OFFSET_Z + self.depth as f32 / 2.0,
        )
    }

    pub fn contains_cell(&self, gx: i32, gz: i32) -> bool {
        gx >= self.x as i32
            && gx < (self.x + self.width) as i32
            && gz >= self.z as i32
            && gz < (self.z + self.depth) as i32
    }
}

/// Everything generation produces. Topology is immutable after this; only
/// the interactable list shrinks (item pickups) during play.
#[derive(Debug, Clone)]
pub struct Level {
    pub occupancy: OccupancyGrid,
    pub rooms: Vec<Room>,
    /// World-space centers of every open cell.
    pub walkable: Vec<Vec3>,
    pub interactables: Vec<Interactable>,
    /// Room containing the middle walkable node, if any room does.
    pub spawn_room_id: Option<u32>,
    /// Room the light switch landed in, if placement succeeded.
    pub switch_room_id: Option<u32>,
}

impl Level {
    pub fn room(&self, id: u32) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Spawn point for the controllable entity: the middle walkable node.
    pub fn player_spawn(&self) -> Vec3 {
        self.walkable
            .get(self.walkable.len() / 2)
            .copied()
            .unwrap_or(Vec3::new(0.0, 1.0, 0.0))
    }

    fn room_containing(&self, pos: &Vec3) -> Option<&Room> {
        let (gx, gz) = self.occupancy.world_to_cell(pos);
        self.rooms.iter().find(|r| r.contains_cell(gx, gz))
    }
}

/// Generate a level from an ordered room-spec list.
pub fn generate(specs: &[RoomSpec], rng: &mut impl Rng) -> Level {
    let mut occupancy = OccupancyGrid::new(map::WIDTH, map::DEPTH);

    // Realize the rooms that fit; skip the rest without erroring.
    let mut rooms: Vec<Room> = Vec::new();
    for spec in specs {
        if !spec.fits(map::WIDTH, map::DEPTH) {
            log::info!(
                "room at ({}, {}) size {}x{} does not fit the grid, skipping",
                spec.x,
                spec.z,
                spec.width,
                spec.depth
            );
            continue;
        }
        let room = Room {
            id: rooms.len() as u32 + 1,
            x: spec.x,
            z: spec.z,
            width: spec.width,
            depth: spec.depth,
            features: spec.features.clone(),
        };
        for gx in room.x..room.x + room.width {
            for gz in room.z..room.z + room.depth {
                occupancy.carve(gx, gz);
            }
        }
        rooms.push(room);
    }

    // L-shaped corridor between each consecutive pair: horizontal run at
    // the first center's row, vertical run at the second center's column.
    for pair in rooms.windows(2) {
        let (c1x, c1z) = pair[0].center_cell();
        let (c2x, c2z) = pair[1].center_cell();
        for gx in c1x.min(c2x)..=c1x.max(c2x) {
            occupancy.carve(gx, c1z);
        }
        for gz in c1z.min(c2z)..=c1z.max(c2z) {
            occupancy.carve(c2x, gz);
        }
    }

    // Build the 3D occupancy: floor and ceiling everywhere, wall stacks on
    // wall cells, a walkable node at every open cell center.
    let mut walkable = Vec::new();
    for gx in 0..map::WIDTH {
        for gz in 0..map::DEPTH {
            let x = gx as f32 + map::OFFSET_X;
            let z = gz as f32 + map::OFFSET_Z;
            occupancy.add_block(x, 0.0, z);
            occupancy.add_block(x, map::WALL_HEIGHT as f32 + 1.0, z);
            if occupancy.cell(gx as i32, gz as i32) == CellKind::Wall {
                for y in 1..=map::WALL_HEIGHT {
                    occupancy.add_block(x, y as f32, z);
                }
            } else {
                walkable.push(Vec3::new(x, 1.0, z));
            }
        }
    }

    // The spawn room is whichever room holds the middle walkable node.
    let spawn_room_id = walkable.get(walkable.len() / 2).and_then(|node| {
        let gx = (node.x - map::OFFSET_X).round() as i32;
        let gz = (node.z - map::OFFSET_Z).round() as i32;
        rooms
            .iter()
            .find(|r| r.contains_cell(gx, gz))
            .map(|r| r.id)
    });

    let mut interactables = Vec::new();
    let mut furniture_cells: HashSet<(i32, i32)> = HashSet::new();

    // Cabinets: two stacked blocks at a fixed in-room offset, facing +z.
    for room in &rooms {
        if room.features.contains(&Feature::Cabinet) {
            let wx = room.x as f32 + map::OFFSET_X + 1.0;
            let wz = room.z as f32 + map::OFFSET_Z + 1.0;
            occupancy.add_block(wx, 1.0, wz);
            occupancy.add_block(wx, 2.0, wz);
            interactables.push(Interactable::Cabinet {
                pos: Vec3::new(wx, 1.0, wz),
                look_dir: Vec3::new(0.0, 0.0, 1.0),
            });
            furniture_cells.insert((wx as i32, wz as i32));
        }
    }

    // Light switch: bounded attempts to find a furniture-free cell along a
    // room's north wall. Absence is tolerated downstream.
    let mut switch_room_id = None;
    if !rooms.is_empty() {
        'attempts: for _ in 0..20 {
            let room = &rooms[rng.gen_range(0..rooms.len())];
            let cz = room.z as f32 + map::OFFSET_Z;
            for gx in room.x + 1..room.x + room.width - 1 {
                let wx = gx as f32 + map::OFFSET_X;
                if !furniture_cells.contains(&(wx as i32, (cz + 1.0) as i32)) {
                    interactables.push(Interactable::Switch {
                        pos: Vec3::new(wx, 1.5, cz + 0.6),
                        is_on: false,
                    });
                    switch_room_id = Some(room.id);
                    break 'attempts;
                }
            }
        }
        if switch_room_id.is_none() {
            log::info!("no free wall cell for the light switch, leaving it out");
        }
    }

    // Exit door: a random non-spawn room, midpoint of its south wall,
    // nudged inward. Non-collidable.
    let candidates: Vec<&Room> = rooms
        .iter()
        .filter(|r| Some(r.id) != spawn_room_id)
        .collect();
    if let Some(room) = pick(&candidates, rng) {
        let dx = (room.x as f32 + map::OFFSET_X + room.width as f32 / 2.0).floor();
        let dz = (room.z + room.depth) as f32 + map::OFFSET_Z;
        interactables.push(Interactable::Door {
            pos: Vec3::new(dx, 1.25, dz - 0.6),
        });
    } else {
        log::info!("no room other than spawn available, no exit door placed");
    }

    // Key and radar: independently chosen non-spawn rooms (they may
    // coincide), room center plus bounded jitter.
    if let Some(room) = pick(&candidates, rng) {
        let c = room.center_world();
        interactables.push(Interactable::Key {
            pos: Vec3::new(c.x + jitter(rng), 0.5, c.z + jitter(rng)),
        });
    }
    if let Some(room) = pick(&candidates, rng) {
        let c = room.center_world();
        interactables.push(Interactable::Radar {
            pos: Vec3::new(c.x + jitter(rng), 0.5, c.z + jitter(rng)),
        });
    }

    Level {
        occupancy,
        rooms,
        walkable,
        interactables,
        spawn_room_id,
        switch_room_id,
    }
}

fn pick<'a>(rooms: &[&'a Room], rng: &mut impl Rng) -> Option<&'a Room> {
    if rooms.is_empty() {
        None
    } else {
        Some(rooms[rng.gen_range(0..rooms.len())])
    }
}

/// Uniform jitter in [-1, 1).
fn jitter(rng: &mut impl Rng) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0
}
