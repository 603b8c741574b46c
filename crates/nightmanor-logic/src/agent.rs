//! The pursuing agent — perception, patrol/chase state machine, and
//! path-following movement.
//!
//! Perception and movement both query the same occupancy model the level
//! generator built: sighting rays march the block map, paths come from the
//! grid search. The kill check is independent of the state machine — a
//! close, non-concealed target is caught regardless of line of sight.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::agent;
use crate::math::Vec3;
use crate::occupancy::OccupancyGrid;
use crate::pathfinding::find_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMode {
    Patrol,
    Chase,
}

/// What the agent needs to know about its target each tick.
#[derive(Debug, Clone, Copy)]
pub struct TargetView {
    pub pos: Vec3,
    pub concealed: bool,
}

/// The pursuing entity. Mutated only by [`update`](AgentState::update).
#[derive(Debug, Clone)]
pub struct AgentState {
    pub pos: Vec3,
    /// Facing angle; forward is `(sin yaw, 0, cos yaw)`.
    pub yaw: f32,
    pub mode: AgentMode,
    pub path: Vec<Vec3>,
    pub path_cursor: usize,
    /// Last perceived target position (chase) or wander goal (patrol).
    pub target: Vec3,
    last_replan: f32,
}

impl AgentState {
    /// Spawn at the walkable node farthest from the target's start, as far
    /// from the opening encounter as the level allows.
    pub fn spawn(walkable: &[Vec3], target_pos: &Vec3) -> Self {
        let mut pos = Vec3::new(0.0, 1.0, 0.0);
        let mut max_dist = -1.0;
        for node in walkable {
            let d = node.distance(target_pos);
            if d > max_dist {
                max_dist = d;
                pos = *node;
            }
        }
        pos.y = 1.0;
        Self {
            pos,
            yaw: 0.0,
            mode: AgentMode::Patrol,
            path: Vec::new(),
            path_cursor: 0,
            target: pos,
            // Far enough in the past that the first chase tick plans at once.
            last_replan: -2.0 * agent::REPLAN_INTERVAL,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// The vision predicate: in range, inside the forward cone, and with no
    /// occluding block strictly closer than the target.
    fn can_see(&self, occ: &OccupancyGrid, target: &TargetView) -> bool {
        if target.concealed {
            return false;
        }
        if self.pos.distance(&target.pos) >= agent::DETECTION_RADIUS {
            return false;
        }
        let to_target = (target.pos - self.pos).normalize();
        if to_target.dot(&self.forward()) <= agent::VISION_CONE_DOT {
            return false;
        }
        let eye = self.pos + Vec3::new(0.0, agent::EYE_HEIGHT, 0.0);
        !occ.segment_occluded(&eye, &target.pos)
    }

    /// Advance one tick. `now` is accumulated simulation time (seconds),
    /// supplied by the session so re-plan cadence is deterministic.
    ///
    /// Returns whether the target was caught this tick.
    pub fn update(
        &mut self,
        occ: &OccupancyGrid,
        walkable: &[Vec3],
        target: &TargetView,
        now: f32,
        dt: f32,
        rng: &mut impl Rng,
    ) -> bool {
        let dist = self.pos.distance(&target.pos);

        // Perception and state transitions.
        if self.can_see(occ, target) {
            self.mode = AgentMode::Chase;
            self.target = target.pos;
        } else if self.mode == AgentMode::Chase
            && self.pos.distance(&self.target) < agent::ARRIVAL_RADIUS
        {
            // Reached the last known position without re-acquiring sight.
            self.mode = AgentMode::Patrol;
            self.path.clear();
            self.path_cursor = 0;
        }

        // Planning.
        match self.mode {
            AgentMode::Chase => {
                // Re-plan on a fixed cadence to track a moving target.
                if now - self.last_replan > agent::REPLAN_INTERVAL {
                    self.path = find_path(occ, &self.pos, &self.target);
                    self.path_cursor = 0;
                    self.last_replan = now;
                }
            }
            AgentMode::Patrol => {
                if (self.path.is_empty() || self.path_cursor >= self.path.len())
                    && !walkable.is_empty()
                {
                    self.target = walkable[rng.gen_range(0..walkable.len())];
                    self.path = find_path(occ, &self.pos, &self.target);
                    self.path_cursor = 0;
                }
            }
        }

        // Follow the path.
        if self.path_cursor < self.path.len() {
            let waypoint = self.path[self.path_cursor];
            let to_waypoint = (waypoint - self.pos).horizontal();
            if to_waypoint.length() < agent::WAYPOINT_RADIUS {
                self.path_cursor += 1;
            } else {
                let dir = to_waypoint.normalize();
                self.yaw = dir.x.atan2(dir.z);
                let speed = match self.mode {
                    AgentMode::Chase => agent::SPEED * agent::CHASE_SPEED_FACTOR,
                    AgentMode::Patrol => agent::SPEED,
                };
                self.pos += dir * (speed * dt);
            }
        }

        // Kill check, independent of the state machine.
        !target.concealed && dist < agent::KILL_RADIUS
    }
}
