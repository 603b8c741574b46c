//! Controllable-entity state and per-axis motion integration.
//!
//! Movement resolves one axis at a time (X, then Z, then Y) against the
//! occupancy model: a blocked axis zeroes that velocity component while the
//! others keep their progress, so a diagonal approach slides along the wall
//! instead of stopping dead. Horizontal passes use a lenient step height to
//! glide over floor seams; the vertical pass is exact so floor contact and
//! ground snapping stay stable.

use serde::{Deserialize, Serialize};

use crate::constants::{interact, player};
use crate::math::Vec3;
use crate::occupancy::OccupancyGrid;

/// Directional movement intent for one tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub run: bool,
}

/// What kind of feature the entity is concealed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcealmentKind {
    Cabinet,
}

impl ConcealmentKind {
    /// Whether this feature limits how far the occupant can turn to peek.
    pub fn restricts_peek(&self) -> bool {
        matches!(self, ConcealmentKind::Cabinet)
    }
}

/// The controllable entity. Mutated only by [`integrate`](PlayerState::integrate),
/// [`apply_look`](PlayerState::apply_look), and the interaction resolver.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub pos: Vec3,
    pub vel: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
    pub concealed: Option<ConcealmentKind>,
    /// Yaw at the moment concealment began; peek clamping is relative to it.
    pub base_yaw: f32,
    pub flashlight_on: bool,
    pub has_key: bool,
    pub has_radar: bool,
    pub has_won: bool,
    /// Look-delta multiplier (user setting, persisted elsewhere).
    pub look_sensitivity: f32,
}

impl PlayerState {
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            vel: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
            concealed: None,
            base_yaw: 0.0,
            flashlight_on: true,
            has_key: false,
            has_radar: false,
            has_won: false,
            look_sensitivity: 1.0,
        }
    }

    /// Unit forward vector for the current yaw (horizontal plane).
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub fn toggle_flashlight(&mut self) {
        self.flashlight_on = !self.flashlight_on;
    }

    /// Apply a raw look delta (e.g. mouse movement counts).
    ///
    /// Pitch clamps to straight up/down. While concealed in a feature that
    /// restricts peeking, yaw clamps to a cone around the entry yaw.
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        if let Some(kind) = self.concealed {
            if !kind.restricts_peek() {
                return;
            }
        }

        self.yaw -= dx * 0.002 * self.look_sensitivity;
        self.pitch -= dy * 0.002 * self.look_sensitivity;
        self.pitch = self
            .pitch
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);

        if let Some(kind) = self.concealed {
            if kind.restricts_peek() {
                let limit = interact::PEEK_LIMIT;
                self.yaw = self.yaw.clamp(self.base_yaw - limit, self.base_yaw + limit);
            }
        }
    }

    /// Advance one tick of locomotion. `dt` must already be clamped by the
    /// caller. While concealed, movement is suspended entirely.
    pub fn integrate(&mut self, intent: &MoveIntent, occ: &OccupancyGrid, dt: f32) {
        if self.concealed.is_some() {
            return;
        }

        let speed = if intent.run {
            player::SPEED * player::RUN_FACTOR
        } else {
            player::SPEED
        };

        let mut dir = Vec3::ZERO;
        let forward = self.forward();
        let right = self.right();
        if intent.forward {
            dir += forward;
        }
        if intent.back {
            dir += forward * -1.0;
        }
        if intent.left {
            dir += right * -1.0;
        }
        if intent.right {
            dir += right;
        }
        if dir.length() > 0.0 {
            dir = dir.normalize();
        }

        self.vel.x = dir.x * speed;
        self.vel.z = dir.z * speed;
        self.vel.y -= player::GRAVITY * dt;

        if self.on_ground && intent.jump {
            self.vel.y = player::JUMP_FORCE;
            self.on_ground = false;
        }

        // X axis.
        let mut next = self.pos;
        next.x += self.vel.x * dt;
        if !occ.box_blocked(&next, player::RADIUS, player::HEIGHT, player::STEP_HEIGHT) {
            self.pos.x = next.x;
        } else {
            self.vel.x = 0.0;
        }

        // Z axis.
        let mut next = self.pos;
        next.z += self.vel.z * dt;
        if !occ.box_blocked(&next, player::RADIUS, player::HEIGHT, player::STEP_HEIGHT) {
            self.pos.z = next.z;
        } else {
            self.vel.z = 0.0;
        }

        // Y axis, exact step height so floor contact is detected.
        let mut next = self.pos;
        next.y += self.vel.y * dt;
        if !occ.box_blocked(&next, player::RADIUS, player::HEIGHT, 0.0) {
            self.pos.y = next.y;
            self.on_ground = false;
        } else {
            if self.vel.y < 0.0 {
                self.on_ground = true;
            }
            self.vel.y = 0.0;
            if self.on_ground {
                // Block tops sit at integer layer + 0.5; snap to the nearest
                // one so floating-point drift never accumulates as jitter.
                self.pos.y = (self.pos.y - 0.5).round() + 0.5;
            }
        }

        // Runaway-fall recovery, not an error.
        if self.pos.y < player::FALL_FLOOR {
            self.pos.y = player::RECOVER_Y;
            self.vel.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::map;

    /// 12×12 grid with an open interior, fully built floor/walls/ceiling.
    fn arena() -> OccupancyGrid {
        let mut occ = OccupancyGrid::new(12, 12);
        for gx in 1..11 {
            for gz in 1..11 {
                occ.carve(gx, gz);
            }
        }
        for gx in 0..12usize {
            for gz in 0..12usize {
                let x = gx as f32 + map::OFFSET_X;
                let z = gz as f32 + map::OFFSET_Z;
                occ.add_block(x, 0.0, z);
                occ.add_block(x, map::WALL_HEIGHT as f32 + 1.0, z);
                if occ.cell(gx as i32, gz as i32) == crate::occupancy::CellKind::Wall {
                    for y in 1..=map::WALL_HEIGHT {
                        occ.add_block(x, y as f32, z);
                    }
                }
            }
        }
        occ
    }

    fn spawn(occ: &OccupancyGrid) -> PlayerState {
        PlayerState::at(occ.cell_center(6, 6, 1.0))
    }

    #[test]
    fn settles_onto_floor() {
        let occ = arena();
        let mut p = spawn(&occ);
        p.pos.y = 1.5;
        for _ in 0..60 {
            p.integrate(&MoveIntent::default(), &occ, 1.0 / 60.0);
        }
        assert!(p.on_ground);
        // Floor block top is at y = 0.5.
        assert!((p.pos.y - 0.5).abs() < 1e-3);
    }

    #[test]
    fn walks_forward_until_wall() {
        let occ = arena();
        let mut p = spawn(&occ);
        let intent = MoveIntent { forward: true, ..Default::default() };
        // Facing -z at yaw 0; the wall ring is at gz=0.
        for _ in 0..600 {
            p.integrate(&intent, &occ, 1.0 / 60.0);
        }
        let wall_face = occ.cell_center(6, 0, 0.0).z + 0.5;
        assert!(p.pos.z > wall_face, "must not tunnel into the wall");
        assert!(p.pos.z < wall_face + 1.0, "must end up against the wall");
        // Never inside any block (resting contact with the floor aside).
        assert!(!occ.box_blocked(&p.pos, player::RADIUS, player::HEIGHT, 0.01));
    }

    #[test]
    fn slides_along_wall_on_diagonal_approach() {
        let occ = arena();
        let mut p = spawn(&occ);
        let intent = MoveIntent { forward: true, right: true, ..Default::default() };
        let start_x = p.pos.x;
        for _ in 0..600 {
            p.integrate(&intent, &occ, 1.0 / 60.0);
        }
        // Z is blocked by the wall but X keeps sliding.
        assert!(p.pos.x > start_x + 2.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let occ = arena();
        let mut p = spawn(&occ);
        p.on_ground = false;
        p.vel.y = 0.0;
        p.integrate(&MoveIntent { jump: true, ..Default::default() }, &occ, 0.016);
        assert!(p.vel.y <= 0.0, "airborne jump must not fire");

        // Settle, then jump.
        for _ in 0..60 {
            p.integrate(&MoveIntent::default(), &occ, 1.0 / 60.0);
        }
        assert!(p.on_ground);
        p.integrate(&MoveIntent { jump: true, ..Default::default() }, &occ, 0.016);
        assert!(p.vel.y > 0.0);
        assert!(!p.on_ground);
    }

    #[test]
    fn fall_recovery_resets_elevation() {
        let occ = OccupancyGrid::new(4, 4); // no floor blocks at all
        let mut p = PlayerState::at(Vec3::new(50.0, 1.0, 50.0));
        for _ in 0..240 {
            p.integrate(&MoveIntent::default(), &occ, 1.0 / 60.0);
        }
        assert!(p.pos.y > player::FALL_FLOOR);
    }

    #[test]
    fn concealment_suspends_movement() {
        let occ = arena();
        let mut p = spawn(&occ);
        p.concealed = Some(ConcealmentKind::Cabinet);
        let before = p.pos;
        p.integrate(&MoveIntent { forward: true, ..Default::default() }, &occ, 0.1);
        assert_eq!(p.pos, before);
    }

    #[test]
    fn concealed_yaw_clamps_to_cone() {
        let mut p = PlayerState::at(Vec3::ZERO);
        p.concealed = Some(ConcealmentKind::Cabinet);
        p.base_yaw = 1.0;
        p.yaw = 1.0;
        for _ in 0..100 {
            p.apply_look(500.0, 0.0);
        }
        assert!(p.yaw >= p.base_yaw - interact::PEEK_LIMIT - 1e-6);
        for _ in 0..200 {
            p.apply_look(-500.0, 0.0);
        }
        assert!(p.yaw <= p.base_yaw + interact::PEEK_LIMIT + 1e-6);
    }

    #[test]
    fn pitch_clamps_vertically() {
        let mut p = PlayerState::at(Vec3::ZERO);
        for _ in 0..100 {
            p.apply_look(0.0, -500.0);
        }
        assert!(p.pitch <= std::f32::consts::FRAC_PI_2 + 1e-6);
    }
}
