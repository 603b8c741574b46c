//! Simulation tunables — grid dimensions, movement rates, perception radii.
//!
//! Plain constants with no engine dependency. Both the logic modules and
//! the native simtest use these.

/// Grid/world dimensions.
pub mod map {
    /// Grid width in cells (x axis).
    pub const WIDTH: usize = 80;
    /// Grid depth in cells (z axis).
    pub const DEPTH: usize = 80;
    /// Wall blocks are stacked from y=1 through this height inclusive.
    pub const WALL_HEIGHT: i32 = 3;
    /// World x of grid column 0 (the map is centered on the origin).
    pub const OFFSET_X: f32 = -(WIDTH as f32) / 2.0;
    /// World z of grid row 0.
    pub const OFFSET_Z: f32 = -(DEPTH as f32) / 2.0;
}

/// Pathfinding bounds.
pub mod path {
    /// Hard cap on search iterations per call.
    pub const MAX_ITERATIONS: u32 = 2000;
}

/// Pursuing-agent perception and movement.
pub mod agent {
    /// Base patrol speed, units/second.
    pub const SPEED: f32 = 2.8;
    /// Chase speed multiplier over patrol speed.
    pub const CHASE_SPEED_FACTOR: f32 = 1.5;
    /// Maximum distance at which the target can be seen.
    pub const DETECTION_RADIUS: f32 = 20.0;
    /// Minimum dot(forward, to-target) for the target to be in the cone.
    pub const VISION_CONE_DOT: f32 = 0.3;
    /// Straight-line distance below which a non-concealed target is caught.
    pub const KILL_RADIUS: f32 = 1.0;
    /// Seconds between chase re-plans.
    pub const REPLAN_INTERVAL: f32 = 0.5;
    /// Distance at which the current waypoint counts as reached.
    pub const WAYPOINT_RADIUS: f32 = 0.1;
    /// Distance at which the chase target counts as reached.
    pub const ARRIVAL_RADIUS: f32 = 1.0;
    /// Eye height above the agent's base position for occlusion rays.
    pub const EYE_HEIGHT: f32 = 1.5;
}

/// Controllable-entity locomotion.
pub mod player {
    /// Base walk speed, units/second.
    pub const SPEED: f32 = 6.0;
    /// Run multiplier while the run modifier is held.
    pub const RUN_FACTOR: f32 = 1.5;
    /// Upward velocity applied on jump.
    pub const JUMP_FORCE: f32 = 10.0;
    /// Downward acceleration, units/second².
    pub const GRAVITY: f32 = 25.0;
    /// Collision box height.
    pub const HEIGHT: f32 = 1.75;
    /// Collision box horizontal half-extent.
    pub const RADIUS: f32 = 0.25;
    /// Raised lower face for horizontal collision passes (steps over seams).
    pub const STEP_HEIGHT: f32 = 0.5;
    /// Below this y the entity is teleported back up.
    pub const FALL_FLOOR: f32 = -10.0;
    /// Recovery elevation after a runaway fall.
    pub const RECOVER_Y: f32 = 10.0;
}

/// Interaction and presentation thresholds.
pub mod interact {
    /// Trigger radius around the controllable entity.
    pub const RADIUS: f32 = 2.0;
    /// Yaw clamp half-angle while concealed in a cabinet.
    pub const PEEK_LIMIT: f32 = std::f32::consts::PI / 2.2;
    /// Displacement applied when leaving concealment.
    pub const EXIT_OFFSET: (f32, f32, f32) = (1.0, 0.0, 1.0);
    /// Agent distance at which the threat-level output reaches zero.
    pub const THREAT_RANGE: f32 = 15.0;
}

/// Frame stepping.
pub mod tick {
    /// Upper bound on per-tick delta time, seconds.
    pub const MAX_DT: f32 = 0.1;
}
