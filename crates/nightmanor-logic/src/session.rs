//! One playable session: the generated level, both entities, and the
//! frame-stepped update that external collaborators drive.
//!
//! Everything runs to completion inside [`Session::tick`] — no suspension,
//! no background work. The session owns all shared state; rendering, audio,
//! and UI read the per-tick snapshot and feed back discrete inputs.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentState, TargetView};
use crate::constants::{interact, tick};
use crate::generation::{generate, Level};
use crate::interaction::{self, InteractionEvent};
use crate::layout::RoomSpec;
use crate::math::Vec3;
use crate::player::{MoveIntent, PlayerState};

/// Discrete inputs for one tick, supplied by the platform layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickInput {
    pub movement: MoveIntent,
    /// Raw look deltas (e.g. mouse movement counts).
    pub look_dx: f32,
    pub look_dy: f32,
    pub interact: bool,
    pub toggle_flashlight: bool,
}

/// Snapshot handed back to rendering/audio/UI after each tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TickOutput {
    pub player_pos: Vec3,
    pub player_yaw: f32,
    pub player_pitch: f32,
    pub agent_pos: Vec3,
    pub agent_yaw: f32,
    pub concealed: bool,
    pub lights_on: bool,
    pub flashlight_on: bool,
    pub has_key: bool,
    pub has_radar: bool,
    /// 0 when the agent is far, rising to 1 at contact (drives heartbeat).
    pub threat_level: f32,
    /// Whether an interactable is in trigger range (drives the prompt).
    pub interact_available: bool,
    pub event: Option<InteractionEvent>,
    pub killed: bool,
    pub won: bool,
}

/// Terminal state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Won,
    Caught,
}

/// A running simulation. Created once per playthrough.
pub struct Session {
    pub level: Level,
    pub player: PlayerState,
    pub agent: AgentState,
    pub lights_on: bool,
    sim_time: f32,
    outcome: Outcome,
    rng: StdRng,
}

impl Session {
    /// Generate a level from the layout and place both entities: the
    /// controllable entity at the middle walkable node, the agent at the
    /// node farthest from it.
    pub fn new(specs: &[RoomSpec], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let level = generate(specs, &mut rng);
        let player = PlayerState::at(level.player_spawn());
        let agent = AgentState::spawn(&level.walkable, &player.pos);
        Self {
            level,
            player,
            agent,
            lights_on: false,
            sim_time: 0.0,
            outcome: Outcome::Ongoing,
            rng,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn spawn_room_id(&self) -> Option<u32> {
        self.level.spawn_room_id
    }

    pub fn switch_room_id(&self) -> Option<u32> {
        self.level.switch_room_id
    }

    /// Advance the simulation by one frame. `dt` is clamped to avoid
    /// large-step tunneling. After the session ends the snapshot freezes.
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> TickOutput {
        if self.outcome != Outcome::Ongoing {
            return self.snapshot(None);
        }
        let dt = dt.min(tick::MAX_DT);
        self.sim_time += dt;

        self.player.apply_look(input.look_dx, input.look_dy);
        if input.toggle_flashlight {
            self.player.toggle_flashlight();
        }

        let event = if input.interact {
            interaction::trigger(
                &mut self.player,
                &mut self.level.interactables,
                &mut self.lights_on,
            )
        } else {
            None
        };

        self.player
            .integrate(&input.movement, &self.level.occupancy, dt);
        if self.player.has_won {
            self.outcome = Outcome::Won;
        }

        let target = TargetView {
            pos: self.player.pos,
            concealed: self.player.concealed.is_some(),
        };
        let killed = self.agent.update(
            &self.level.occupancy,
            &self.level.walkable,
            &target,
            self.sim_time,
            dt,
            &mut self.rng,
        );
        if killed && self.outcome == Outcome::Ongoing {
            self.outcome = Outcome::Caught;
        }

        self.snapshot(event)
    }

    fn snapshot(&self, event: Option<InteractionEvent>) -> TickOutput {
        let threat_level = if self.outcome == Outcome::Ongoing {
            let dist = self.player.pos.distance(&self.agent.pos);
            (1.0 - dist / interact::THREAT_RANGE).clamp(0.0, 1.0)
        } else {
            0.0
        };
        TickOutput {
            player_pos: self.player.pos,
            player_yaw: self.player.yaw,
            player_pitch: self.player.pitch,
            agent_pos: self.agent.pos,
            agent_yaw: self.agent.yaw,
            concealed: self.player.concealed.is_some(),
            lights_on: self.lights_on,
            flashlight_on: self.player.flashlight_on,
            has_key: self.player.has_key,
            has_radar: self.player.has_radar,
            threat_level,
            interact_available: interaction::any_in_range(
                &self.player.pos,
                &self.level.interactables,
            ),
            event,
            killed: self.outcome == Outcome::Caught,
            won: self.outcome == Outcome::Won,
        }
    }
}
