//! World features the controllable entity can trigger, and the proximity
//! dispatch that resolves a trigger into state changes plus a typed event.
//!
//! Each interactable is an enum variant carrying exactly the payload its
//! kind needs, so there are no runtime field-presence checks. Key and radar
//! pickups leave the active list on collection; everything else persists
//! for the session.

use serde::{Deserialize, Serialize};

use crate::constants::interact;
use crate::math::Vec3;
use crate::player::{ConcealmentKind, PlayerState};

/// A triggerable world feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Interactable {
    /// Concealment feature. `look_dir` is the direction it faces outward.
    Cabinet { pos: Vec3, look_dir: Vec3 },
    /// Illumination toggle. `is_on` is the presentation handle state.
    Switch { pos: Vec3, is_on: bool },
    Key { pos: Vec3 },
    Radar { pos: Vec3 },
    /// The exit. Opens only with the key.
    Door { pos: Vec3 },
}

impl Interactable {
    pub fn pos(&self) -> Vec3 {
        match self {
            Interactable::Cabinet { pos, .. }
            | Interactable::Switch { pos, .. }
            | Interactable::Key { pos }
            | Interactable::Radar { pos }
            | Interactable::Door { pos } => *pos,
        }
    }
}

/// What a resolved trigger did, for the audio/UI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionEvent {
    /// Entered concealment.
    Concealed,
    /// Left concealment.
    Revealed,
    SwitchToggled { on: bool },
    KeyCollected,
    RadarCollected,
    /// Tried the exit without the key.
    DoorLocked,
    /// Opened the exit with the key.
    Escaped,
}

/// Whether any interactable lies within trigger range (drives the prompt UI).
pub fn any_in_range(pos: &Vec3, items: &[Interactable]) -> bool {
    items
        .iter()
        .any(|item| pos.distance(&item.pos()) < interact::RADIUS)
}

/// Resolve one interaction trigger.
///
/// A concealed entity always exits first: it pops out displaced by a fixed
/// offset so the same feature does not immediately re-trigger. Otherwise
/// the nearest interactable within range is dispatched by kind. Returns
/// `None` when nothing was in range.
pub fn trigger(
    player: &mut PlayerState,
    items: &mut Vec<Interactable>,
    lights_on: &mut bool,
) -> Option<InteractionEvent> {
    if player.concealed.is_some() {
        player.concealed = None;
        let (dx, dy, dz) = interact::EXIT_OFFSET;
        player.pos += Vec3::new(dx, dy, dz);
        return Some(InteractionEvent::Revealed);
    }

    let nearest = items
        .iter()
        .enumerate()
        .map(|(i, item)| (i, player.pos.distance(&item.pos())))
        .filter(|(_, d)| *d < interact::RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)?;

    match &mut items[nearest] {
        Interactable::Cabinet { pos, look_dir } => {
            player.concealed = Some(ConcealmentKind::Cabinet);
            player.pos = *pos;
            // Face outward, the way the feature opens.
            player.yaw = look_dir.x.atan2(look_dir.z) + std::f32::consts::PI;
            player.base_yaw = player.yaw;
            player.pitch = 0.0;
            Some(InteractionEvent::Concealed)
        }
        Interactable::Switch { is_on, .. } => {
            *lights_on = !*lights_on;
            *is_on = *lights_on;
            Some(InteractionEvent::SwitchToggled { on: *lights_on })
        }
        Interactable::Key { .. } => {
            player.has_key = true;
            items.remove(nearest);
            Some(InteractionEvent::KeyCollected)
        }
        Interactable::Radar { .. } => {
            player.has_radar = true;
            items.remove(nearest);
            Some(InteractionEvent::RadarCollected)
        }
        Interactable::Door { .. } => {
            if player.has_key {
                player.has_won = true;
                Some(InteractionEvent::Escaped)
            } else {
                Some(InteractionEvent::DoorLocked)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at_origin() -> PlayerState {
        PlayerState::at(Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn nothing_in_range_is_none() {
        let mut player = player_at_origin();
        let mut items = vec![Interactable::Key { pos: Vec3::new(10.0, 0.5, 0.0) }];
        let mut lights = false;
        assert_eq!(trigger(&mut player, &mut items, &mut lights), None);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn nearest_item_wins() {
        let mut player = player_at_origin();
        let mut items = vec![
            Interactable::Key { pos: Vec3::new(1.5, 0.5, 0.0) },
            Interactable::Radar { pos: Vec3::new(0.5, 0.5, 0.0) },
        ];
        let mut lights = false;
        let event = trigger(&mut player, &mut items, &mut lights);
        assert_eq!(event, Some(InteractionEvent::RadarCollected));
        assert!(player.has_radar);
        assert!(!player.has_key);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn cabinet_conceals_and_snaps() {
        let mut player = player_at_origin();
        let cab_pos = Vec3::new(1.0, 1.0, 1.0);
        let mut items = vec![Interactable::Cabinet {
            pos: cab_pos,
            look_dir: Vec3::new(0.0, 0.0, 1.0),
        }];
        let mut lights = false;
        let event = trigger(&mut player, &mut items, &mut lights);
        assert_eq!(event, Some(InteractionEvent::Concealed));
        assert_eq!(player.concealed, Some(ConcealmentKind::Cabinet));
        assert_eq!(player.pos, cab_pos);
        assert!((player.yaw - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(player.base_yaw, player.yaw);
    }

    #[test]
    fn exit_displaces_to_avoid_retrigger() {
        let mut player = player_at_origin();
        let mut items = vec![Interactable::Cabinet {
            pos: Vec3::new(0.0, 1.0, 0.0),
            look_dir: Vec3::new(0.0, 0.0, 1.0),
        }];
        let mut lights = false;
        trigger(&mut player, &mut items, &mut lights);
        let event = trigger(&mut player, &mut items, &mut lights);
        assert_eq!(event, Some(InteractionEvent::Revealed));
        assert!(player.concealed.is_none());
        assert!(player.pos.distance(&Vec3::new(0.0, 1.0, 0.0)) > 1.0);
    }

    #[test]
    fn switch_flips_global_flag_and_handle() {
        let mut player = player_at_origin();
        let mut items = vec![Interactable::Switch {
            pos: Vec3::new(1.0, 1.5, 0.0),
            is_on: false,
        }];
        let mut lights = false;
        let event = trigger(&mut player, &mut items, &mut lights);
        assert_eq!(event, Some(InteractionEvent::SwitchToggled { on: true }));
        assert!(lights);
        assert!(matches!(items[0], Interactable::Switch { is_on: true, .. }));

        let event = trigger(&mut player, &mut items, &mut lights);
        assert_eq!(event, Some(InteractionEvent::SwitchToggled { on: false }));
        assert!(!lights);
    }

    #[test]
    fn door_locked_without_key_then_opens() {
        let mut player = player_at_origin();
        let mut items = vec![Interactable::Door { pos: Vec3::new(1.0, 1.25, 0.0) }];
        let mut lights = false;
        assert_eq!(
            trigger(&mut player, &mut items, &mut lights),
            Some(InteractionEvent::DoorLocked)
        );
        assert!(!player.has_won);

        player.has_key = true;
        assert_eq!(
            trigger(&mut player, &mut items, &mut lights),
            Some(InteractionEvent::Escaped)
        );
        assert!(player.has_won);
        // The door persists either way.
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn pickups_leave_the_active_list() {
        let mut player = player_at_origin();
        let mut items = vec![
            Interactable::Key { pos: Vec3::new(0.5, 0.5, 0.0) },
            Interactable::Door { pos: Vec3::new(20.0, 1.25, 0.0) },
        ];
        let mut lights = false;
        trigger(&mut player, &mut items, &mut lights);
        assert!(player.has_key);
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Interactable::Door { .. }));
    }
}
