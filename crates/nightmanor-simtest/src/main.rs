//! Night Manor Headless Simulation Harness
//!
//! Validates the simulation core end to end without a renderer: generation
//! on the reference layout, pathfinding, agent perception, collision, and
//! a scripted playthrough. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p nightmanor-simtest
//!   cargo run -p nightmanor-simtest -- --verbose

use nightmanor_logic::agent::{AgentMode, AgentState, TargetView};
use nightmanor_logic::constants::{map, player as player_consts};
use nightmanor_logic::generation::{generate, Level};
use nightmanor_logic::interaction::{Interactable, InteractionEvent};
use nightmanor_logic::layout::RoomSpec;
use nightmanor_logic::math::Vec3;
use nightmanor_logic::occupancy::CellKind;
use nightmanor_logic::pathfinding::find_path;
use nightmanor_logic::player::MoveIntent;
use nightmanor_logic::session::{Outcome, Session, TickInput};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Reference layout (same JSON a front end would ship) ─────────────────
const LAYOUT_JSON: &str = include_str!("../../../data/manor_layout.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult { name: name.into(), passed, detail }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Night Manor Simulation Harness ===\n");

    let layout: Vec<RoomSpec> = match serde_json::from_str(LAYOUT_JSON) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("layout JSON parse error: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();
    results.extend(validate_generation(&layout));
    results.extend(validate_pathfinding(&layout));
    results.extend(validate_perception(&layout));
    results.extend(validate_collision(&layout));
    results.extend(validate_playthrough(&layout));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn reference_level(layout: &[RoomSpec], seed: u64) -> Level {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(layout, &mut rng)
}

// ── 1. Generation ───────────────────────────────────────────────────────

fn validate_generation(layout: &[RoomSpec]) -> Vec<TestResult> {
    println!("--- Generation ---");
    let mut results = Vec::new();

    let level = reference_level(layout, 1);

    results.push(check(
        "ten_rooms_realized",
        level.rooms.len() == 10 && level.rooms.iter().enumerate().all(|(i, r)| r.id == i as u32 + 1),
        format!("{} rooms, ids dense from 1", level.rooms.len()),
    ));

    let open_count = (0..map::WIDTH)
        .flat_map(|gx| (0..map::DEPTH).map(move |gz| (gx, gz)))
        .filter(|&(gx, gz)| level.occupancy.cell(gx as i32, gz as i32) == CellKind::Open)
        .count();
    results.push(check(
        "walkable_equals_open_cells",
        level.walkable.len() == open_count,
        format!("{} walkable vs {} open", level.walkable.len(), open_count),
    ));

    let in_bounds = level.rooms.iter().all(|r| {
        r.x + r.width < map::WIDTH && r.z + r.depth < map::DEPTH
    });
    results.push(check("rooms_in_bounds", in_bounds, "all rectangles inside the grid".into()));

    // Spawn and door rooms must differ across many generations.
    let mut always_differ = true;
    for seed in 0..50 {
        let level = reference_level(layout, seed);
        let spawn = level.spawn_room_id;
        let door_room = level.interactables.iter().find_map(|i| match i {
            Interactable::Door { pos } => {
                let inside = Vec3::new(pos.x, pos.y, pos.z - 1.0);
                let (gx, gz) = level.occupancy.world_to_cell(&inside);
                level.rooms.iter().find(|r| r.contains_cell(gx, gz)).map(|r| r.id)
            }
            _ => None,
        });
        if spawn.is_none() || door_room.is_none() || spawn == door_room {
            always_differ = false;
            break;
        }
    }
    results.push(check(
        "door_room_never_spawn_room",
        always_differ,
        "checked 50 seeds".into(),
    ));

    let has_switch = level.switch_room_id.is_some()
        && level.interactables.iter().any(|i| matches!(i, Interactable::Switch { .. }));
    results.push(check(
        "switch_placed_in_reference_layout",
        has_switch,
        format!("switch room {:?}", level.switch_room_id),
    ));

    results
}

// ── 2. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(layout: &[RoomSpec]) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    let level = reference_level(layout, 2);
    let spawn = level.player_spawn();

    results.push(check(
        "identity_path_empty",
        find_path(&level.occupancy, &spawn, &spawn).is_empty(),
        "start == goal".into(),
    ));

    // Every room reachable from spawn under the consecutive-corridor chain.
    let mut all_reachable = true;
    let mut longest = 0usize;
    for room in &level.rooms {
        let (cx, cz) = room.center_cell();
        let goal = level.occupancy.cell_center(cx, cz, 1.0);
        let path = find_path(&level.occupancy, &spawn, &goal);
        let reached = path
            .last()
            .map(|p| {
                let (gx, gz) = level.occupancy.world_to_cell(p);
                room.contains_cell(gx, gz)
            })
            .unwrap_or(Some(room.id) == level.spawn_room_id);
        longest = longest.max(path.len());
        if !reached {
            all_reachable = false;
        }
    }
    results.push(check(
        "every_room_reachable_from_spawn",
        all_reachable,
        format!("longest path {} waypoints", longest),
    ));

    // Steps are single grid cells.
    let far_room = level.rooms.last().unwrap();
    let (cx, cz) = far_room.center_cell();
    let goal = level.occupancy.cell_center(cx, cz, 1.0);
    let path = find_path(&level.occupancy, &spawn, &goal);
    let mut prev = level.occupancy.world_to_cell(&spawn);
    let unit_steps = path.iter().all(|wp| {
        let cell = level.occupancy.world_to_cell(wp);
        let ok = prev.0.abs_diff(cell.0) + prev.1.abs_diff(cell.1) == 1;
        prev = cell;
        ok
    });
    results.push(check(
        "waypoints_are_unit_steps",
        unit_steps,
        format!("{} waypoints", path.len()),
    ));

    // An unreachable goal still terminates with a best-effort result.
    let outside = Vec3::new(
        map::OFFSET_X - 5.0, // beyond the grid entirely
        1.0,
        map::OFFSET_Z - 5.0,
    );
    let path = find_path(&level.occupancy, &spawn, &outside);
    results.push(check(
        "unreachable_goal_terminates",
        true,
        format!("returned {} waypoints", path.len()),
    ));

    results
}

// ── 3. Agent perception ─────────────────────────────────────────────────

fn validate_perception(layout: &[RoomSpec]) -> Vec<TestResult> {
    println!("--- Perception ---");
    let mut results = Vec::new();

    let level = reference_level(layout, 3);
    let room = level.room(level.spawn_room_id.unwrap()).unwrap();
    let (cx, cz) = room.center_cell();
    let agent_pos = level.occupancy.cell_center(cx, cz, 1.0);
    let target_pos = level.occupancy.cell_center(cx + 3, cz, 1.0);

    let mut rng = StdRng::seed_from_u64(0);

    // Exposed target in the cone: chase.
    let mut agent = AgentState::spawn(&[agent_pos], &Vec3::ZERO);
    let dir = (target_pos - agent.pos).normalize();
    agent.yaw = dir.x.atan2(dir.z);
    agent.update(
        &level.occupancy,
        &level.walkable,
        &TargetView { pos: target_pos, concealed: false },
        0.0,
        0.016,
        &mut rng,
    );
    results.push(check(
        "visible_target_triggers_chase",
        agent.mode == AgentMode::Chase,
        format!("mode {:?}", agent.mode),
    ));

    // Concealed target at the same spot: no chase, no kill ever.
    let mut agent = AgentState::spawn(&[agent_pos], &Vec3::ZERO);
    agent.yaw = dir.x.atan2(dir.z);
    let killed = agent.update(
        &level.occupancy,
        &level.walkable,
        &TargetView { pos: target_pos, concealed: true },
        0.0,
        0.016,
        &mut rng,
    );
    results.push(check(
        "concealed_target_never_chased",
        agent.mode == AgentMode::Patrol && !killed,
        format!("mode {:?}", agent.mode),
    ));

    results
}

// ── 4. Collision ────────────────────────────────────────────────────────

fn validate_collision(layout: &[RoomSpec]) -> Vec<TestResult> {
    println!("--- Collision ---");
    let mut results = Vec::new();

    // Run straight at a wall for ten seconds; the integrator must end
    // resting against it, never inside any block.
    let mut session = Session::new(layout, 4);
    let input = TickInput {
        movement: MoveIntent { forward: true, run: true, ..Default::default() },
        ..Default::default()
    };
    let mut overlapped = false;
    for _ in 0..600 {
        session.tick(&input, 1.0 / 60.0);
        // Small step height excludes the resting floor contact itself.
        if session.level.occupancy.box_blocked(
            &session.player.pos,
            player_consts::RADIUS,
            player_consts::HEIGHT,
            0.01,
        ) {
            overlapped = true;
            break;
        }
        if session.outcome() != Outcome::Ongoing {
            break; // the agent got there first; collision held until then
        }
    }
    results.push(check(
        "player_never_inside_a_block",
        !overlapped,
        format!("final pos {:?}", session.player.pos),
    ));

    results
}

// ── 5. Scripted playthrough ─────────────────────────────────────────────

fn validate_playthrough(layout: &[RoomSpec]) -> Vec<TestResult> {
    println!("--- Playthrough ---");
    let mut results = Vec::new();

    // Teleport-assisted run: collect the key, then open the exit. Exercises
    // the full tick path (interaction, win transition, frozen snapshot).
    let mut session = Session::new(layout, 5);
    let key_pos = session.level.interactables.iter().find_map(|i| match i {
        Interactable::Key { pos } => Some(*pos),
        _ => None,
    });
    let door_pos = session.level.interactables.iter().find_map(|i| match i {
        Interactable::Door { pos } => Some(*pos),
        _ => None,
    });

    match (key_pos, door_pos) {
        (Some(key), Some(door)) => {
            session.player.pos = key;
            let out = session.tick(
                &TickInput { interact: true, ..Default::default() },
                1.0 / 60.0,
            );
            let picked = out.event == Some(InteractionEvent::KeyCollected) && out.has_key;
            results.push(check("key_collected", picked, format!("event {:?}", out.event)));

            session.player.pos = door;
            let out = session.tick(
                &TickInput { interact: true, ..Default::default() },
                1.0 / 60.0,
            );
            results.push(check(
                "door_opens_with_key",
                out.won && session.outcome() == Outcome::Won,
                format!("event {:?}", out.event),
            ));
        }
        _ => {
            results.push(check(
                "key_and_door_present",
                false,
                "reference layout must place both".into(),
            ));
        }
    }

    // Undisturbed session keeps ticking indefinitely without panicking.
    let mut session = Session::new(layout, 6);
    let mut ticks = 0u32;
    for _ in 0..1200 {
        let out = session.tick(&TickInput::default(), 1.0 / 60.0);
        ticks += 1;
        if out.won {
            break;
        }
    }
    results.push(check(
        "session_ticks_without_input",
        ticks > 0,
        format!("{} ticks, outcome {:?}", ticks, session.outcome()),
    ));

    results
}
