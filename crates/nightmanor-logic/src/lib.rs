//! Pure simulation logic for Night Manor.
//!
//! This crate contains the stealth-horror simulation core, independent of
//! any renderer, audio engine, or UI. The platform layer generates a level
//! once, then drives [`session::Session::tick`] with per-frame inputs and
//! consumes the returned snapshot.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`math`] | `Vec3` and AABB value types |
//! | [`constants`] | Grid dimensions, speeds, radii, budgets |
//! | [`layout`] | Room-rectangle input records and the reference manor |
//! | [`occupancy`] | Wall/open grid + sparse 3D block map and its queries |
//! | [`generation`] | Room carving, corridors, feature placement |
//! | [`pathfinding`] | Budget-bounded grid A* with best-effort paths |
//! | [`agent`] | Pursuer perception, patrol/chase machine, path following |
//! | [`player`] | Controllable-entity motion, per-axis collision, look |
//! | [`interaction`] | Triggerable features and proximity dispatch |
//! | [`session`] | Frame-stepped driver owning the level and entities |
//!
//! # Example
//!
//! ```rust,no_run
//! use nightmanor_logic::layout::reference_layout;
//! use nightmanor_logic::session::{Session, TickInput};
//!
//! let mut session = Session::new(&reference_layout(), 7);
//! loop {
//!     let out = session.tick(&TickInput::default(), 1.0 / 60.0);
//!     if out.won || out.killed {
//!         break;
//!     }
//! }
//! ```

pub mod agent;
pub mod constants;
pub mod generation;
pub mod interaction;
pub mod layout;
pub mod math;
pub mod occupancy;
pub mod pathfinding;
pub mod player;
pub mod session;
