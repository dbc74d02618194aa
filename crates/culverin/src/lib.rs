//! # Culverin — An Event-Driven Gameplay Runtime
//!
//! A signature-matched ECS with lifecycle-driven system membership, plus the
//! gameplay systems of a physics shooting range: contact damage, motorized
//! cannons, scoring, and out-of-bounds cleanup. Physics itself stays behind
//! the [`physics::PhysicsScene`] boundary.
//!
//! Start with `use culverin::prelude::*`, register your kinds, activate your
//! systems, and tick a [`Scheduler`](ecs::Scheduler).

pub mod components;
pub mod ecs;
pub mod input;
pub mod physics;
pub mod prelude;
pub mod systems;
pub mod time;
