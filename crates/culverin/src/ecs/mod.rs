//! # Signature-Matched, Event-Driven ECS
//!
//! Entities are dynamically-assembled bags of components identified by a
//! bitset signature; systems declare a required signature and are kept in
//! sync with the live entity set incrementally, through creation/destruction
//! notifications — never by re-scanning per frame.
//!
//! ## Module Overview
//!
//! - [`kind`] — component registry: ordinals, typed kind handles, blueprints
//! - [`signature`] — component-set membership as a bitmask
//! - [`event`] — ordered synchronous fan-out with snapshot semantics
//! - [`entity`] — generational ids, shared component cells, entity records
//! - [`world`] — the entity registry: live set, lifecycle channels, clock
//! - [`system`] — required signature + node cache + standard lifecycle hooks
//! - [`schedule`] — one update per system per tick, in registration order

pub mod entity;
pub mod event;
pub mod kind;
pub mod schedule;
pub mod signature;
pub mod system;
pub mod world;

pub use entity::{Entity, EntityId, Instance};
pub use event::{EventChannel, ListenerId};
pub use kind::{Blueprint, Kind, KindId, KindRegistry};
pub use schedule::Scheduler;
pub use signature::Signature;
pub use system::{Node, System};
pub use world::{EntityBuilder, World};
