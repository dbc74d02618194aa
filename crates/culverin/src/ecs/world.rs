//! # World — The Entity Registry
//!
//! The [`World`] is the sole place entities are created and destroyed. It owns
//! the live-entity set, the two lifecycle channels ("created", "destroyed"),
//! and the frame clock — explicitly constructed state, not process-wide
//! globals, passed to everything that needs to publish or subscribe.
//!
//! ## Lifecycle ordering
//!
//! These orders are load-bearing and tested:
//!
//! - [`EntityBuilder::finish`]: components attached → signature derived →
//!   entity inserted into the live set → "created" fires. Listeners that need
//!   fully-populated components (a system building its node cache) run here.
//! - [`World::destroy`]: teardown callback → removal from the live set →
//!   "destroyed" fires, carrying the detached record so listeners can still
//!   read its components. Idempotent: a second destroy is a no-op.
//!
//! ## Deferred destruction
//!
//! A destroy requested from inside a lifecycle notification or a system
//! update would mutate the live set mid-iteration, so while any such pass is
//! in flight ([`pass_depth`] > 0) destroys are queued and executed when the
//! outermost pass ends. Creation needs no such deferral — nothing iterates
//! the live set while systems run; they iterate their own node snapshots.
//!
//! Delayed destruction ([`World::destroy_after`]) is wall-clock-based and
//! polled once per tick by the scheduler. There is deliberately no
//! cancellation: if the entity dies earlier by another cause, the late
//! destroy lands on a dead id and no-ops.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::time::Time;

use super::entity::{ComponentCell, Entity, EntityAllocator, EntityId, Instance};
use super::event::{EventChannel, ListenerId};
use super::kind::{Blueprint, Kind, KindId};
use super::signature::Signature;

pub struct World {
    allocator: EntityAllocator,
    /// Live entities, keyed by slot index (generation checked via allocator).
    live: HashMap<u32, Entity>,
    created: EventChannel<Entity>,
    destroyed: EventChannel<Entity>,
    time: Time,
    /// Nesting depth of notification/update passes. Destroys defer while > 0.
    pass_depth: u32,
    pending_destroy: Vec<EntityId>,
    /// Slots currently mid-teardown, to swallow re-entrant destroys.
    destroying: HashSet<u32>,
    /// (due elapsed-time, entity) pairs, polled each tick.
    delayed: Vec<(Duration, EntityId)>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            live: HashMap::new(),
            created: EventChannel::new(),
            destroyed: EventChannel::new(),
            time: Time::new(),
            pass_depth: 0,
            pending_destroy: Vec::new(),
            destroying: HashSet::new(),
            delayed: Vec::new(),
        }
    }

    // ── Clock ────────────────────────────────────────────────────────

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Open a construction context. The entity is invisible to systems until
    /// [`EntityBuilder::finish`] runs.
    pub fn begin_entity(&mut self, tag: &str) -> EntityBuilder<'_> {
        EntityBuilder {
            world: self,
            tag: tag.to_string(),
            signature: Signature::EMPTY,
            components: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_live(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id) && self.live.contains_key(&id.index())
    }

    /// Look up a live entity by id. Dead or stale ids return `None`.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.live.get(&id.index()).cloned()
    }

    pub fn entity_count(&self) -> usize {
        self.live.len()
    }

    /// Does the entity carry every kind in `required`? Dead entities match
    /// nothing.
    pub fn contains_signature(&self, id: EntityId, required: Signature) -> bool {
        self.entity(id)
            .is_some_and(|e| e.contains_signature(required))
    }

    /// Typed access to one component of one entity, or `None` if the entity
    /// is dead or does not carry the kind.
    pub fn component<T: 'static>(&self, id: EntityId, kind: Kind<T>) -> Option<Instance<T>> {
        self.entity(id).and_then(|e| e.component(kind))
    }

    /// Every live instance of a kind, across all entities, in id order.
    ///
    /// This is the scan-by-kind escape hatch for cross-cutting housekeeping
    /// (removing anything whose body fell out of bounds, say) that has no
    /// owning entity in hand.
    pub fn instances_of<T: 'static>(&self, kind: Kind<T>) -> Vec<(Entity, Instance<T>)> {
        let mut found: Vec<(Entity, Instance<T>)> = self
            .live
            .values()
            .filter_map(|e| e.component(kind).map(|i| (e.clone(), i)))
            .collect();
        found.sort_by_key(|(e, _)| e.id().index());
        found
    }

    // ── Lifecycle channels ───────────────────────────────────────────

    pub fn on_created(&mut self, listener: impl Fn(&mut World, &Entity) + 'static) -> ListenerId {
        self.created.add(listener)
    }

    pub fn remove_created_listener(&mut self, id: ListenerId) -> bool {
        self.created.remove(id)
    }

    pub fn on_destroyed(&mut self, listener: impl Fn(&mut World, &Entity) + 'static) -> ListenerId {
        self.destroyed.add(listener)
    }

    pub fn remove_destroyed_listener(&mut self, id: ListenerId) -> bool {
        self.destroyed.remove(id)
    }

    fn fire_created(&mut self, entity: &Entity) {
        self.begin_pass();
        for listener in self.created.snapshot() {
            (*listener)(self, entity);
        }
        self.end_pass();
    }

    fn fire_destroyed(&mut self, entity: &Entity) {
        self.begin_pass();
        for listener in self.destroyed.snapshot() {
            (*listener)(self, entity);
        }
        self.end_pass();
    }

    // ── Destruction ──────────────────────────────────────────────────

    /// Destroy an entity: teardown callback, removal from the live set, then
    /// the "destroyed" notification, in that order.
    ///
    /// Destroying a dead, stale, or already-destroying entity is a no-op and
    /// returns `false`. During a notification or update pass the destroy is
    /// deferred to the end of the pass (and `true` is returned — it *will*
    /// happen).
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.is_live(id) || self.destroying.contains(&id.index()) {
            return false;
        }
        if self.pass_depth > 0 {
            if !self.pending_destroy.contains(&id) {
                self.pending_destroy.push(id);
            }
            return true;
        }

        let entity = self
            .live
            .get(&id.index())
            .cloned()
            .expect("live set entry checked above");
        self.destroying.insert(id.index());

        if let Some(teardown) = entity.take_on_destroy() {
            teardown();
        }
        self.live.remove(&id.index());
        log::debug!("destroyed entity {:?}", entity);
        self.fire_destroyed(&entity);

        self.destroying.remove(&id.index());
        // The identity is recycled only now that destruction has completed.
        self.allocator.deallocate(id);
        true
    }

    /// Schedule a destroy for `delay` after the current simulated time.
    /// Polled per tick; not cancellable (a duplicate destroy no-ops).
    pub fn destroy_after(&mut self, id: EntityId, delay: Duration) {
        let due = self.time.elapsed() + delay;
        log::trace!("entity {} scheduled for destruction at {:?}", id, due);
        self.delayed.push((due, id));
    }

    /// Execute every delayed destroy whose due time has passed.
    pub fn poll_delayed(&mut self) {
        let now = self.time.elapsed();
        let mut due = Vec::new();
        self.delayed.retain(|&(at, id)| {
            if at <= now {
                due.push(id);
                false
            } else {
                true
            }
        });
        for id in due {
            self.destroy(id);
        }
    }

    // ── Pass guard ───────────────────────────────────────────────────

    pub(crate) fn begin_pass(&mut self) {
        self.pass_depth += 1;
    }

    pub(crate) fn end_pass(&mut self) {
        debug_assert!(self.pass_depth > 0, "end_pass without begin_pass");
        self.pass_depth -= 1;
        if self.pass_depth == 0 {
            while !self.pending_destroy.is_empty() {
                let id = self.pending_destroy.remove(0);
                self.destroy(id);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-flight entity construction. Attach components, then [`finish`]
/// (EntityBuilder::finish) to go live.
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    tag: String,
    signature: Signature,
    components: Vec<(KindId, ComponentCell)>,
}

impl<'w> EntityBuilder<'w> {
    /// Bind one component instance under one kind.
    ///
    /// # Panics
    ///
    /// Panics if the kind is already attached — a duplicate attach is a
    /// programmer error, rejected rather than overwritten so the mistake
    /// surfaces at the call site.
    pub fn attach<T: 'static>(mut self, kind: Kind<T>, component: T) -> Self {
        if self.signature.contains(kind.id()) {
            panic!(
                "Kind #{} attached twice while building entity \"{}\"",
                kind.id().ordinal(),
                self.tag
            );
        }
        self.signature.insert(kind.id());
        self.components
            .push((kind.id(), std::rc::Rc::new(std::cell::RefCell::new(component)) as ComponentCell));
        self
    }

    /// Build a component from a blueprint's factory and attach it.
    pub fn with<A, T: 'static>(self, blueprint: &Blueprint<A, T>, args: A) -> Self {
        let component = blueprint.build(args);
        self.attach(blueprint.kind(), component)
    }

    /// Transition to *live*: insert into the live set, then fire "created".
    /// By the time any listener runs, every component is attached and
    /// readable.
    pub fn finish(self) -> Entity {
        let id = self.world.allocator.allocate();
        let entity = Entity::new(id, self.tag, self.signature, self.components);
        self.world.live.insert(id.index(), entity.clone());
        log::debug!("created entity {:?}", entity);
        self.world.fire_created(&entity);
        entity
    }
}
