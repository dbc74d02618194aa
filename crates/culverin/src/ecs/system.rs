//! # System — A Required Signature Plus a Node Cache
//!
//! A system declares which component kinds it requires and keeps a cache of
//! **nodes** — one per matching live entity, each holding direct references
//! to that entity's required components so per-frame work never re-looks
//! anything up through the world.
//!
//! ## Membership is event-driven, never scanned
//!
//! The node cache is maintained solely by the two lifecycle notifications:
//!
//! - "created": if the entity's signature covers the requirement, build a
//!   node and append it.
//! - "destroyed": drop the entity's node if present (no-op otherwise).
//!
//! That makes membership O(1) amortized per lifecycle event instead of an
//! O(entities) scan every frame, and it is the *only* way nodes come and go —
//! at most one node per entity, in insertion order, stable across frames.
//!
//! These two standard hooks are wired by [`System::activate`]; a system is
//! *unattached* until then and *tracking* afterwards. Concrete gameplay
//! systems add their own listeners next to the standard ones when they need
//! extra per-entity setup.
//!
//! ## Updates run over a snapshot
//!
//! The scheduler hands the update callback a snapshot of the node cache taken
//! at the start of the tick. Entities spawned mid-update join the cache
//! immediately but are not retroactively inserted into the running snapshot;
//! destroys requested mid-update are deferred by the world (see
//! [`World::destroy`](super::world::World::destroy)), so the snapshot never
//! dangles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::entity::{ComponentCell, Entity, EntityId, Instance};
use super::kind::{Kind, KindId};
use super::signature::Signature;
use super::world::World;

/// One matching entity, with direct references to its required components.
/// Valid only while the owning entity is live.
#[derive(Clone)]
pub struct Node {
    entity: Entity,
    /// Required components in the system's declared kind order.
    components: Vec<(KindId, ComponentCell)>,
}

impl Node {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Typed access to one of the required components.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not part of the owning system's requirement —
    /// asking a node for a component its system never declared is a
    /// programmer error.
    pub fn component<T: 'static>(&self, kind: Kind<T>) -> Instance<T> {
        self.components
            .iter()
            .find(|(k, _)| *k == kind.id())
            .map(|(_, cell)| Instance::new(Rc::clone(cell)))
            .unwrap_or_else(|| {
                panic!(
                    "Kind #{} is not part of this system's required signature",
                    kind.id().ordinal()
                )
            })
    }
}

/// Per-frame update callback: the world, plus this tick's node snapshot.
pub type UpdateFn = Box<dyn FnMut(&mut World, &[Node])>;

pub struct System {
    required: Signature,
    required_kinds: Vec<KindId>,
    nodes: Vec<Node>,
    /// Entity → position in `nodes`. Guarantees at most one node per entity.
    index: HashMap<EntityId, usize>,
    update: Option<UpdateFn>,
    tracking: bool,
}

impl System {
    /// Create a system requiring the given kinds. The node cache starts
    /// empty; nothing is tracked until [`System::activate`].
    pub fn new(required_kinds: impl IntoIterator<Item = KindId>) -> Rc<RefCell<System>> {
        let required_kinds: Vec<KindId> = required_kinds.into_iter().collect();
        Rc::new(RefCell::new(System {
            required: Signature::from_kinds(&required_kinds),
            required_kinds,
            nodes: Vec::new(),
            index: HashMap::new(),
            update: None,
            tracking: false,
        }))
    }

    pub fn required(&self) -> Signature {
        self.required
    }

    /// Signature subset test: can this system operate on the entity?
    pub fn can_operate_on(&self, entity: &Entity) -> bool {
        self.required.is_subset_of(&entity.signature())
    }

    /// Register the per-frame callback. Calling this twice replaces the
    /// previous callback — last registration wins.
    pub fn set_update(&mut self, update: impl FnMut(&mut World, &[Node]) + 'static) {
        self.update = Some(Box::new(update));
    }

    /// Current node cache, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Build and insert a node for the entity if it matches and is not
    /// already tracked. Returns `true` if a node was added.
    pub fn try_insert(&mut self, entity: &Entity) -> bool {
        if !self.can_operate_on(entity) || self.index.contains_key(&entity.id()) {
            return false;
        }
        let components = self
            .required_kinds
            .iter()
            .map(|&kind| {
                let cell = entity
                    .cell(kind)
                    .expect("matched signature implies every required kind is present");
                (kind, cell)
            })
            .collect();
        self.index.insert(entity.id(), self.nodes.len());
        self.nodes.push(Node {
            entity: entity.clone(),
            components,
        });
        true
    }

    /// Drop the node for an entity, preserving insertion order of the rest.
    /// No-op (returning `false`) if the entity was never tracked.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(position) = self.index.remove(&id) else {
            return false;
        };
        self.nodes.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        true
    }

    /// Transition from *unattached* to *tracking*: register the standard
    /// created/destroyed hooks that maintain the node cache.
    ///
    /// # Panics
    ///
    /// Panics if the system is already tracking.
    pub fn activate(world: &mut World, system: &Rc<RefCell<System>>) {
        {
            let mut sys = system.borrow_mut();
            assert!(!sys.tracking, "System activated twice");
            sys.tracking = true;
        }
        {
            let system = Rc::clone(system);
            world.on_created(move |_, entity| {
                system.borrow_mut().try_insert(entity);
            });
        }
        {
            let system = Rc::clone(system);
            world.on_destroyed(move |_, entity| {
                system.borrow_mut().remove(entity.id());
            });
        }
    }

    /// Run the update callback, if any, over a snapshot of the node cache.
    /// A system with an empty cache (or no callback) is a valid no-op.
    pub(crate) fn run_update(world: &mut World, system: &Rc<RefCell<System>>) {
        let (snapshot, mut update) = {
            let mut sys = system.borrow_mut();
            (sys.nodes.clone(), sys.update.take())
        };
        if let Some(callback) = update.as_mut() {
            callback(world, &snapshot);
        }
        // Put the callback back unless the update replaced itself.
        let mut sys = system.borrow_mut();
        if sys.update.is_none() {
            sys.update = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::kind::{Blueprint, KindRegistry};

    struct Pos(f32);
    struct Vel(f32);

    struct Fixture {
        pos: Blueprint<f32, Pos>,
        vel: Blueprint<f32, Vel>,
    }

    fn fixture() -> (World, Fixture) {
        let mut registry = KindRegistry::new();
        let pos = registry.define(Pos);
        let vel = registry.define(Vel);
        (World::new(), Fixture { pos, vel })
    }

    fn moving_system(f: &Fixture) -> Rc<RefCell<System>> {
        System::new([f.pos.kind().id(), f.vel.kind().id()])
    }

    #[test]
    fn node_tracks_matching_entities_only() {
        let (mut world, f) = fixture();
        let system = moving_system(&f);
        System::activate(&mut world, &system);

        let matching = world
            .begin_entity("mover")
            .with(&f.pos, 0.0)
            .with(&f.vel, 1.0)
            .finish();
        world.begin_entity("static").with(&f.pos, 5.0).finish();

        let sys = system.borrow();
        assert_eq!(sys.node_count(), 1);
        assert_eq!(sys.nodes()[0].entity().id(), matching.id());
    }

    #[test]
    fn entities_created_before_activation_are_not_tracked() {
        let (mut world, f) = fixture();
        let system = moving_system(&f);
        world
            .begin_entity("early")
            .with(&f.pos, 0.0)
            .with(&f.vel, 0.0)
            .finish();
        System::activate(&mut world, &system);
        // Membership changes only through the lifecycle hooks.
        assert_eq!(system.borrow().node_count(), 0);
    }

    #[test]
    fn at_most_one_node_per_entity() {
        let (mut world, f) = fixture();
        let system = moving_system(&f);
        System::activate(&mut world, &system);
        let entity = world
            .begin_entity("m")
            .with(&f.pos, 0.0)
            .with(&f.vel, 0.0)
            .finish();
        // A second insert attempt for a tracked entity is refused.
        assert!(!system.borrow_mut().try_insert(&entity));
        assert_eq!(system.borrow().node_count(), 1);
    }

    #[test]
    fn destroy_removes_the_node_and_preserves_order() {
        let (mut world, f) = fixture();
        let system = moving_system(&f);
        System::activate(&mut world, &system);

        let ids: Vec<_> = (0..3)
            .map(|i| {
                world
                    .begin_entity("m")
                    .with(&f.pos, i as f32)
                    .with(&f.vel, 0.0)
                    .finish()
                    .id()
            })
            .collect();
        world.destroy(ids[1]);

        let sys = system.borrow();
        let remaining: Vec<_> = sys.nodes().iter().map(|n| n.entity().id()).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
        // Removing an untracked entity is an expected no-op.
        drop(sys);
        assert!(!system.borrow_mut().remove(ids[1]));
    }

    #[test]
    fn node_components_are_references_not_copies() {
        let (mut world, f) = fixture();
        let system = moving_system(&f);
        System::activate(&mut world, &system);
        let entity = world
            .begin_entity("m")
            .with(&f.pos, 1.0)
            .with(&f.vel, 0.0)
            .finish();

        system.borrow().nodes()[0]
            .component(f.pos.kind())
            .borrow_mut()
            .0 = 9.0;
        assert_eq!(entity.component(f.pos.kind()).unwrap().borrow().0, 9.0);
    }

    #[test]
    #[should_panic(expected = "not part of this system's required signature")]
    fn asking_a_node_for_an_undeclared_kind_panics() {
        let (mut world, f) = fixture();
        let system = System::new([f.pos.kind().id()]);
        System::activate(&mut world, &system);
        world.begin_entity("p").with(&f.pos, 0.0).finish();
        let _ = system.borrow().nodes()[0].component(f.vel.kind());
    }

    #[test]
    #[should_panic(expected = "activated twice")]
    fn double_activation_panics() {
        let (mut world, f) = fixture();
        let system = moving_system(&f);
        System::activate(&mut world, &system);
        System::activate(&mut world, &system);
    }

    #[test]
    fn set_update_replaces_the_previous_callback() {
        let (mut world, _f) = fixture();
        let system = System::new([]);
        let hits = Rc::new(RefCell::new(Vec::new()));
        {
            let hits = Rc::clone(&hits);
            system
                .borrow_mut()
                .set_update(move |_, _| hits.borrow_mut().push("old"));
        }
        {
            let hits = Rc::clone(&hits);
            system
                .borrow_mut()
                .set_update(move |_, _| hits.borrow_mut().push("new"));
        }
        System::run_update(&mut world, &system);
        assert_eq!(*hits.borrow(), vec!["new"]);
    }
}
