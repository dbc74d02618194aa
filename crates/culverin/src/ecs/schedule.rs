//! # Scheduler — One Update Per System Per Tick
//!
//! Runs every registered system's update once per tick, in registration
//! order, then settles the world: deferred destroys execute, and delayed
//! destroys whose grace period has elapsed fire. No parallelism, no
//! dependency graph — order is exactly what the caller registered.

use std::cell::RefCell;
use std::rc::Rc;

use super::system::System;
use super::world::World;

/// An ordered list of systems to tick.
pub struct Scheduler {
    systems: Vec<Rc<RefCell<System>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Register a system. Updates run in registration order.
    pub fn add(&mut self, system: Rc<RefCell<System>>) {
        self.systems.push(system);
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run one tick: every system's update over its node snapshot, then the
    /// end-of-tick settlement (deferred destroys, due delayed destroys).
    pub fn run(&mut self, world: &mut World) {
        world.begin_pass();
        for system in &self.systems {
            System::run_update(world, system);
        }
        world.end_pass();
        world.poll_delayed();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::kind::{Blueprint, KindRegistry};

    struct Counter(u32);

    fn fixture() -> (World, Blueprint<u32, Counter>) {
        let mut registry = KindRegistry::new();
        let counter = registry.define(Counter);
        (World::new(), counter)
    }

    #[test]
    fn systems_update_in_registration_order() {
        let (mut world, _) = fixture();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        for tag in ["a", "b", "c"] {
            let system = System::new([]);
            let order = Rc::clone(&order);
            system.borrow_mut().set_update(move |_, _| {
                order.borrow_mut().push(tag);
            });
            scheduler.add(system);
        }
        scheduler.run(&mut world);
        scheduler.run(&mut world);
        assert_eq!(*order.borrow(), vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn destroy_during_update_defers_until_end_of_tick() {
        let (mut world, counter) = fixture();
        let system = System::new([counter.kind().id()]);
        System::activate(&mut world, &system);
        let visited = Rc::new(RefCell::new(0));
        {
            let visited = Rc::clone(&visited);
            system.borrow_mut().set_update(move |world, nodes| {
                for node in nodes {
                    // Destroying mid-iteration must not disturb the pass.
                    world.destroy(node.entity().id());
                    *visited.borrow_mut() += 1;
                }
            });
        }
        let mut scheduler = Scheduler::new();
        scheduler.add(Rc::clone(&system));

        for _ in 0..3 {
            world.begin_entity("n").with(&counter, 0).finish();
        }
        scheduler.run(&mut world);

        // Every node was still visited this tick...
        assert_eq!(*visited.borrow(), 3);
        // ...and by the next tick the cache and the world are empty.
        assert_eq!(system.borrow().node_count(), 0);
        assert_eq!(world.entity_count(), 0);
        scheduler.run(&mut world);
        assert_eq!(*visited.borrow(), 3);
    }

    #[test]
    fn entity_spawned_during_update_joins_the_next_snapshot() {
        let (mut world, counter) = fixture();
        let system = System::new([counter.kind().id()]);
        System::activate(&mut world, &system);
        let per_tick = Rc::new(RefCell::new(Vec::new()));
        {
            let per_tick = Rc::clone(&per_tick);
            let counter = counter.clone();
            system.borrow_mut().set_update(move |world, nodes| {
                per_tick.borrow_mut().push(nodes.len());
                if nodes.is_empty() {
                    world.begin_entity("spawned").with(&counter, 0).finish();
                }
            });
        }
        let mut scheduler = Scheduler::new();
        scheduler.add(Rc::clone(&system));

        scheduler.run(&mut world); // spawns; snapshot was empty
        scheduler.run(&mut world); // sees the spawned entity
        assert_eq!(*per_tick.borrow(), vec![0, 1]);
    }

    #[test]
    fn delayed_destroys_settle_at_end_of_tick() {
        use std::time::Duration;
        let (mut world, counter) = fixture();
        let entity = world.begin_entity("n").with(&counter, 0).finish();
        world.destroy_after(entity.id(), Duration::from_millis(100));

        let mut scheduler = Scheduler::new();
        world.time_mut().advance(Duration::from_millis(150));
        scheduler.run(&mut world);
        assert!(!world.is_live(entity.id()));
    }
}
