//! # Cleanup System — The Kill Floor
//!
//! Once per tick, scans every entity with a body and destroys any whose body
//! has fallen below the kill floor. Projectiles and knocked-off debris exit
//! the world this way instead of simulating forever.
//!
//! This is the one scan-by-kind consumer in the crate: there is no owning
//! entity in hand and no lifecycle event to react to, only a spatial
//! condition checked against the scene.

use std::cell::RefCell;
use std::rc::Rc;

use crate::components::Kinds;
use crate::ecs::System;
use crate::physics::SceneHandle;

/// Build the cleanup system. `floor` is the world-space height below which
/// entities are destroyed.
pub fn create_cleanup_system(kinds: &Kinds, scene: SceneHandle, floor: f32) -> Rc<RefCell<System>> {
    let physical = kinds.physical.kind();
    let system = System::new([physical.id()]);

    system.borrow_mut().set_update(move |world, _| {
        for (entity, instance) in world.instances_of(physical) {
            let body = instance.borrow().body;
            if scene.borrow().position(body).y < floor {
                log::debug!("{:?} fell below the floor", entity);
                world.destroy(entity.id());
            }
        }
    });

    system
}
