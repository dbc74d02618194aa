//! The concrete component kinds the gameplay systems operate on, and the
//! [`Kinds`] bundle that registers them all in one place.
//!
//! Components here are plain state. The one exception is [`Health`], which
//! carries its own "changed" channel so damage resolution can react to value
//! shifts without polling.

use std::time::Duration;

use crate::ecs::event::{EventChannel, ListenerId};
use crate::ecs::{Blueprint, Instance, KindRegistry, World};
use crate::input::Key;
use crate::physics::{BodyId, ConstraintId};

/// Links an entity to its physical body in the external scene.
pub struct Physical {
    pub body: BodyId,
}

/// Links an entity to an actuated constraint (the cannon's motorized mount).
pub struct Actuated {
    pub constraint: ConstraintId,
}

/// The score value awarded when this entity is eliminated.
pub struct TargetValue {
    pub value: f64,
}

/// Marks an entity whose contact eliminates targets outright, scaling their
/// value by `modifier` on the way out.
pub struct Destroyer {
    pub modifier: f64,
}

/// A clamped health value with change notifications.
///
/// The value never leaves `[0, max]`. Every shift — including one clamped at
/// a bound — notifies listeners with the post-clamp value.
pub struct Health {
    max: f32,
    value: f32,
    changed: EventChannel<f32>,
}

impl Health {
    /// Full health at `max` (floored at zero).
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            max,
            value: max,
            changed: EventChannel::new(),
        }
    }

    /// Health at an explicit starting value, clamped into `[0, max]`.
    pub fn with_value(max: f32, value: f32) -> Self {
        let max = max.max(0.0);
        Self {
            max,
            value: value.clamp(0.0, max),
            changed: EventChannel::new(),
        }
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    /// Listen for value shifts. The payload is the post-clamp value.
    pub fn on_changed(&mut self, listener: impl Fn(&mut World, &f32) + 'static) -> ListenerId {
        self.changed.add(listener)
    }

    pub fn remove_changed_listener(&mut self, id: ListenerId) -> bool {
        self.changed.remove(id)
    }
}

impl Instance<Health> {
    /// Shift the value by `amount`, clamp into `[0, max]`, and notify.
    ///
    /// The fan-out runs over a snapshot of the listener list with the health
    /// borrow released, so listeners may re-borrow the component, remove
    /// themselves, or request (deferred) destruction. Returns the post-clamp
    /// value.
    pub fn shift(&self, world: &mut World, amount: f32) -> f32 {
        let (value, listeners) = {
            let mut health = self.borrow_mut();
            health.value = (health.value + amount).clamp(0.0, health.max);
            (health.value, health.changed.snapshot())
        };
        world.begin_pass();
        for listener in listeners {
            (*listener)(world, &value);
        }
        world.end_pass();
        value
    }
}

/// One control axis of a cannon: two opposing keys and the motor command
/// they map to.
pub struct AxisControls {
    pub up: Key,
    pub down: Key,
    /// Velocity command magnitude per axis, scaled by key state into [-1, 1].
    pub velocity: f32,
    /// Motor force cap.
    pub force: f32,
}

/// Aim-and-fire state for one cannon.
pub struct CannonControls {
    /// An inactive cannon is skipped entirely — motors keep their last
    /// commanded state. This is the freeze-without-destroying hook.
    pub active: bool,
    pub bearing: AxisControls,
    pub elevation: AxisControls,
    pub fire: Key,
    pub fire_delay: Duration,
    /// Elapsed time of the last shot. `None` until the first shot, so a
    /// fresh cannon fires immediately.
    pub last_fire: Option<Duration>,
    /// Barrel length; the muzzle sits this far (minus one unit) along the
    /// aim direction.
    pub barrel_length: f32,
}

impl CannonControls {
    pub fn new(
        bearing_up: Key,
        bearing_down: Key,
        elevation_up: Key,
        elevation_down: Key,
        fire: Key,
        barrel_length: f32,
    ) -> Self {
        Self {
            active: true,
            bearing: AxisControls {
                up: bearing_up,
                down: bearing_down,
                velocity: 0.5,
                force: 5.0,
            },
            elevation: AxisControls {
                up: elevation_up,
                down: elevation_down,
                velocity: 0.5,
                force: 5.0,
            },
            fire,
            fire_delay: Duration::from_millis(1000),
            last_fire: None,
            barrel_length,
        }
    }
}

/// Every registered kind, bundled. Register once at startup and share.
pub struct Kinds {
    pub physical: Blueprint<BodyId, Physical>,
    pub actuated: Blueprint<ConstraintId, Actuated>,
    pub target: Blueprint<f64, TargetValue>,
    pub health: Blueprint<f32, Health>,
    pub cannon: Blueprint<CannonControls, CannonControls>,
    pub destroyer: Blueprint<f64, Destroyer>,
}

impl Kinds {
    pub fn register(registry: &mut KindRegistry) -> Self {
        Self {
            physical: registry.define(|body| Physical { body }),
            actuated: registry.define(|constraint| Actuated { constraint }),
            target: registry.define(|value| TargetValue { value }),
            health: registry.define(Health::new),
            cannon: registry.define(|controls: CannonControls| controls),
            destroyer: registry.define(|modifier| Destroyer { modifier }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::KindRegistry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn health_instance(max: f32) -> (World, Instance<Health>, Kinds) {
        let mut registry = KindRegistry::new();
        let kinds = Kinds::register(&mut registry);
        let mut world = World::new();
        let entity = world.begin_entity("h").with(&kinds.health, max).finish();
        let instance = entity.component(kinds.health.kind()).unwrap();
        (world, instance, kinds)
    }

    #[test]
    fn shift_clamps_to_bounds() {
        let (mut world, health, _) = health_instance(10.0);
        assert_eq!(health.shift(&mut world, -3.0), 7.0);
        assert_eq!(health.shift(&mut world, -100.0), 0.0); // floor
        assert_eq!(health.shift(&mut world, 50.0), 10.0); // ceiling
    }

    #[test]
    fn shift_notifies_with_post_clamp_value() {
        let (mut world, health, _) = health_instance(10.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            health
                .borrow_mut()
                .on_changed(move |_, &value| seen.borrow_mut().push(value));
        }
        health.shift(&mut world, -4.0);
        health.shift(&mut world, -100.0);
        assert_eq!(*seen.borrow(), vec![6.0, 0.0]);
    }

    #[test]
    fn listener_may_remove_itself_during_notification() {
        let (mut world, health, _) = health_instance(5.0);
        let hits = Rc::new(RefCell::new(0));
        let own_id = Rc::new(RefCell::new(None));
        let id = {
            let hits = Rc::clone(&hits);
            let own_id = Rc::clone(&own_id);
            let health_inner = health.clone();
            health.borrow_mut().on_changed(move |_, _| {
                *hits.borrow_mut() += 1;
                if let Some(id) = *own_id.borrow() {
                    health_inner.borrow_mut().remove_changed_listener(id);
                }
            })
        };
        *own_id.borrow_mut() = Some(id);

        health.shift(&mut world, -1.0);
        health.shift(&mut world, -1.0); // listener already gone
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn starting_value_is_clamped() {
        let health = Health::with_value(10.0, 25.0);
        assert_eq!(health.value(), 10.0);
        let health = Health::with_value(10.0, -5.0);
        assert_eq!(health.value(), 0.0);
        assert!(health.is_depleted());
    }
}
