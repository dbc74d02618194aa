//! # Health System — Contact Damage and Grace-Delayed Death
//!
//! Tracks every entity carrying a body and a health pool, and subscribes a
//! contact handler for its body. Two damage paths:
//!
//! - **Destroyer contact**: the other body belongs to a destroyer entity and
//!   the victim carries a target value. The value is scaled by the
//!   destroyer's modifier and the victim's health is drained outright.
//!   Victims without a target value take destroyer contacts as plain
//!   impacts.
//! - **Plain impact**: damage is derived from the other body's mass and
//!   motion against the contact normal, quantized so that glancing touches
//!   deal nothing.
//!
//! When health depletes, the depletion watch removes itself, the contact
//! subscription is dropped (a dying entity takes no further hits), and the
//! entity is scheduled for destruction after a short grace period — long
//! enough for death feedback to play out, short enough to not matter for
//! gameplay.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::components::Kinds;
use crate::ecs::event::ListenerId;
use crate::ecs::{Signature, System, World};
use crate::physics::{BodyId, Contact, ContactRouter, SceneHandle};

/// Impact forces are scaled down by this before quantization; anything that
/// rounds to zero is a glancing touch and deals no damage.
const DAMAGE_DIVISOR: f32 = 10_000.0;

/// Delay between health depletion and the entity's destruction.
pub const DESTRUCTION_GRACE: Duration = Duration::from_millis(100);

/// Damage from a plain impact: negative (a health loss) or zero for a
/// glancing touch. Derived from the other body's mass, its total kinetic
/// motion, and how squarely that motion meets the contact normal.
///
/// Quantization rounds half-steps toward zero damage: a force of exactly
/// half the divisor still deals nothing.
fn impact_damage(mass: f32, contact: &Contact) -> f32 {
    let v = contact.linear_velocity;
    let w = contact.angular_velocity;
    let n = contact.normal;
    let force =
        mass * (v.length_squared() + w.length_squared()) * (v.dot(n).abs() + w.dot(n).abs());
    (-force / DAMAGE_DIVISOR + 0.5).floor()
}

/// Build and activate the health system.
///
/// Registers three lifecycle listeners beyond the standard node-cache hooks:
/// one tracking destroyer bodies into a side table, one wiring each matching
/// entity (contact subscription + depletion watch), and one purging body
/// state when any physical entity is destroyed.
pub fn create_health_system(
    world: &mut World,
    kinds: &Kinds,
    scene: SceneHandle,
    router: Rc<RefCell<ContactRouter>>,
) -> Rc<RefCell<System>> {
    let physical = kinds.physical.kind();
    let health_kind = kinds.health.kind();
    let target_kind = kinds.target.kind();
    let destroyer_kind = kinds.destroyer.kind();

    let system = System::new([physical.id(), health_kind.id()]);
    System::activate(world, &system);

    // Destroyer modifiers, keyed by body so a contact handler can resolve
    // `contact.other` without an entity lookup.
    let destroyers: Rc<RefCell<HashMap<BodyId, f64>>> = Rc::new(RefCell::new(HashMap::new()));

    let destroyer_signature = Signature::from_kinds(&[physical.id(), destroyer_kind.id()]);
    {
        let destroyers = Rc::clone(&destroyers);
        world.on_created(move |_, entity| {
            if !entity.contains_signature(destroyer_signature) {
                return;
            }
            let body = entity
                .component(physical)
                .expect("matched signature implies a physical component")
                .borrow()
                .body;
            let modifier = entity
                .component(destroyer_kind)
                .expect("matched signature implies a destroyer component")
                .borrow()
                .modifier;
            destroyers.borrow_mut().insert(body, modifier);
        });
    }

    {
        let matcher = Rc::clone(&system);
        let destroyers = Rc::clone(&destroyers);
        let scene = Rc::clone(&scene);
        let router = Rc::clone(&router);
        world.on_created(move |_, entity| {
            if !matcher.borrow().can_operate_on(entity) {
                return;
            }
            let body = entity
                .component(physical)
                .expect("matched signature implies a physical component")
                .borrow()
                .body;
            let health = entity
                .component(health_kind)
                .expect("matched signature implies a health component");

            // Depletion watch: fires at most once, then removes itself.
            let watch_slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
            let watch_id = {
                let slot = Rc::clone(&watch_slot);
                let watched = health.clone();
                let router = Rc::clone(&router);
                let victim = entity.id();
                health.borrow_mut().on_changed(move |world, &value| {
                    if value > 0.0 {
                        return;
                    }
                    if let Some(id) = slot.take() {
                        watched.borrow_mut().remove_changed_listener(id);
                    }
                    router.borrow_mut().unsubscribe(body);
                    log::info!("entity {} depleted, destruction in {:?}", victim, DESTRUCTION_GRACE);
                    world.destroy_after(victim, DESTRUCTION_GRACE);
                })
            };
            watch_slot.set(Some(watch_id));

            let destroyers = Rc::clone(&destroyers);
            let scene = Rc::clone(&scene);
            let victim = entity.clone();
            router.borrow_mut().subscribe(body, move |world, contact| {
                let modifier = destroyers.borrow().get(&contact.other).copied();
                // The destroyer exception only applies to victims worth
                // something; anything else takes the contact as a plain
                // impact, destroyer or not.
                if let (Some(modifier), Some(target)) =
                    (modifier, victim.component(target_kind))
                {
                    target.borrow_mut().value *= modifier;
                    let max = health.borrow().max();
                    health.shift(world, -max);
                } else {
                    let mass = scene.borrow().mass(contact.other);
                    let damage = impact_damage(mass, contact);
                    if damage < 0.0 {
                        health.shift(world, damage);
                    }
                }
            });
        });
    }

    {
        let destroyers = Rc::clone(&destroyers);
        let router = Rc::clone(&router);
        world.on_destroyed(move |_, entity| {
            if let Some(instance) = entity.component(physical) {
                let body = instance.borrow().body;
                destroyers.borrow_mut().remove(&body);
                router.borrow_mut().unsubscribe(body);
            }
        });
    }

    system
}
