//! # Physics Boundary — Opaque Handles, No Engine
//!
//! The runtime never simulates rigid bodies itself; an external collaborator
//! does. This module is the whole contract with it:
//!
//! - [`BodyId`] / [`ConstraintId`] — stable identifiers for a physical body
//!   and an actuated joint. Identifiers, not handles: gameplay state keyed by
//!   a body (the destroyer modifier table, collision subscriptions) survives
//!   whatever handle churn the collaborator does internally.
//! - [`PhysicsScene`] — what the runtime reads (position, rotation, mass, a
//!   constraint's reference axis) and commands (one-shot impulses, per-axis
//!   angular motors, body removal).
//! - [`Contact`] + [`ContactRouter`] — collision delivery. The collaborator
//!   reports contacts against specific bodies; the router fans each one out
//!   to the handler subscribed for that body.
//!
//! Contact handlers arrive interleaved with the physics step, not from the
//! scheduler, and must be reentrant-safe: a handler may unsubscribe itself
//! (the damage system does, on depletion), so dispatch clones the handler out
//! of the table before invoking it.

use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

use crate::ecs::World;

/// Stable identifier for a physical body owned by the external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

/// Stable identifier for an actuated constraint (joint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub u64);

/// One collision, as reported by the physics collaborator to the body a
/// handler is subscribed on. Velocities and normal describe the *other*
/// body's motion relative to the contact.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// The other body involved in the collision.
    pub other: BodyId,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub normal: Vec3,
}

/// The services the external physics/scene collaborator provides.
///
/// Rotations are XYZ Euler angles in radians, matching what the damage and
/// aim math expects. Implementations may panic on unknown ids — feeding the
/// runtime a body it never created is a programmer error.
pub trait PhysicsScene {
    fn position(&self, body: BodyId) -> Vec3;
    fn rotation(&self, body: BodyId) -> Vec3;
    fn mass(&self, body: BodyId) -> f32;

    /// Apply a one-shot linear impulse at the body's center of mass.
    fn apply_impulse(&mut self, body: BodyId, impulse: Vec3);

    /// Remove a body from the simulation. Called from entity teardown.
    fn remove_body(&mut self, body: BodyId);

    /// Configure one angular motor axis of a constraint.
    fn configure_angular_motor(
        &mut self,
        constraint: ConstraintId,
        axis: usize,
        lower_limit: f32,
        upper_limit: f32,
        target_velocity: f32,
        max_force: f32,
    );

    /// Enable a previously configured motor axis.
    fn enable_angular_motor(&mut self, constraint: ConstraintId, axis: usize);

    /// The constraint's reference axis, used to recover aim elevation.
    fn reference_axis(&self, constraint: ConstraintId) -> Vec3;
}

/// Shared handle to the scene collaborator, as captured by gameplay systems.
pub type SceneHandle = Rc<std::cell::RefCell<dyn PhysicsScene>>;

/// A collision handler subscribed for one body.
pub type ContactHandler = Rc<dyn Fn(&mut World, &Contact)>;

/// Routes contacts to per-body handlers.
///
/// At most one handler per body; subscribing again replaces the previous
/// handler. Unsubscribing an unknown body is an expected no-op.
pub struct ContactRouter {
    handlers: HashMap<BodyId, ContactHandler>,
}

impl ContactRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, body: BodyId, handler: impl Fn(&mut World, &Contact) + 'static) {
        self.handlers.insert(body, Rc::new(handler));
    }

    pub fn unsubscribe(&mut self, body: BodyId) -> bool {
        self.handlers.remove(&body).is_some()
    }

    pub fn is_subscribed(&self, body: BodyId) -> bool {
        self.handlers.contains_key(&body)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver one contact reported against `body`. The handler is cloned out
    /// of the table first, so it may freely unsubscribe itself (or anyone
    /// else) while running. Bodies with no subscriber drop the contact.
    pub fn dispatch(
        router: &Rc<std::cell::RefCell<ContactRouter>>,
        world: &mut World,
        body: BodyId,
        contact: &Contact,
    ) {
        let handler = router.borrow().handlers.get(&body).cloned();
        if let Some(handler) = handler {
            (*handler)(world, contact);
        }
    }
}

impl Default for ContactRouter {
    fn default() -> Self {
        Self::new()
    }
}
