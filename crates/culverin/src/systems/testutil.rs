//! A recording in-memory scene for system tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

use crate::physics::{BodyId, ConstraintId, PhysicsScene, SceneHandle};

#[derive(Clone, Copy)]
pub struct MockBody {
    pub position: Vec3,
    pub rotation: Vec3,
    pub mass: f32,
}

impl Default for MockBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            mass: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCall {
    pub constraint: ConstraintId,
    pub axis: usize,
    pub lower_limit: f32,
    pub upper_limit: f32,
    pub target_velocity: f32,
    pub max_force: f32,
}

/// Records every command and answers queries from fixed tables.
#[derive(Default)]
pub struct MockScene {
    pub bodies: HashMap<BodyId, MockBody>,
    pub axes: HashMap<ConstraintId, Vec3>,
    pub impulses: Vec<(BodyId, Vec3)>,
    pub motor_calls: Vec<MotorCall>,
    pub enabled_motors: Vec<(ConstraintId, usize)>,
    pub removed: Vec<BodyId>,
}

impl MockScene {
    pub fn shared() -> (Rc<RefCell<MockScene>>, SceneHandle) {
        let scene = Rc::new(RefCell::new(MockScene::default()));
        let handle: SceneHandle = Rc::clone(&scene) as SceneHandle;
        (scene, handle)
    }
}

impl PhysicsScene for MockScene {
    fn position(&self, body: BodyId) -> Vec3 {
        self.bodies.get(&body).copied().unwrap_or_default().position
    }

    fn rotation(&self, body: BodyId) -> Vec3 {
        self.bodies.get(&body).copied().unwrap_or_default().rotation
    }

    fn mass(&self, body: BodyId) -> f32 {
        self.bodies.get(&body).copied().unwrap_or_default().mass
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec3) {
        self.impulses.push((body, impulse));
    }

    fn remove_body(&mut self, body: BodyId) {
        self.removed.push(body);
    }

    fn configure_angular_motor(
        &mut self,
        constraint: ConstraintId,
        axis: usize,
        lower_limit: f32,
        upper_limit: f32,
        target_velocity: f32,
        max_force: f32,
    ) {
        self.motor_calls.push(MotorCall {
            constraint,
            axis,
            lower_limit,
            upper_limit,
            target_velocity,
            max_force,
        });
    }

    fn enable_angular_motor(&mut self, constraint: ConstraintId, axis: usize) {
        self.enabled_motors.push((constraint, axis));
    }

    fn reference_axis(&self, constraint: ConstraintId) -> Vec3 {
        self.axes.get(&constraint).copied().unwrap_or(Vec3::ZERO)
    }
}
