//! Headless firing range: one cannon, a row of crates, a few seconds of
//! simulated time.
//!
//! The scene here is a toy integrator — point bodies, gravity, sphere
//! overlap for contacts — standing in for a real physics engine behind the
//! [`PhysicsScene`] boundary.
//!
//! Run with `RUST_LOG=info cargo run --example volley`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use culverin::prelude::*;
use glam::Vec3;

const GRAVITY: f32 = 9.8;
const CONTACT_RADIUS: f32 = 1.5;

struct DemoBody {
    position: Vec3,
    velocity: Vec3,
    mass: f32,
    dynamic: bool,
}

/// Point-mass integrator with sphere-overlap contacts.
struct DemoScene {
    bodies: HashMap<BodyId, DemoBody>,
    next_body: u64,
}

impl DemoScene {
    fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            next_body: 0,
        }
    }

    fn add_body(&mut self, position: Vec3, mass: f32, dynamic: bool) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            id,
            DemoBody {
                position,
                velocity: Vec3::ZERO,
                mass,
                dynamic,
            },
        );
        id
    }

    /// Integrate one step and report every overlapping pair, once per
    /// direction so each side's subscriber (if any) hears about the other.
    fn step(&mut self, dt: f32) -> Vec<(BodyId, Contact)> {
        for body in self.bodies.values_mut() {
            if body.dynamic {
                body.velocity.y -= GRAVITY * dt;
                body.position += body.velocity * dt;
            }
        }

        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        let mut contacts = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let pa = self.bodies[&a].position;
                let pb = self.bodies[&b].position;
                let offset = pb - pa;
                if offset.length() >= CONTACT_RADIUS {
                    continue;
                }
                let normal = offset.normalize_or_zero();
                contacts.push((
                    a,
                    Contact {
                        other: b,
                        linear_velocity: self.bodies[&b].velocity,
                        angular_velocity: Vec3::ZERO,
                        normal,
                    },
                ));
                contacts.push((
                    b,
                    Contact {
                        other: a,
                        linear_velocity: self.bodies[&a].velocity,
                        angular_velocity: Vec3::ZERO,
                        normal: -normal,
                    },
                ));
            }
        }
        contacts
    }
}

impl PhysicsScene for DemoScene {
    fn position(&self, body: BodyId) -> Vec3 {
        self.bodies[&body].position
    }

    fn rotation(&self, _body: BodyId) -> Vec3 {
        Vec3::ZERO
    }

    fn mass(&self, body: BodyId) -> f32 {
        self.bodies[&body].mass
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&body) {
            body.velocity += impulse / body.mass;
        }
    }

    fn remove_body(&mut self, body: BodyId) {
        self.bodies.remove(&body);
    }

    fn configure_angular_motor(
        &mut self,
        _constraint: ConstraintId,
        _axis: usize,
        _lower_limit: f32,
        _upper_limit: f32,
        _target_velocity: f32,
        _max_force: f32,
    ) {
        // The toy scene has no joints; the cannon stays aimed dead ahead.
    }

    fn enable_angular_motor(&mut self, _constraint: ConstraintId, _axis: usize) {}

    fn reference_axis(&self, _constraint: ConstraintId) -> Vec3 {
        Vec3::ZERO
    }
}

fn main() {
    env_logger::init();

    let mut registry = KindRegistry::new();
    let kinds = Kinds::register(&mut registry);
    let mut world = World::new();

    let scene = Rc::new(RefCell::new(DemoScene::new()));
    let handle: SceneHandle = scene.clone();
    let router = Rc::new(RefCell::new(ContactRouter::new()));
    let input = Rc::new(RefCell::new(Input::new()));

    let (_score_system, board) = create_score_system(&mut world, &kinds);
    create_health_system(&mut world, &kinds, Rc::clone(&handle), Rc::clone(&router));

    let spawner: ProjectileSpawner = {
        let scene = Rc::clone(&scene);
        let physical = kinds.physical.clone();
        Box::new(move |world, muzzle, impulse| {
            let body = scene.borrow_mut().add_body(muzzle, 5.0, true);
            scene.borrow_mut().apply_impulse(body, impulse);
            let shot = world.begin_entity("shot").with(&physical, body).finish();
            let scene = Rc::clone(&scene);
            shot.set_on_destroy(move || scene.borrow_mut().remove_body(body));
        })
    };
    let cannon_system = create_cannon_system(
        &mut world,
        &kinds,
        Rc::clone(&handle),
        Rc::clone(&input),
        spawner,
    );
    let cleanup_system = create_cleanup_system(&kinds, Rc::clone(&handle), -2.0);

    let mut scheduler = Scheduler::new();
    scheduler.add(cannon_system);
    scheduler.add(cleanup_system);

    // The cannon itself. The toy scene ignores motors, so the mount
    // constraint is a placeholder id.
    let cannon_body = scene.borrow_mut().add_body(Vec3::new(0.0, 1.0, 0.0), 50.0, false);
    world
        .begin_entity("cannon")
        .with(&kinds.physical, cannon_body)
        .with(&kinds.actuated, ConstraintId(0))
        .with(
            &kinds.cannon,
            CannonControls::new(Key::A, Key::D, Key::W, Key::S, Key::Space, 2.0),
        )
        .finish();

    // A row of crates downrange. Zero rotation aims the cannon down -Z.
    for (i, x) in [-2.0f32, 0.0, 2.0].into_iter().enumerate() {
        let body = scene.borrow_mut().add_body(Vec3::new(x, 1.0, -20.0), 10.0, false);
        let crate_entity = world
            .begin_entity("crate")
            .with(&kinds.physical, body)
            .with(&kinds.health, 10.0)
            .with(&kinds.target, 25.0 * (i + 1) as f64)
            .finish();
        let scene = Rc::clone(&scene);
        crate_entity.set_on_destroy(move || scene.borrow_mut().remove_body(body));
    }

    // Hold the fire key and run three simulated seconds at 60 Hz.
    input.borrow_mut().press(Key::Space);
    let dt = Duration::from_micros(16_667);
    for _ in 0..180 {
        world.time_mut().advance(dt);
        let contacts = scene.borrow_mut().step(dt.as_secs_f32());
        for (body, contact) in contacts {
            ContactRouter::dispatch(&router, &mut world, body, &contact);
        }
        scheduler.run(&mut world);
        input.borrow_mut().clear_just();
    }

    println!("score: {}", board.total());
    println!("entities remaining: {}", world.entity_count());
}
