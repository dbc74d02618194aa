//! # Cannon System — Motorized Aim, Rate-Limited Fire
//!
//! Drives every entity carrying a body, an actuated mount, and cannon
//! controls. Each tick, per active cannon:
//!
//! 1. Key state maps to angular motor commands on the mount constraint:
//!    bearing sweeps on axis 1 within a symmetric arc, elevation on axis 0
//!    between level and full depression.
//! 2. If the fire key is held and the per-cannon fire delay has elapsed
//!    since the last shot, the aim direction is recovered from the body's
//!    rotation and the mount's reference axis, and the projectile spawner is
//!    invoked with the muzzle position and launch impulse.
//!
//! Inactive cannons are skipped outright — their motors keep whatever
//! command they last received. The system itself never creates projectile
//! bodies; that stays with the driver-supplied spawner.

use std::cell::RefCell;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::rc::Rc;

use glam::Vec3;

use crate::components::Kinds;
use crate::ecs::{System, World};
use crate::input::{Input, Key};
use crate::physics::SceneHandle;

/// Magnitude of the launch impulse handed to the projectile spawner.
const SHOT_IMPULSE: f32 = 500.0;

/// Half-arc of the bearing sweep; also the full depression of the elevation
/// axis.
const SWEEP_LIMIT: f32 = FRAC_PI_4;

/// Creates one projectile per shot: world, muzzle position, launch impulse.
pub type ProjectileSpawner = Box<dyn FnMut(&mut World, Vec3, Vec3)>;

/// Build and activate the cannon system.
///
/// An extra created-listener enables both motor axes on each matching
/// entity's mount as it goes live; the per-tick update does everything else.
pub fn create_cannon_system(
    world: &mut World,
    kinds: &Kinds,
    scene: SceneHandle,
    input: Rc<RefCell<Input<Key>>>,
    mut spawn: ProjectileSpawner,
) -> Rc<RefCell<System>> {
    let physical = kinds.physical.kind();
    let actuated = kinds.actuated.kind();
    let cannon = kinds.cannon.kind();

    let system = System::new([physical.id(), actuated.id(), cannon.id()]);
    System::activate(world, &system);

    {
        let matcher = Rc::clone(&system);
        let scene = Rc::clone(&scene);
        world.on_created(move |_, entity| {
            if !matcher.borrow().can_operate_on(entity) {
                return;
            }
            let constraint = entity
                .component(actuated)
                .expect("matched signature implies an actuated component")
                .borrow()
                .constraint;
            let mut scene = scene.borrow_mut();
            scene.enable_angular_motor(constraint, 0);
            scene.enable_angular_motor(constraint, 1);
        });
    }

    system.borrow_mut().set_update(move |world, nodes| {
        for node in nodes {
            let controls = node.component(cannon);
            if !controls.borrow().active {
                continue;
            }
            let body = node.component(physical).borrow().body;
            let constraint = node.component(actuated).borrow().constraint;

            let held = |key: Key| if input.borrow().pressed(key) { 1.0 } else { 0.0 };
            let (bearing_cmd, bearing_force, elevation_cmd, elevation_force) = {
                let c = controls.borrow();
                (
                    c.bearing.velocity * (held(c.bearing.up) - held(c.bearing.down)),
                    c.bearing.force,
                    c.elevation.velocity * (held(c.elevation.down) - held(c.elevation.up)),
                    c.elevation.force,
                )
            };
            {
                let mut scene = scene.borrow_mut();
                scene.configure_angular_motor(
                    constraint,
                    1,
                    -SWEEP_LIMIT,
                    SWEEP_LIMIT,
                    bearing_cmd,
                    bearing_force,
                );
                // Elevation never rises past level; the upper limit leaves a
                // hair of slack so the motor can settle against it.
                scene.configure_angular_motor(
                    constraint,
                    0,
                    -SWEEP_LIMIT,
                    0.001,
                    elevation_cmd,
                    elevation_force,
                );
            }

            let now = world.time().elapsed();
            let shot = {
                let c = controls.borrow();
                input.borrow().pressed(c.fire)
                    && c.last_fire.is_none_or(|last| now - last >= c.fire_delay)
            };
            if !shot {
                continue;
            }

            let (position, rotation, reference) = {
                let scene = scene.borrow();
                (
                    scene.position(body),
                    scene.rotation(body),
                    scene.reference_axis(constraint),
                )
            };
            // Recover the aim from the mount: the body's yaw gives bearing,
            // its pitch relative to the constraint's reference axis gives
            // elevation.
            let bearing = -rotation.z - FRAC_PI_2;
            let elevation = rotation.x - reference.x;
            let direction = Vec3::new(
                bearing.cos() * elevation.cos(),
                elevation.sin(),
                bearing.sin() * elevation.cos(),
            );
            let barrel_length = controls.borrow().barrel_length;
            let muzzle = position + direction * (barrel_length - 1.0);

            controls.borrow_mut().last_fire = Some(now);
            log::debug!("cannon {} fired, bearing {:.2} elevation {:.2}", node.entity().id(), bearing, elevation);
            spawn(world, muzzle, direction * SHOT_IMPULSE);
        }
    });

    system
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CannonControls;
    use crate::ecs::{Entity, KindRegistry, Scheduler};
    use crate::physics::{BodyId, ConstraintId};
    use crate::systems::testutil::{MockBody, MockScene};
    use std::time::Duration;

    struct Fixture {
        world: World,
        kinds: Kinds,
        scene: Rc<RefCell<MockScene>>,
        input: Rc<RefCell<Input<Key>>>,
        shots: Rc<RefCell<Vec<(Vec3, Vec3)>>>,
        scheduler: Scheduler,
    }

    fn fixture() -> Fixture {
        let mut registry = KindRegistry::new();
        let kinds = Kinds::register(&mut registry);
        let mut world = World::new();
        let (scene, handle) = MockScene::shared();
        let input = Rc::new(RefCell::new(Input::new()));
        let shots: Rc<RefCell<Vec<(Vec3, Vec3)>>> = Rc::new(RefCell::new(Vec::new()));
        let spawner: ProjectileSpawner = {
            let shots = Rc::clone(&shots);
            Box::new(move |_, muzzle, impulse| shots.borrow_mut().push((muzzle, impulse)))
        };
        let system = create_cannon_system(&mut world, &kinds, handle, Rc::clone(&input), spawner);
        let mut scheduler = Scheduler::new();
        scheduler.add(system);
        Fixture {
            world,
            kinds,
            scene,
            input,
            shots,
            scheduler,
        }
    }

    fn spawn_cannon(f: &mut Fixture, body: BodyId, constraint: ConstraintId) -> Entity {
        f.scene.borrow_mut().bodies.insert(body, MockBody::default());
        f.scene.borrow_mut().axes.insert(constraint, Vec3::ZERO);
        let controls = CannonControls::new(Key::A, Key::D, Key::W, Key::S, Key::Space, 2.0);
        f.world
            .begin_entity("cannon")
            .with(&f.kinds.physical, body)
            .with(&f.kinds.actuated, constraint)
            .with(&f.kinds.cannon, controls)
            .finish()
    }

    #[test]
    fn motors_enabled_on_creation() {
        let mut f = fixture();
        spawn_cannon(&mut f, BodyId(1), ConstraintId(7));
        assert_eq!(
            f.scene.borrow().enabled_motors,
            vec![(ConstraintId(7), 0), (ConstraintId(7), 1)]
        );
    }

    #[test]
    fn key_state_maps_to_motor_commands() {
        let mut f = fixture();
        spawn_cannon(&mut f, BodyId(1), ConstraintId(7));
        f.input.borrow_mut().press(Key::A); // bearing up
        f.input.borrow_mut().press(Key::W); // elevation up
        f.scheduler.run(&mut f.world);

        let scene = f.scene.borrow();
        let bearing = &scene.motor_calls[0];
        assert_eq!(bearing.axis, 1);
        assert_eq!(bearing.lower_limit, -FRAC_PI_4);
        assert_eq!(bearing.upper_limit, FRAC_PI_4);
        assert_eq!(bearing.target_velocity, 0.5);
        assert_eq!(bearing.max_force, 5.0);

        let elevation = &scene.motor_calls[1];
        assert_eq!(elevation.axis, 0);
        assert_eq!(elevation.lower_limit, -FRAC_PI_4);
        assert_eq!(elevation.upper_limit, 0.001);
        // Raising the barrel drives the hinge negative.
        assert_eq!(elevation.target_velocity, -0.5);
    }

    #[test]
    fn idle_keys_command_zero_velocity() {
        let mut f = fixture();
        spawn_cannon(&mut f, BodyId(1), ConstraintId(7));
        f.scheduler.run(&mut f.world);
        let scene = f.scene.borrow();
        assert_eq!(scene.motor_calls[0].target_velocity, 0.0);
        assert_eq!(scene.motor_calls[1].target_velocity, 0.0);
    }

    #[test]
    fn fire_is_rate_limited() {
        let mut f = fixture();
        spawn_cannon(&mut f, BodyId(1), ConstraintId(7));
        f.input.borrow_mut().press(Key::Space);

        // A fresh cannon fires immediately.
        f.scheduler.run(&mut f.world);
        assert_eq!(f.shots.borrow().len(), 1);

        // Held fire within the delay does nothing.
        f.world.time_mut().advance(Duration::from_millis(500));
        f.scheduler.run(&mut f.world);
        assert_eq!(f.shots.borrow().len(), 1);

        // Once the delay elapses, the next shot goes out.
        f.world.time_mut().advance(Duration::from_millis(500));
        f.scheduler.run(&mut f.world);
        assert_eq!(f.shots.borrow().len(), 2);
    }

    #[test]
    fn inactive_cannon_is_skipped() {
        let mut f = fixture();
        let cannon = spawn_cannon(&mut f, BodyId(1), ConstraintId(7));
        cannon
            .component(f.kinds.cannon.kind())
            .unwrap()
            .borrow_mut()
            .active = false;
        f.input.borrow_mut().press(Key::Space);
        f.scheduler.run(&mut f.world);

        assert!(f.shots.borrow().is_empty());
        assert!(f.scene.borrow().motor_calls.is_empty());
    }

    #[test]
    fn level_cannon_fires_along_negative_z() {
        let mut f = fixture();
        spawn_cannon(&mut f, BodyId(1), ConstraintId(7));
        f.scene.borrow_mut().bodies.insert(
            BodyId(1),
            MockBody {
                position: Vec3::new(1.0, 2.0, 3.0),
                ..MockBody::default()
            },
        );
        f.input.borrow_mut().press(Key::Space);
        f.scheduler.run(&mut f.world);

        let shots = f.shots.borrow();
        let (muzzle, impulse) = shots[0];
        // Zero rotation aims straight down -Z; barrel length 2 puts the
        // muzzle one unit out.
        assert!((muzzle - Vec3::new(1.0, 2.0, 2.0)).length() < 1e-4);
        assert!((impulse - Vec3::new(0.0, 0.0, -SHOT_IMPULSE)).length() < 1e-3);
    }
}
