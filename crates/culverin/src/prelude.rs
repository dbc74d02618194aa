//! One-stop imports for runtime users.

pub use crate::components::{
    Actuated, AxisControls, CannonControls, Destroyer, Health, Kinds, Physical, TargetValue,
};
pub use crate::ecs::{
    Blueprint, Entity, EntityBuilder, EntityId, EventChannel, Instance, Kind, KindId, KindRegistry,
    ListenerId, Node, Scheduler, Signature, System, World,
};
pub use crate::input::{Input, Key};
pub use crate::physics::{
    BodyId, ConstraintId, Contact, ContactHandler, ContactRouter, PhysicsScene, SceneHandle,
};
pub use crate::systems::cannon::{create_cannon_system, ProjectileSpawner};
pub use crate::systems::cleanup::create_cleanup_system;
pub use crate::systems::health::{create_health_system, DESTRUCTION_GRACE};
pub use crate::systems::score::{create_score_system, ScoreBoard};
pub use crate::time::Time;
