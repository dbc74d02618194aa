//! # Score System — Value Accumulation on Destruction
//!
//! Watches the "destroyed" channel and banks the target value of every
//! eliminated entity that carries one. The value is read off the detached
//! record, so any modifier applied during the fatal contact (a destroyer
//! scaling the value up) is already baked in.
//!
//! This system has no per-tick update and never activates node tracking; it
//! only needs the signature matcher and the lifecycle channel.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::components::Kinds;
use crate::ecs::{System, World};

/// Running score. Shared with whoever displays it.
pub struct ScoreBoard {
    total: Cell<f64>,
}

impl ScoreBoard {
    fn new() -> Self {
        Self { total: Cell::new(0.0) }
    }

    pub fn total(&self) -> f64 {
        self.total.get()
    }

    fn bank(&self, value: f64) {
        self.total.set(self.total.get() + value);
    }
}

/// Build the score system and its board.
pub fn create_score_system(
    world: &mut World,
    kinds: &Kinds,
) -> (Rc<RefCell<System>>, Rc<ScoreBoard>) {
    let target = kinds.target.kind();
    let system = System::new([target.id()]);
    let board = Rc::new(ScoreBoard::new());

    {
        let matcher = Rc::clone(&system);
        let board = Rc::clone(&board);
        world.on_destroyed(move |_, entity| {
            if !matcher.borrow().can_operate_on(entity) {
                return;
            }
            let value = entity
                .component(target)
                .expect("matched signature implies a target component")
                .borrow()
                .value;
            board.bank(value);
            log::info!("banked {} from {:?}, total {}", value, entity, board.total());
        });
    }

    (system, board)
}
