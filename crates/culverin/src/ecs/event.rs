//! # Event Channel — Ordered Synchronous Fan-Out
//!
//! A minimal topic: listeners register in order, a trigger invokes each of
//! them synchronously with the event payload and a `&mut World` to act on.
//! The entity lifecycle topics ("created", "destroyed") and per-value
//! notifications (health changed) are all instances of this one primitive.
//!
//! ## Snapshot semantics
//!
//! A listener may remove itself — or any other listener — while a trigger is
//! in flight. To keep that from skipping or double-calling anyone, a trigger
//! operates on a **snapshot** of the listener list taken when it starts:
//!
//! ```text
//! trigger begins          snapshot = [L1, L2, L3]
//! L1 runs, removes L3
//! L2 runs
//! L3 runs                 ← still called this trigger; gone from the next
//! ```
//!
//! Because the channel usually lives *inside* the thing being mutated (the
//! [`World`], a health component), triggering is split in two: the owner calls
//! [`EventChannel::snapshot`], drops its borrow of the channel, then invokes
//! the snapshotted listeners. That is also what makes the borrow checker happy
//! about handing each listener `&mut World`.

use std::rc::Rc;

use super::world::World;

/// Identifies one registration on one channel, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A registered listener: shared so a trigger can hold the snapshot while the
/// channel itself is free to be mutated.
pub type Listener<P> = Rc<dyn Fn(&mut World, &P)>;

/// An ordered list of listeners with synchronous fan-out.
pub struct EventChannel<P> {
    listeners: Vec<(ListenerId, Listener<P>)>,
    next_id: u64,
}

impl<P> EventChannel<P> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener. Listeners fire in registration order.
    pub fn add(&mut self, listener: impl Fn(&mut World, &P) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id is unknown (already
    /// removed, or from another channel) — an expected no-op, not an error.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Clone out the current listener list. A trigger iterates this snapshot,
    /// so removals during the trigger only affect future triggers.
    pub fn snapshot(&self) -> Vec<Listener<P>> {
        self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<P> Default for EventChannel<P> {
    fn default() -> Self {
        Self::new()
    }
}
