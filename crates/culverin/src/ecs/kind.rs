//! # Kind — Registered Component Categories
//!
//! Every component category ("kind") gets a unique ordinal from the
//! [`KindRegistry`], assigned once, monotonically, at startup. The ordinal is
//! what [`Signature`](super::signature::Signature) bitmasks and entity
//! component tables are keyed by.
//!
//! Two layers sit on top of the raw ordinal:
//!
//! - [`Kind<T>`] — a typed handle pairing the ordinal with the Rust type of
//!   the component it stores. Attaching and looking up components goes through
//!   `Kind<T>`, so the type-erased storage underneath can never be read at the
//!   wrong type.
//! - [`Blueprint<A, T>`] — a kind plus its factory. The factory builds a
//!   component's state from typed constructor arguments, and is pure with
//!   respect to the registry: defining or building one kind never touches
//!   another.
//!
//! ## Comparison
//!
//! - **bevy_ecs / hecs**: use `TypeId` as the component key. We use a dense
//!   registry-assigned ordinal instead so signatures can be a plain bitmask
//!   and two kinds may even share a Rust type.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::signature::MAX_KINDS;

/// The ordinal of a registered component kind. Unique per [`KindRegistry`]
/// and stable for the life of the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(u32);

impl KindId {
    /// The raw ordinal. This is the bit index used in signatures.
    pub fn ordinal(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_ordinal(ordinal: u32) -> Self {
        KindId(ordinal)
    }
}

impl fmt::Debug for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KindId({})", self.0)
    }
}

/// A typed handle to a registered kind.
///
/// `Kind<T>` is `Copy` and carries no data beyond the ordinal, so it can be
/// captured freely by listener closures.
pub struct Kind<T> {
    id: KindId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Kind<T> {
    pub fn id(&self) -> KindId {
        self.id
    }
}

impl<T> Clone for Kind<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Kind<T> {}

impl<T> fmt::Debug for Kind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind<{}>({})", std::any::type_name::<T>(), self.id.0)
    }
}

/// A registered kind together with its factory.
///
/// `build` applies the factory to typed constructor arguments and returns a
/// fresh component instance. Calling `build` with arguments the factory cannot
/// digest is a compile error here, not a runtime condition — the argument type
/// `A` is fixed at registration.
pub struct Blueprint<A, T> {
    kind: Kind<T>,
    factory: Rc<dyn Fn(A) -> T>,
}

impl<A, T> Blueprint<A, T> {
    /// The typed kind handle this blueprint registers under.
    pub fn kind(&self) -> Kind<T> {
        self.kind
    }

    /// Build one component instance from constructor arguments.
    pub fn build(&self, args: A) -> T {
        (self.factory)(args)
    }
}

impl<A, T> Clone for Blueprint<A, T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            factory: Rc::clone(&self.factory),
        }
    }
}

/// Assigns kind ordinals. Create one at startup, define every kind through
/// it, then hand the resulting [`Blueprint`]s to whoever assembles entities.
///
/// Kind definition cannot fail; exhausting the ordinal space (more than
/// [`MAX_KINDS`] kinds) is a programmer error and panics.
pub struct KindRegistry {
    next: u32,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Register a new kind with the given factory and return its blueprint.
    ///
    /// Ordinals are handed out monotonically: the first kind defined gets
    /// ordinal 0, the next 1, and so on.
    ///
    /// # Panics
    ///
    /// Panics if [`MAX_KINDS`] kinds have already been defined.
    pub fn define<A, T: 'static>(&mut self, factory: impl Fn(A) -> T + 'static) -> Blueprint<A, T> {
        assert!(
            (self.next as usize) < MAX_KINDS,
            "Cannot define more than {} component kinds",
            MAX_KINDS
        );
        let id = KindId(self.next);
        self.next += 1;
        Blueprint {
            kind: Kind {
                id,
                _marker: PhantomData,
            },
            factory: Rc::new(factory),
        }
    }

    /// Number of kinds defined so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
