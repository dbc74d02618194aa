//! # Entity — Identity Plus an Ordered Bag of Components
//!
//! An entity is an identity, an ordered collection of (kind → component
//! instance) bindings assembled once at construction, a derived
//! [`Signature`], an optional display tag, and an optional teardown callback.
//! Once an entity goes live its component set never changes — the signature
//! computed at `finish()` holds for its whole lifetime.
//!
//! ## Design: generational ids
//!
//! Identities are recycled, but only after destruction completes. A plain
//! counter would let a stale handle silently alias a newer entity occupying
//! the same slot, so each slot carries a generation that bumps on every
//! recycle:
//!
//! ```text
//! EntityId { index: 5, generation: 0 }  ← original
//! EntityId { index: 5, generation: 1 }  ← after the slot is reused
//! ```
//!
//! Stale handles fail the generation check and read as dead. hecs and
//! bevy_ecs use the same scheme; ours is two bare `u32`s.
//!
//! ## Design: shared component cells
//!
//! Component instances are stored as `Rc<RefCell<dyn Any>>`. The `Rc` is what
//! lets a system's node cache and a collision handler hold *direct references*
//! to a component rather than re-looking it up through the world every frame;
//! the `RefCell` enforces the single-threaded aliasing rules at runtime; the
//! `dyn Any` erasure is what lets one entity mix kinds of different Rust
//! types. Typed access goes through [`Instance<T>`], which can only be minted
//! via a matching [`Kind<T>`], so the downcast cannot fail in well-typed code.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::kind::{Kind, KindId};
use super::signature::Signature;

/// A lightweight handle to an entity. Valid only for the
/// [`World`](super::world::World) that created it, and only while its
/// generation matches.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EntityId {
    /// Slot index. Recycled after destruction; diagnostics only.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation counter for this slot.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity identities and recycles them once destruction completes.
///
/// Spawning pops a free slot if one exists (its generation was already bumped
/// when it was freed), otherwise grows a fresh one.
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free_list.pop() {
            EntityId {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.len;
            self.len += 1;
            self.generations.push(0);
            EntityId {
                index,
                generation: 0,
            }
        }
    }

    /// Free an identity. Bumps the slot's generation so existing handles go
    /// stale. Returns `false` if the handle was already stale.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        let slot = id.index as usize;
        if slot < self.generations.len() && self.generations[slot] == id.generation {
            self.generations[slot] += 1;
            self.free_list.push(id.index);
            true
        } else {
            false
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        let slot = id.index as usize;
        slot < self.generations.len() && self.generations[slot] == id.generation
    }
}

/// Type-erased shared component storage. See the module docs for why this is
/// `Rc<RefCell<dyn Any>>`.
pub(crate) type ComponentCell = Rc<RefCell<dyn Any>>;

/// A typed, shared reference to one component instance.
///
/// Cloning an `Instance` clones the reference, never the component. Borrow
/// rules are enforced at runtime: holding a mutable borrow across a call that
/// re-enters the same component panics, which always indicates a handler
/// keeping a borrow alive longer than it should.
pub struct Instance<T: 'static> {
    cell: ComponentCell,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Instance<T> {
    pub(crate) fn new(cell: ComponentCell) -> Self {
        Self {
            cell,
            _marker: PhantomData,
        }
    }

    /// Immutably borrow the component.
    pub fn borrow(&self) -> Ref<'_, T> {
        Ref::map(self.cell.borrow(), |any| {
            any.downcast_ref::<T>().unwrap_or_else(|| {
                panic!(
                    "Component cell does not hold a `{}`",
                    std::any::type_name::<T>()
                )
            })
        })
    }

    /// Mutably borrow the component.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.cell.borrow_mut(), |any| {
            any.downcast_mut::<T>().unwrap_or_else(|| {
                panic!(
                    "Component cell does not hold a `{}`",
                    std::any::type_name::<T>()
                )
            })
        })
    }
}

impl<T: 'static> Clone for Instance<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            _marker: PhantomData,
        }
    }
}

pub(crate) struct EntityData {
    id: EntityId,
    tag: String,
    signature: Signature,
    /// (kind, instance) pairs in attachment order.
    components: Vec<(KindId, ComponentCell)>,
    /// Invoked exactly once, before the entity leaves the live set. This is
    /// where owned external resources (the physical body backing the entity,
    /// say) get released.
    on_destroy: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// A live (or just-destroyed, when received by a "destroyed" listener) entity
/// record. Cheap to clone — this is a shared handle to the record, not a copy.
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityData>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        tag: String,
        signature: Signature,
        components: Vec<(KindId, ComponentCell)>,
    ) -> Self {
        Self {
            inner: Rc::new(EntityData {
                id,
                tag,
                signature,
                components,
                on_destroy: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    /// Display tag, for diagnostics. Never used for identity or matching.
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// The signature derived at construction. Fixed for the entity's lifetime.
    pub fn signature(&self) -> Signature {
        self.inner.signature
    }

    /// Does this entity carry every kind in `required`?
    pub fn contains_signature(&self, required: Signature) -> bool {
        required.is_subset_of(&self.inner.signature)
    }

    /// Typed access to one component, or `None` if the entity does not carry
    /// the kind.
    pub fn component<T: 'static>(&self, kind: Kind<T>) -> Option<Instance<T>> {
        self.cell(kind.id()).map(Instance::new)
    }

    pub(crate) fn cell(&self, kind: KindId) -> Option<ComponentCell> {
        self.inner
            .components
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, cell)| Rc::clone(cell))
    }

    /// Register the teardown callback. It runs before the "destroyed"
    /// notification fires. Setting it twice replaces the previous callback.
    pub fn set_on_destroy(&self, callback: impl FnOnce() + 'static) {
        *self.inner.on_destroy.borrow_mut() = Some(Box::new(callback));
    }

    pub(crate) fn take_on_destroy(&self) -> Option<Box<dyn FnOnce()>> {
        self.inner.on_destroy.borrow_mut().take()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity(\"{}\", {})", self.inner.tag, self.inner.id)
    }
}
