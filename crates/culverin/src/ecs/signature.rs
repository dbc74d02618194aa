//! # Signature — Component Set Membership as a Bitmask
//!
//! A [`Signature`] is an immutable set of component kind ordinals. It answers
//! two questions in O(1):
//!
//! - does this entity carry kind `k`? ([`Signature::contains`])
//! - does this entity carry everything system `s` requires?
//!   ([`Signature::is_subset_of`])
//!
//! Both an entity's component set and a system's requirements are expressed as
//! signatures, so matching an entity against a system is a single mask test.
//!
//! ## Design: one `u64`
//!
//! Kind ordinals are dense small integers assigned by the
//! [`KindRegistry`](super::kind::KindRegistry), so a fixed 64-bit mask covers
//! every realistic game (this runtime ships six kinds). The registry refuses to
//! define more than [`MAX_KINDS`] kinds, which keeps `insert` infallible here.

use std::fmt;

use super::kind::KindId;

/// Maximum number of component kinds a [`KindRegistry`](super::kind::KindRegistry)
/// can define. Bounded by the signature bitmask width.
pub const MAX_KINDS: usize = 64;

/// An immutable set of component kind ordinals, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u64);

impl Signature {
    /// The empty signature. A system with this signature matches every entity.
    pub const EMPTY: Signature = Signature(0);

    /// Build a signature from a list of kind ordinals.
    pub fn from_kinds(kinds: &[KindId]) -> Self {
        let mut sig = Signature::EMPTY;
        for &kind in kinds {
            sig.insert(kind);
        }
        sig
    }

    /// Add a kind to the set. Idempotent.
    pub fn insert(&mut self, kind: KindId) {
        debug_assert!((kind.ordinal() as usize) < MAX_KINDS);
        self.0 |= 1 << kind.ordinal();
    }

    /// Does the set contain this kind?
    pub fn contains(&self, kind: KindId) -> bool {
        self.0 & (1 << kind.ordinal()) != 0
    }

    /// Is every kind in `self` also in `other`? (`self ⊆ other`)
    ///
    /// The subset direction matters: a system's *required* signature must be a
    /// subset of the *entity's* signature for the system to operate on it.
    pub fn is_subset_of(&self, other: &Signature) -> bool {
        self.0 & other.0 == self.0
    }

    /// Returns `true` if the set contains no kinds.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#b})", self.0)
    }
}
