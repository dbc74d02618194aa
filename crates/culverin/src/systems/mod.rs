//! # Gameplay Systems
//!
//! Concrete systems built on the runtime: each one declares its required
//! kinds, activates its node tracking, and layers its own lifecycle listeners
//! next to the standard hooks.
//!
//! - [`health`] — contact damage, destroyer elimination, grace-delayed death
//! - [`cannon`] — motorized aim from input, rate-limited firing
//! - [`score`] — accumulates target value on destruction
//! - [`cleanup`] — removes anything that fell below the kill floor

pub mod cannon;
pub mod cleanup;
pub mod health;
pub mod score;

#[cfg(test)]
pub(crate) mod testutil;
