//! Digital input state.
//!
//! The [`Input`] tracker records which inputs are currently held, just
//! pressed this tick, or just released this tick. The driver feeds it from
//! whatever input backend it has; the runtime only ever asks "is this held".

use std::collections::HashSet;
use std::hash::Hash;

/// Key identifiers for the bindings this runtime cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    Up,
    Down,
    Left,
    Right,
}

/// Tracks the state of a set of digital inputs.
///
/// - `pressed`: currently held down
/// - `just_pressed`: went down this tick
/// - `just_released`: went up this tick
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input went down this tick.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input went up this tick.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Record a press, from the driver's event source.
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    /// Record a release, from the driver's event source.
    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Clear per-tick state. Call at the start of each tick.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_until_released() {
        let mut input = Input::new();
        input.press(Key::Space);
        assert!(input.pressed(Key::Space));
        assert!(input.just_pressed(Key::Space));

        input.clear_just();
        assert!(input.pressed(Key::Space)); // still held
        assert!(!input.just_pressed(Key::Space));

        input.release(Key::Space);
        assert!(!input.pressed(Key::Space));
        assert!(input.just_released(Key::Space));
    }

    #[test]
    fn repeated_press_is_not_just_pressed_again() {
        let mut input = Input::new();
        input.press(Key::W);
        input.clear_just();
        input.press(Key::W); // key repeat while held
        assert!(!input.just_pressed(Key::W));
    }
}
