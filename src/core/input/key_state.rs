//=========================================================================
// Key State
//=========================================================================
//
// Persistent record of which keys are currently held.
//
// Architecture:
//   KeyDown → press() → HashSet (keys held) → held() / is_held()
//   KeyUp   → release()
//
// `press` reports whether the key transitioned UP → DOWN, which is what
// the dispatcher uses to fire "pressed" handlers exactly once per press.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::KeyCode;

//=== KeyState ============================================================

/// Tracks keys held across frame boundaries.
#[derive(Debug, Default)]
pub struct KeyState {
    held: HashSet<KeyCode>,
}

impl KeyState {
    /// Creates an empty key state (nothing held).
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
        }
    }

    //--- Transitions ------------------------------------------------------

    /// Marks a key as held.
    ///
    /// Returns `true` if the key was not already held.
    pub(crate) fn press(&mut self, key: KeyCode) -> bool {
        self.held.insert(key)
    }

    /// Marks a key as released. Releasing a key that is not held is a no-op.
    ///
    /// Returns `true` if the key was held.
    pub(crate) fn release(&mut self, key: KeyCode) -> bool {
        self.held.remove(&key)
    }

    //--- Queries ----------------------------------------------------------

    /// Returns `true` while `key` is held.
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Returns the held keys in a stable (sorted) order.
    pub fn held(&self) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self.held.iter().copied().collect();
        keys.sort();
        keys
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// Returns `true` if no key is held.
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
