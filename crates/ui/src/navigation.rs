//! Navigation state machine: a bounded stack of [`ScreenId`]s.
//!
//! `Home` is always the root. Showing `Home` collapses the stack back to it;
//! showing any other screen pushes it unless it is already on top. Pushing
//! when the stack is full is a silent no-op (embedded reality: bounded buffer).

use heapless::Vec;
use platform::ScreenId;

/// Deepest stack: home, station select, spare room for later screens.
pub const MAX_DEPTH: usize = 4;

/// Navigation stack bounded at [`MAX_DEPTH`] entries.
pub struct Navigator {
    stack: Vec<ScreenId, MAX_DEPTH>,
}

impl Navigator {
    /// Create a new navigator with `Home` as the root screen.
    pub fn new() -> Self {
        let mut stack = Vec::new();
        // This push always succeeds: the stack starts empty.
        stack.push(ScreenId::Home).ok();
        Navigator { stack }
    }

    /// Return the screen currently at the top of the stack.
    #[must_use]
    pub fn current(&self) -> ScreenId {
        match self.stack.last() {
            Some(s) => *s,
            None => ScreenId::Home, // unreachable by construction
        }
    }

    /// Bring `screen` to the top. Returns `true` if the visible screen changed.
    pub fn show(&mut self, screen: ScreenId) -> bool {
        if self.current() == screen {
            return false;
        }
        if screen == ScreenId::Home {
            self.stack.truncate(1);
        } else {
            self.stack.push(screen).ok();
        }
        true
    }

    /// Pop the top screen. Does nothing if only the root screen remains.
    pub fn back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Return the number of entries currently on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
