//! Scoped marker for controller-driven native calls.
//!
//! Native pagers report every visible-page change, including the ones the
//! controller itself asked for. [`SwipeGuard`] marks the region in which the
//! controller is driving the widget so those echoes are not mistaken for a
//! user swipe. The flag is restored when the guarded region exits, whether
//! it returns normally or unwinds.
use std::cell::Cell;

/// Reentrancy flag separating controller-driven from user-driven changes.
#[derive(Debug, Default)]
pub struct SwipeGuard {
    controller_driven: Cell<bool>,
}

impl SwipeGuard {
    /// Creates a guard in the user-driven state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` with the controller-driven flag raised.
    ///
    /// Nesting is not supported; a nested call is reported and the outer
    /// region keeps ownership of the flag.
    pub fn run_guarded<R>(&self, action: impl FnOnce() -> R) -> R {
        let _scope = self.enter();
        action()
    }

    /// Whether the caller is outside every guarded region.
    pub fn is_user_driven(&self) -> bool {
        !self.controller_driven.get()
    }

    fn enter(&self) -> GuardScope<'_> {
        let was_driven = self.controller_driven.replace(true);
        if was_driven {
            tracing::warn!("nested SwipeGuard region; outer region keeps the flag");
        }
        GuardScope {
            flag: &self.controller_driven,
            restore: was_driven,
        }
    }
}

struct GuardScope<'a> {
    flag: &'a Cell<bool>,
    restore: bool,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.flag.set(self.restore);
    }
}
