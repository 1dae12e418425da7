//! Debug-only reentrancy check.
//!
//! `SampleSet` runs caller-supplied `Eq` and `Hash` code while its internal
//! state is mid-update. A probe that calls back into the same set from those
//! impls would observe (or corrupt) a half-finished operation, so guarded
//! entry points take a [`ReentryGuard`] first. In debug builds a nested
//! `enter` panics; release builds keep only the depth bookkeeping.
//!
//! The depth cell is present in all builds so the containing type's auto
//! traits do not change between profiles.

use core::cell::Cell;

/// Per-instance reentrancy tracker. Embed in a struct and guard entry points
/// with `let _g = self.reentry.enter();`.
#[derive(Debug)]
pub(crate) struct ReentryCheck {
    depth: Cell<u32>,
}

impl ReentryCheck {
    /// Create a new tracker. Const so it can sit in const constructors.
    pub(crate) const fn new() -> Self {
        Self {
            depth: Cell::new(0),
        }
    }

    /// Enter a guarded section. In debug builds, panics if already entered.
    #[inline]
    pub(crate) fn enter(&self) -> ReentryGuard<'_> {
        let d = self.depth.get();
        debug_assert!(
            d == 0,
            "reentrant call: user Eq/Hash re-entered the container mid-operation"
        );
        self.depth.set(d + 1);
        ReentryGuard { owner: self }
    }
}

impl Default for ReentryCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `ReentryCheck::enter`.
pub(crate) struct ReentryGuard<'a> {
    owner: &'a ReentryCheck,
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        let d = self.owner.depth.get();
        debug_assert!(d > 0);
        self.owner.depth.set(d - 1);
    }
}
