//! Debug-only detection of user code re-entering a set.
//!
//! `DynamicHashSet` calls `T: Hash` and `T: Eq` while a bucket is borrowed.
//! If that code reaches back into the same set, debug builds panic instead
//! of observing a half-updated chain. Release builds carry no state.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Per-set flag marking an open critical section.
#[derive(Debug, Default)]
pub(crate) struct ReentryCheck {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // The set is single-threaded; keep it !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl ReentryCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Opens a critical section that lasts until the returned scope drops.
    ///
    /// Panics in debug builds when a section is already open.
    #[inline]
    pub(crate) fn enter(&self) -> ReentryScope<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: set accessed from inside its own Hash/Eq call"
            );
        }
        ReentryScope { owner: self }
    }
}

/// Closes the critical section on drop.
pub(crate) struct ReentryScope<'a> {
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    owner: &'a ReentryCheck,
}

impl Drop for ReentryScope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
