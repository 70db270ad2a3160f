//! Debug-only probe guard.
//!
//! A probe runs user code (`Hash` and `Eq` of the key type) while the table
//! walks a chain. If that code reaches back into the same table, the
//! chain being walked could be relinked underneath it. Debug builds turn
//! such nested entry into a panic; release builds keep only the marker.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table probe tracker. Every public table operation that runs user
/// code takes `let _g = self.probe.enter();` first.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // `!Sync` in every build profile; the table has no internal locking.
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _unsync: PhantomData,
        }
    }

    /// Marks a probe as running until the returned guard is dropped.
    ///
    /// Panics in debug builds if a probe is already running.
    #[inline]
    pub(crate) fn enter(&self) -> ProbeGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrant call into ChainTable from a key's Hash or Eq impl"
            );
            return ProbeGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ProbeGuard { _owner: PhantomData };
        }
    }

    #[cfg(all(test, debug_assertions))]
    fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII marker for a running probe.
pub(crate) struct ProbeGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a DebugReentrancy>,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_probes_are_fine() {
        let r = DebugReentrancy::new();
        drop(r.enter());
        drop(r.enter());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn guard_clears_on_drop() {
        let r = DebugReentrancy::new();
        {
            let _g = r.enter();
            assert!(r.is_active());
        }
        assert!(!r.is_active());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_probe_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter();
            let _inner = r.enter();
        }));
        assert!(res.is_err(), "expected nested probe to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_probe_is_noop_in_release() {
        let r = DebugReentrancy::new();
        let _outer = r.enter();
        let _inner = r.enter();
    }
}
