//! The process-local group-name cache published during a vulnerability
//! feed sync so downstream match recomputation can check whether a
//! namespace is relevant without re-querying feed metadata.
//!
//! `vulnerability_processing_fn`'s signature is fixed by the external
//! contract (`Fn(&DatabaseTransaction, &vulnerability::Model) ->
//! Vec<Uuid>`, no extra parameter — see `SPEC_FULL.md` §6), so this can't be
//! threaded through as an explicit argument the way the REDESIGN FLAGS'
//! "thread-local cache → explicit context" note would otherwise suggest.
//! What we *can* do is keep it off a bare global: it's a typed cache with an
//! explicit `add`/`flush` API, scoped per OS thread (one sync per worker,
//! per the concurrency model), rather than a hidden singleton threaded
//! through reflection.

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    static GROUP_NAMES: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Handle onto the current worker thread's group-name cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupNameCache;

impl GroupNameCache {
    /// Publish `names` as the current feed's group names for the duration
    /// of a sync.
    pub fn add<I: IntoIterator<Item = String>>(names: I) {
        GROUP_NAMES.with(|cache| cache.borrow_mut().extend(names));
    }

    /// Unconditionally clear the cache. Must be called on every sync exit,
    /// success or failure, so it never leaks between consecutive syncs on
    /// the same worker.
    pub fn flush() {
        GROUP_NAMES.with(|cache| cache.borrow_mut().clear());
    }

    /// True if `name` was published by the current sync.
    pub fn contains(name: &str) -> bool {
        GROUP_NAMES.with(|cache| cache.borrow().contains(name))
    }

    /// Number of names currently published (used by tests to assert the
    /// cache is empty after a sync returns).
    pub fn len() -> usize {
        GROUP_NAMES.with(|cache| cache.borrow().len())
    }
}
