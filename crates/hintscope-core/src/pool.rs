//! Pooled scratch maps for transient scope assembly.
//!
//! Building the type-parameter layer of a forward scope needs a short-lived
//! mutable mapping that never outlives one scope construction. Those maps
//! are recycled through a thread-local free list instead of being
//! reallocated per build.
//!
//! [`acquire_scratch_map`] returns an RAII guard; dropping the guard clears
//! the map and returns it to the pool, on every exit path. Contents never
//! survive a release, so nothing leaks between entities.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::scope::ScopeMap;

/// Upper bound on retained maps, to bound memory reuse.
const MAX_POOLED: usize = 8;

thread_local! {
    static POOL: RefCell<Vec<ScopeMap>> = const { RefCell::new(Vec::new()) };
}

/// A scratch [`ScopeMap`] borrowed from the pool.
///
/// Dereferences to the underlying map. Dropping clears the map and returns
/// it to the pool.
#[derive(Debug)]
pub struct ScratchMap {
    map: Option<ScopeMap>,
}

/// Borrow a scratch map from the pool, allocating if the pool is empty.
pub fn acquire_scratch_map() -> ScratchMap {
    let map = POOL
        .with(|pool| pool.borrow_mut().pop())
        .unwrap_or_default();
    trace!("scratch map acquired");
    ScratchMap { map: Some(map) }
}

impl Deref for ScratchMap {
    type Target = ScopeMap;

    fn deref(&self) -> &Self::Target {
        // Invariant: the map is present until drop.
        self.map.as_ref().expect("scratch map already released")
    }
}

impl DerefMut for ScratchMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.map.as_mut().expect("scratch map already released")
    }
}

impl Drop for ScratchMap {
    fn drop(&mut self) {
        if let Some(mut map) = self.map.take() {
            map.clear();
            POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOLED {
                    pool.push(map);
                }
            });
            trace!("scratch map released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Value;

    #[test]
    fn test_acquire_starts_empty() {
        let scratch = acquire_scratch_map();
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_release_clears_contents() {
        {
            let mut scratch = acquire_scratch_map();
            scratch.insert("T".to_string(), Value::Int(1));
            assert_eq!(scratch.len(), 1);
        }
        // Whatever map the pool hands back next must not carry old bindings.
        let scratch = acquire_scratch_map();
        assert!(scratch.is_empty());
    }

    #[test]
    fn test_concurrent_guards_are_independent() {
        let mut a = acquire_scratch_map();
        let mut b = acquire_scratch_map();
        a.insert("A".to_string(), Value::Int(1));
        b.insert("B".to_string(), Value::Int(2));
        assert!(!a.contains_key("B"));
        assert!(!b.contains_key("A"));
    }
}
