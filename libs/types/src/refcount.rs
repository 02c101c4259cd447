//! # Reference Counting - Holder Accounting for Shared Entities
//!
//! ## Purpose
//!
//! Communities and realms are shared by many memberships. Memory is owned by
//! `Arc`, but the owning collections also need to know how many memberships
//! currently point at an entity so they can decide when to drop it. That
//! count is tracked separately from the `Arc` strong count, because registries,
//! iterators and monitoring snapshots hold `Arc`s too.
//!
//! `Counted<T>` is the only way a membership holds an entity: creating or
//! cloning one increments the entity's count, dropping it decrements. A
//! membership's destruction therefore can never leave a dangling increment.
//!
//! ```
//! use std::sync::Arc;
//! use types::{Counted, IdpRealm, Refcounted};
//!
//! let realm = Arc::new(IdpRealm::new("idp.example.org"));
//! let held = Counted::new(Arc::clone(&realm));
//! assert_eq!(realm.refcount(), 1);
//! drop(held);
//! assert_eq!(realm.refcount(), 0);
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Atomic holder count. Decrement saturates at zero.
#[derive(Debug, Default)]
pub struct RefCount(AtomicU32);

impl RefCount {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Returns the count after incrementing.
    pub fn incref(&self) -> u32 {
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_add(1)))
            .unwrap_or_else(|n| n);
        previous.saturating_add(1)
    }

    /// Returns the count after decrementing.
    pub fn decref(&self) -> u32 {
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)))
            .unwrap_or_else(|n| n);
        if previous == 0 {
            warn!("decref on entity with zero holders");
        }
        previous.saturating_sub(1)
    }
}

/// Entities whose holders are counted.
pub trait Refcounted {
    fn refcount_cell(&self) -> &RefCount;

    fn refcount(&self) -> u32 {
        self.refcount_cell().get()
    }

    fn incref(&self) -> u32 {
        self.refcount_cell().incref()
    }

    fn decref(&self) -> u32 {
        self.refcount_cell().decref()
    }
}

/// A counted reference: increments on creation and clone, decrements on drop.
pub struct Counted<T: Refcounted>(Arc<T>);

impl<T: Refcounted> Counted<T> {
    pub fn new(inner: Arc<T>) -> Self {
        inner.incref();
        Self(inner)
    }

    /// The underlying shared pointer, for callers that need to keep the
    /// entity alive without counting as a holder.
    pub fn shared(&self) -> &Arc<T> {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Arc<T>) -> bool {
        Arc::ptr_eq(&self.0, other)
    }
}

impl<T: Refcounted> Clone for Counted<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.0))
    }
}

impl<T: Refcounted> Drop for Counted<T> {
    fn drop(&mut self) {
        self.0.decref();
    }
}

impl<T: Refcounted> Deref for Counted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Refcounted + fmt::Debug> fmt::Debug for Counted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Counted").field(&*self.0).finish()
    }
}
