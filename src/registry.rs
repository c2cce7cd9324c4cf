//! Deduplication registry: exactly one generated guard per distinct type
//! identity per run.
//!
//! Requests arrive unordered, duplicated, and possibly concurrently across
//! compilation units. The registry reduces that stream so only the first
//! registration of an identity proceeds to fact extraction and emission; on a
//! same-identity race, the `DashSet` insert guarantees exactly one caller
//! observes [`Registration::Fresh`]. First-registration order is recorded so
//! emission is run-stable and output reproducible.

use dashmap::DashSet;
use std::sync::Mutex;

use crate::enum_info::EnumTypeId;

/// Outcome of registering a type identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// First time this identity was seen in the run; the caller owns fact
    /// extraction for it.
    Fresh,
    /// Already scheduled by an earlier (or concurrent) request; contribute
    /// nothing further.
    AlreadySeen,
}

/// Per-run set of scheduled type identities.
///
/// Comparison is by [`EnumTypeId`] value, never by display name, so two
/// distinct types that render identically in source stay separate. The
/// registry is constructed at run start and discarded at run end; nothing
/// persists across runs.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    seen: DashSet<EnumTypeId>,
    order: Mutex<Vec<EnumTypeId>>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        TypeRegistry {
            seen: DashSet::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Register a type identity.
    ///
    /// Safe to call concurrently; exactly one caller per identity gets
    /// [`Registration::Fresh`].
    pub fn register(&self, id: EnumTypeId) -> Registration {
        if self.seen.insert(id) {
            if let Ok(mut order) = self.order.lock() {
                order.push(id);
            }
            Registration::Fresh
        } else {
            Registration::AlreadySeen
        }
    }

    /// Check whether an identity has been registered.
    pub fn contains(&self, id: EnumTypeId) -> bool {
        self.seen.contains(&id)
    }

    /// Number of distinct identities registered.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Identities in first-registration order.
    pub fn registration_order(&self) -> Vec<EnumTypeId> {
        self.order.lock().map(|order| order.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_registration_is_already_seen() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.register(EnumTypeId(1)), Registration::Fresh);
        assert_eq!(registry.register(EnumTypeId(1)), Registration::AlreadySeen);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_identities_stay_separate() {
        // Two types may share a display name; identity is what matters.
        let registry = TypeRegistry::new();
        assert_eq!(registry.register(EnumTypeId(1)), Registration::Fresh);
        assert_eq!(registry.register(EnumTypeId(2)), Registration::Fresh);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registration_order_is_first_seen() {
        let registry = TypeRegistry::new();
        registry.register(EnumTypeId(30));
        registry.register(EnumTypeId(10));
        registry.register(EnumTypeId(30));
        registry.register(EnumTypeId(20));

        assert_eq!(
            registry.registration_order(),
            vec![EnumTypeId(30), EnumTypeId(10), EnumTypeId(20)]
        );
    }

    #[test]
    fn test_concurrent_registration_single_winner() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let registry = Arc::new(TypeRegistry::new());
        let fresh = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let fresh = Arc::clone(&fresh);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if registry.register(EnumTypeId(42)) == Registration::Fresh {
                            fresh.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fresh.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.registration_order(), vec![EnumTypeId(42)]);
    }
}
