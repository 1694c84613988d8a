//! Registry of live synonym filter instances.
//!
//! The registry only holds [`Weak`] references to the filters' map cells, so
//! it never keeps a finished token stream alive. Dead references are dropped
//! whenever the registry is swept, and every [`PRUNE_THRESHOLD`] insertions.

use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use log::debug;
use parking_lot::Mutex;

use crate::synonym::map::SynonymMap;

/// Number of registrations between opportunistic prunes.
const PRUNE_THRESHOLD: usize = 64;

/// Weak observer list of filter instances created by one factory.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    cells: Vec<Weak<ArcSwap<SynonymMap>>>,
    since_prune: usize,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter's map cell.
    pub fn register(&self, cell: &Arc<ArcSwap<SynonymMap>>) {
        let mut inner = self.inner.lock();
        inner.cells.push(Arc::downgrade(cell));
        inner.since_prune += 1;
        if inner.since_prune >= PRUNE_THRESHOLD {
            inner.cells.retain(|weak| weak.strong_count() > 0);
            inner.since_prune = 0;
        }
    }

    /// Push `map` to every live filter and drop dead entries.
    ///
    /// Returns the number of filters updated. The lock is released before any
    /// filter is touched.
    pub fn sweep(&self, map: &Arc<SynonymMap>) -> usize {
        let live: Vec<Arc<ArcSwap<SynonymMap>>> = {
            let mut inner = self.inner.lock();
            inner.cells.retain(|weak| weak.strong_count() > 0);
            inner.since_prune = 0;
            inner.cells.iter().filter_map(Weak::upgrade).collect()
        };

        for cell in &live {
            cell.store(Arc::clone(map));
        }
        debug!("pushed synonym map to {} live filters", live.len());
        live.len()
    }

    /// Number of registered filters that are still alive.
    pub fn live_count(&self) -> usize {
        self.inner
            .lock()
            .cells
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> Arc<ArcSwap<SynonymMap>> {
        Arc::new(ArcSwap::from_pointee(SynonymMap::empty()))
    }

    #[test]
    fn test_sweep_updates_live_cells() {
        let registry = FilterRegistry::new();
        let first = cell();
        let second = cell();
        registry.register(&first);
        registry.register(&second);

        let map = Arc::new(SynonymMap::empty());
        assert_eq!(registry.sweep(&map), 2);
        assert!(Arc::ptr_eq(&first.load_full(), &map));
        assert!(Arc::ptr_eq(&second.load_full(), &map));
    }

    #[test]
    fn test_dropped_cells_fall_out() {
        let registry = FilterRegistry::new();
        let kept = cell();
        registry.register(&kept);
        {
            let dropped = cell();
            registry.register(&dropped);
            assert_eq!(registry.live_count(), 2);
        }

        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.sweep(&Arc::new(SynonymMap::empty())), 1);
    }

    #[test]
    fn test_register_prunes_dead_entries() {
        let registry = FilterRegistry::new();
        for _ in 0..PRUNE_THRESHOLD {
            registry.register(&cell());
        }

        assert!(registry.inner.lock().cells.is_empty());
    }
}
