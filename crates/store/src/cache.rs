//! Cache-invalidation hook fired after visibility changes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Signals that course structure changed and derived caches are stale.
///
/// Implementations are best-effort and must not fail or panic.
pub trait CacheInvalidator: Send + Sync {
    fn structure_changed(&self);
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl CacheInvalidator for NoopCache {
    fn structure_changed(&self) {}
}

/// Emits a debug event per signal; used by the binaries, which own no cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCache;

impl CacheInvalidator for TracingCache {
    fn structure_changed(&self) {
        debug!("course structure changed, caches purged");
    }
}

/// Counts signals. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct CountingCache {
    count: Arc<AtomicUsize>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl CacheInvalidator for CountingCache {
    fn structure_changed(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_cache_clones_share_count() {
        let cache = CountingCache::new();
        let shared = cache.clone();
        shared.structure_changed();
        cache.structure_changed();
        assert_eq!(cache.count(), 2);
    }
}
