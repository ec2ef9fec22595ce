/*!
 * Pool Manager
 * Routes requests to size-class pools and tunes them under load
 */

use super::object::{PoolObject, SizeClass};
use super::size_class::{Pool, PoolAdjustment, PoolStats};
use crate::config::{MonitorConfig, PoolSizes};
use crate::core::limits::{EMERGENCY_POOL_TAIL, POOL_CLEANUP_KEEP_RATIO, POOL_EXPAND_EFFICIENCY};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregated pool statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolManagerStats {
    pub enabled: bool,
    pub pools: Vec<PoolStats>,
    pub oversized_requests: u64,
}

/// Size-class pool manager
///
/// Pools are kept in ascending `object_size` order. Each pool has its own
/// lock; allocation and return never await.
pub struct PoolManager {
    pools: Vec<Mutex<Pool>>,
    /// `object_size` of each pool, same order as `pools`
    class_sizes: Vec<usize>,
    enabled: bool,
    predictive: bool,
    oversized_requests: AtomicU64,
}

impl PoolManager {
    pub fn new(sizes: &PoolSizes, max_pool_size: usize) -> Self {
        let mut classes: Vec<(SizeClass, usize)> = SizeClass::ALL
            .iter()
            .map(|&class| (class, sizes.size_of(class)))
            .collect();
        classes.sort_by_key(|&(class, size)| (size, class));

        Self {
            class_sizes: classes.iter().map(|&(_, size)| size).collect(),
            pools: classes
                .into_iter()
                .map(|(class, size)| Mutex::new(Pool::new(class, size, max_pool_size)))
                .collect(),
            enabled: true,
            predictive: false,
            oversized_requests: AtomicU64::new(0),
        }
    }

    /// Build from monitor configuration, pre-warming each pool
    pub fn from_config(config: &MonitorConfig) -> Self {
        let mut manager = Self::new(&config.pool_sizes, config.max_pool_size);
        manager.enabled = config.enable_memory_pools;
        manager.predictive = config.enable_predictive_allocation;

        if manager.enabled && config.pool_prealloc > 0 {
            for pool in &manager.pools {
                pool.lock().grow(config.pool_prealloc);
            }
            info!(
                "Memory pools initialized: {} classes, {} objects each",
                manager.pools.len(),
                config.pool_prealloc
            );
        }
        manager
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Index of the smallest pool that fits `size`, else the largest pool
    fn resolve(&self, size: usize) -> usize {
        match self.class_sizes.iter().position(|&class_size| class_size >= size) {
            Some(idx) => idx,
            None => {
                self.oversized_requests.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Request of {} bytes exceeds largest size class, serving from it",
                    size
                );
                self.pools.len() - 1
            }
        }
    }

    /// Check out an object able to hold `size` bytes
    ///
    /// `None` when pooling is disabled.
    pub fn allocate(&self, size: usize) -> Option<PoolObject> {
        if !self.enabled {
            return None;
        }
        let idx = self.resolve(size);
        Some(self.pools[idx].lock().take())
    }

    /// Return an object to the pool serving `size`
    ///
    /// On rejection the object comes back in `Err` and no pool state changes.
    pub fn release(&self, obj: PoolObject, size: usize) -> Result<(), PoolObject> {
        if !self.enabled {
            return Err(obj);
        }
        let idx = self.resolve(size);
        self.pools[idx].lock().give_back(obj)
    }

    /// Run one tuning step on every pool
    pub fn self_tune(&self) -> Vec<(SizeClass, PoolAdjustment)> {
        if !self.enabled {
            return Vec::new();
        }

        self.pools
            .iter()
            .map(|pool| {
                let mut pool = pool.lock();
                let adjustment = pool.tune();
                if adjustment != PoolAdjustment::Unchanged {
                    debug!("Pool {} tuned: {:?}", pool.class(), adjustment);
                }
                (pool.class(), adjustment)
            })
            .collect()
    }

    /// Refill drained pools that recycle well, so the next request is a hit
    pub fn predictive_prewarm(&self) -> usize {
        if !self.enabled || !self.predictive {
            return 0;
        }

        let mut added = 0;
        for pool in &self.pools {
            let mut pool = pool.lock();
            if pool.available_len() == 0 && pool.efficiency() > POOL_EXPAND_EFFICIENCY {
                added += match pool.prewarm_for_peak() {
                    0 => pool.grow(1),
                    n => n,
                };
            }
        }

        if added > 0 {
            debug!("Predictive prewarm added {} pooled objects", added);
        }
        added
    }

    /// Trim every pool to about a tenth of its idle objects
    pub fn cleanup(&self) -> usize {
        self.pools
            .iter()
            .map(|pool| pool.lock().trim_to_ratio(POOL_CLEANUP_KEEP_RATIO))
            .sum()
    }

    /// Keep only the newest few idle objects in every pool
    pub fn emergency_trim(&self) -> usize {
        self.pools
            .iter()
            .map(|pool| pool.lock().keep_last(EMERGENCY_POOL_TAIL))
            .sum()
    }

    /// Mean efficiency across pools, `None` when pooling is disabled
    pub fn mean_efficiency(&self) -> Option<f64> {
        if !self.enabled || self.pools.is_empty() {
            return None;
        }
        let total: f64 = self.pools.iter().map(|pool| pool.lock().efficiency()).sum();
        Some(total / self.pools.len() as f64)
    }

    #[inline]
    pub fn oversized_requests(&self) -> u64 {
        self.oversized_requests.load(Ordering::Relaxed)
    }

    /// Whether any pool other than `class` holds `id` as idle
    pub fn idle_elsewhere(&self, class: SizeClass, id: u64) -> bool {
        self.pools.iter().any(|pool| {
            let pool = pool.lock();
            pool.class() != class && pool.holds_available(id)
        })
    }

    pub fn pool_stats(&self, class: SizeClass) -> Option<PoolStats> {
        self.pools
            .iter()
            .map(|pool| pool.lock())
            .find(|pool| pool.class() == class)
            .map(|pool| pool.stats())
    }

    pub fn stats(&self) -> PoolManagerStats {
        PoolManagerStats {
            enabled: self.enabled,
            pools: self.pools.iter().map(|pool| pool.lock().stats()).collect(),
            oversized_requests: self.oversized_requests(),
        }
    }
}
