/*!
 * Size-Class Pool
 * One fixed-size object cache, analogous to a slab allocator bucket
 */

use super::object::{PoolObject, SizeClass};
use crate::core::limits::{
    POOL_EXPAND_AVAILABLE_BELOW, POOL_EXPAND_EFFICIENCY, POOL_EXPAND_RATIO,
    POOL_SHRINK_AVAILABLE_ABOVE, POOL_SHRINK_EFFICIENCY, POOL_SHRINK_RATIO,
};
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of one self-tuning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "objects", rename_all = "snake_case")]
pub enum PoolAdjustment {
    Expanded(usize),
    Shrunk(usize),
    Unchanged,
}

/// Per-pool statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub class: SizeClass,
    pub object_size: usize,
    pub available: usize,
    pub allocated: usize,
    pub total_allocations: u64,
    pub total_deallocations: u64,
    /// Allocations served from `available`
    pub reuses: u64,
    pub efficiency: f64,
    pub max_pool_size: usize,
}

impl PoolStats {
    /// Fraction of allocations that were pool hits
    pub fn hit_rate(&self) -> f64 {
        if self.total_allocations == 0 {
            0.0
        } else {
            self.reuses as f64 / self.total_allocations as f64
        }
    }
}

/// A pool of same-sized objects
///
/// Invariant: an object id the pool knows about is either in `available`
/// (owned here) or in `allocated` (owned by a caller), never both.
#[derive(Debug)]
pub struct Pool {
    class: SizeClass,
    object_size: usize,
    available: Vec<PoolObject>,
    allocated: HashSet<u64, RandomState>,
    total_allocations: u64,
    total_deallocations: u64,
    reuses: u64,
    max_pool_size: usize,
    /// Highest number of objects checked out at once since the last reset
    peak_outstanding: usize,
}

impl Pool {
    pub fn new(class: SizeClass, object_size: usize, max_pool_size: usize) -> Self {
        Self {
            class,
            object_size,
            available: Vec::new(),
            allocated: HashSet::with_hasher(RandomState::new()),
            total_allocations: 0,
            total_deallocations: 0,
            reuses: 0,
            max_pool_size,
            peak_outstanding: 0,
        }
    }

    #[inline]
    pub fn class(&self) -> SizeClass {
        self.class
    }

    #[inline]
    pub fn object_size(&self) -> usize {
        self.object_size
    }

    #[inline]
    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    #[inline]
    pub fn allocated_len(&self) -> usize {
        self.allocated.len()
    }

    /// Whether an object with this id is currently idle in the pool
    pub fn holds_available(&self, id: u64) -> bool {
        self.available.iter().any(|obj| obj.id() == id)
    }

    /// Check an object out, reusing an idle one when possible
    pub fn take(&mut self) -> PoolObject {
        let obj = match self.available.pop() {
            Some(obj) => {
                self.reuses += 1;
                obj
            }
            None => PoolObject::fresh(self.class, self.object_size),
        };

        self.allocated.insert(obj.id());
        self.total_allocations += 1;
        self.peak_outstanding = self.peak_outstanding.max(self.allocated.len());
        obj
    }

    /// Check an object back in
    ///
    /// Rejected (and handed back) unless the object is checked out from this
    /// pool and there is room for it.
    pub fn give_back(&mut self, mut obj: PoolObject) -> Result<(), PoolObject> {
        if !self.allocated.contains(&obj.id()) || self.available.len() >= self.max_pool_size {
            return Err(obj);
        }

        self.allocated.remove(&obj.id());
        obj.scrub();
        self.available.push(obj);
        self.total_deallocations += 1;
        Ok(())
    }

    /// deallocations / allocations, in [0, 1]
    pub fn efficiency(&self) -> f64 {
        (self.total_deallocations as f64 / self.total_allocations.max(1) as f64).min(1.0)
    }

    /// Keep only the newest `keep` idle objects; returns how many were released
    pub fn keep_last(&mut self, keep: usize) -> usize {
        let len = self.available.len();
        if len <= keep {
            return 0;
        }
        let release = len - keep;
        self.available.drain(..release);
        release
    }

    /// Keep roughly `ratio` of the idle objects; returns how many were released
    pub fn trim_to_ratio(&mut self, ratio: f64) -> usize {
        let len = self.available.len();
        let release = (len as f64 * (1.0 - ratio.clamp(0.0, 1.0))).floor() as usize;
        self.available.drain(..release);
        release
    }

    /// Add up to `count` fresh idle objects, bounded by capacity
    pub fn grow(&mut self, count: usize) -> usize {
        let room = self.max_pool_size.saturating_sub(self.available.len());
        let added = count.min(room);
        for _ in 0..added {
            self.available
                .push(PoolObject::fresh(self.class, self.object_size));
        }
        added
    }

    /// Drop up to `count` idle objects
    pub fn shrink(&mut self, count: usize) -> usize {
        let removed = count.min(self.available.len());
        self.available.truncate(self.available.len() - removed);
        removed
    }

    /// Grow a busy, well-recycled pool; shrink an idle, leaky one
    pub fn tune(&mut self) -> PoolAdjustment {
        let efficiency = self.efficiency();
        let available = self.available.len();

        if efficiency > POOL_EXPAND_EFFICIENCY && available < POOL_EXPAND_AVAILABLE_BELOW {
            let step = (self.max_pool_size as f64 * POOL_EXPAND_RATIO).ceil() as usize;
            match self.grow(step) {
                0 => PoolAdjustment::Unchanged,
                added => PoolAdjustment::Expanded(added),
            }
        } else if efficiency < POOL_SHRINK_EFFICIENCY
            && available as f64 > self.max_pool_size as f64 * POOL_SHRINK_AVAILABLE_ABOVE
        {
            let step = (self.max_pool_size as f64 * POOL_SHRINK_RATIO).ceil() as usize;
            match self.shrink(step) {
                0 => PoolAdjustment::Unchanged,
                removed => PoolAdjustment::Shrunk(removed),
            }
        } else {
            PoolAdjustment::Unchanged
        }
    }

    /// Top idle objects up to the demand seen at the last peak
    pub fn prewarm_for_peak(&mut self) -> usize {
        let expected = self.peak_outstanding.saturating_sub(self.allocated.len());
        let missing = expected.saturating_sub(self.available.len());
        let added = self.grow(missing);
        self.peak_outstanding = self.allocated.len();
        added
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            class: self.class,
            object_size: self.object_size,
            available: self.available.len(),
            allocated: self.allocated.len(),
            total_allocations: self.total_allocations,
            total_deallocations: self.total_deallocations,
            reuses: self.reuses,
            efficiency: self.efficiency(),
            max_pool_size: self.max_pool_size,
        }
    }
}
