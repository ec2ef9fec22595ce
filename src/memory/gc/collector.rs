/*!
 * Collector
 * Runs the runtime's collection primitive and measures what it freed
 */

use crate::core::{MonitorError, MonitorResult, PassGuard};
use crate::core::serde::{is_zero_u64, is_zero_usize};
use crate::memory::{Capabilities, Capability, HeapRuntime};
use crate::monitoring::Sampler;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Garbage collection statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcStats {
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub freed_bytes: u64,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub bursts: usize,
    #[serde(skip)]
    pub duration: Duration,
}

impl GcStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any memory was freed
    pub fn freed_any(&self) -> bool {
        self.freed_bytes > 0
    }

    /// Bytes freed per burst
    pub fn bytes_per_burst(&self) -> u64 {
        if self.bursts == 0 {
            0
        } else {
            self.freed_bytes / self.bursts as u64
        }
    }

    fn absorb(&mut self, before: u64, after: u64) {
        self.freed_bytes += before.saturating_sub(after);
        self.bursts += 1;
    }
}

/// Collection front-end over the runtime hook
#[derive(Clone)]
pub struct Collector {
    runtime: Arc<dyn HeapRuntime>,
    sampler: Sampler,
}

impl Collector {
    pub fn new(runtime: Arc<dyn HeapRuntime>, sampler: Sampler) -> Self {
        let capabilities = runtime.capabilities();
        info!(
            "Collector initialized: collector={}, heap_introspection={}, observer={}",
            capabilities.collector, capabilities.heap_introspection, capabilities.collection_observer
        );
        Self { runtime, sampler }
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.runtime.capabilities()
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.capabilities().collector
    }

    pub fn runtime(&self) -> &Arc<dyn HeapRuntime> {
        &self.runtime
    }

    fn ensure_available(&self) -> MonitorResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(MonitorError::MissingCapability(Capability::Collector))
        }
    }

    /// One full collection, measured against heap usage before and after
    pub fn collect_full(&self) -> MonitorResult<GcStats> {
        self.ensure_available()?;

        let start = Instant::now();
        let mut stats = GcStats::new();
        let before = self.sampler.heap_used();
        self.runtime.collect()?;
        stats.absorb(before, self.sampler.heap_used());
        stats.duration = start.elapsed();

        debug!(
            "Full collection freed {} bytes in {:?}",
            stats.freed_bytes, stats.duration
        );
        Ok(stats)
    }

    /// Up to `count` short collections, yielding (or sleeping `delay`) between each
    ///
    /// Stops early once `guard` is cancelled.
    pub async fn bursts(
        &self,
        count: usize,
        delay: Option<Duration>,
        guard: &PassGuard,
    ) -> MonitorResult<GcStats> {
        self.ensure_available()?;

        let start = Instant::now();
        let mut stats = GcStats::new();

        for i in 0..count {
            if guard.is_cancelled() {
                debug!("Collection bursts abandoned after {} of {}", i, count);
                break;
            }

            let before = self.sampler.heap_used();
            self.runtime.collect()?;
            stats.absorb(before, self.sampler.heap_used());

            if i + 1 < count {
                match delay {
                    Some(delay) => tokio::time::sleep(delay).await,
                    None => tokio::task::yield_now().await,
                }
            }
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }
}
