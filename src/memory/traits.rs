/*!
 * Memory Traits
 * Seams to the hosting runtime and to the memory reading source
 */

use super::types::*;
use crate::core::{MonitorError, MonitorResult};
use std::sync::Arc;

/// Callback invoked by a runtime for every collection it performs on its own
pub type CollectionCallback = Arc<dyn Fn(ObservedCollection) + Send + Sync>;

/// Collection and heap-introspection hooks of the hosting runtime
///
/// Every hook is optional. `capabilities()` states which ones exist; the
/// default method bodies report the hook as missing so an implementation
/// only overrides what it actually supports.
pub trait HeapRuntime: Send + Sync {
    /// Which hooks this runtime provides
    fn capabilities(&self) -> Capabilities;

    /// Run one collection / reclamation burst
    fn collect(&self) -> MonitorResult<()> {
        Err(MonitorError::MissingCapability(Capability::Collector))
    }

    /// Current heap statistics, if the runtime can introspect its heap
    fn heap_statistics(&self) -> Option<HeapStatistics> {
        None
    }

    /// Install a callback for collections the runtime performs itself
    fn observe_collections(&self, _callback: CollectionCallback) -> MonitorResult<()> {
        Err(MonitorError::ObserverUnavailable(
            "runtime does not report collections".to_string(),
        ))
    }
}

/// Source of raw memory readings
pub trait MemorySource: Send + Sync {
    /// Take one reading. Must not fail; unreadable figures are reported as 0.
    fn read(&self) -> MemoryReading;
}

impl<T: HeapRuntime + ?Sized> HeapRuntime for Arc<T> {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn collect(&self) -> MonitorResult<()> {
        (**self).collect()
    }

    fn heap_statistics(&self) -> Option<HeapStatistics> {
        (**self).heap_statistics()
    }

    fn observe_collections(&self, callback: CollectionCallback) -> MonitorResult<()> {
        (**self).observe_collections(callback)
    }
}

impl<T: MemorySource + ?Sized> MemorySource for Arc<T> {
    fn read(&self) -> MemoryReading {
        (**self).read()
    }
}
