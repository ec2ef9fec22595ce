/*!
 * Runtime Hooks
 * Concrete `HeapRuntime` implementations
 *
 * - `NoRuntime`: plain process, nothing to call into
 * - `JemallocRuntime` (feature `jemalloc`): arena purge as the collection
 *   primitive, allocator stats as heap introspection
 */

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
mod jemalloc;

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
pub use jemalloc::JemallocRuntime;

use super::traits::HeapRuntime;
use super::types::Capabilities;
use std::sync::Arc;

/// Runtime without collection or introspection hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRuntime;

impl HeapRuntime for NoRuntime {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }
}

/// Best runtime available for this build
pub fn default_runtime(heap_size_limit: u64) -> Arc<dyn HeapRuntime> {
    #[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
    let runtime: Arc<dyn HeapRuntime> = Arc::new(JemallocRuntime::new(heap_size_limit));

    #[cfg(not(all(feature = "jemalloc", not(target_env = "msvc"))))]
    let runtime: Arc<dyn HeapRuntime> = {
        let _ = heap_size_limit;
        Arc::new(NoRuntime)
    };

    runtime
}
