/*!
 * jemalloc Runtime
 *
 * Collection primitive: `arena.<MALLCTL_ARENAS_ALL>.purge`, returning dirty
 * pages of every arena to the OS.
 * Heap introspection: `stats.allocated` (used) against `stats.resident`
 * (committed), refreshed by bumping `epoch` before each read.
 *
 * Only meaningful when jemalloc is the global allocator (see `main.rs`).
 */

use crate::core::{MonitorError, MonitorResult};
use crate::memory::traits::HeapRuntime;
use crate::memory::types::{Capabilities, HeapStatistics};
use std::ffi::{c_void, CStr};
use std::ptr;

/// Runtime backed by jemalloc's mallctl interface
#[derive(Debug, Clone, Copy)]
pub struct JemallocRuntime {
    heap_size_limit: u64,
}

impl JemallocRuntime {
    pub fn new(heap_size_limit: u64) -> Self {
        Self { heap_size_limit }
    }

    /// Advance the stats epoch so subsequent reads are fresh
    fn refresh_epoch() -> bool {
        let mut epoch: u64 = 1;
        let mut len = std::mem::size_of::<u64>();
        // SAFETY: "epoch" takes and returns a u64; both buffers are valid for len bytes.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                c"epoch".as_ptr(),
                (&mut epoch as *mut u64).cast::<c_void>(),
                &mut len,
                (&mut epoch as *mut u64).cast::<c_void>(),
                std::mem::size_of::<u64>(),
            )
        };
        rc == 0
    }

    fn read_stat(name: &CStr) -> Option<u64> {
        let mut value: usize = 0;
        let mut len = std::mem::size_of::<usize>();
        // SAFETY: stats.* entries are size_t reads; value is valid for len bytes.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                name.as_ptr(),
                (&mut value as *mut usize).cast::<c_void>(),
                &mut len,
                ptr::null_mut(),
                0,
            )
        };
        (rc == 0).then_some(value as u64)
    }
}

impl HeapRuntime for JemallocRuntime {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            collector: true,
            heap_introspection: true,
            collection_observer: false,
        }
    }

    fn collect(&self) -> MonitorResult<()> {
        // SAFETY: purge takes no input or output; 4096 is MALLCTL_ARENAS_ALL.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                c"arena.4096.purge".as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                0,
            )
        };

        if rc == 0 {
            Ok(())
        } else {
            Err(MonitorError::action_failure(
                "arena_purge",
                format!("mallctl returned {}", rc),
            ))
        }
    }

    fn heap_statistics(&self) -> Option<HeapStatistics> {
        if !Self::refresh_epoch() {
            return None;
        }

        let allocated = Self::read_stat(c"stats.allocated")?;
        let resident = Self::read_stat(c"stats.resident")?;
        let mapped = Self::read_stat(c"stats.mapped").unwrap_or(resident);
        let limit = if self.heap_size_limit > 0 {
            self.heap_size_limit
        } else {
            mapped
        };

        Some(HeapStatistics {
            total_heap_size: resident.max(allocated),
            used_heap_size: allocated,
            heap_size_limit: limit,
            total_available_size: limit.saturating_sub(allocated),
            malloced_memory: mapped,
        })
    }
}
