/*!
 * System Memory Source
 * Process and host readings via sysinfo, heap figures via the runtime hook
 */

use super::traits::{HeapRuntime, MemorySource};
use super::types::{MemoryReading, ProcessMemory, SystemMemory};
use parking_lot::Mutex;
use std::sync::Arc;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Reads the current process and host memory
///
/// With heap introspection the process heap comes straight from the runtime
/// and everything resident outside it counts as external memory. Without it
/// the heap is approximated by RSS measured against `max_heap_size`.
pub struct SystemMemorySource {
    system: Mutex<System>,
    pid: Option<Pid>,
    runtime: Arc<dyn HeapRuntime>,
    max_heap_size: u64,
}

impl SystemMemorySource {
    pub fn new(runtime: Arc<dyn HeapRuntime>, max_heap_size: u64) -> Self {
        let mut system = System::new();
        system.refresh_memory();

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = %e, "Current PID unavailable, RSS will read as 0");
                None
            }
        };

        Self {
            system: Mutex::new(system),
            pid,
            runtime,
            max_heap_size,
        }
    }

    /// Total physical memory of the host (bytes)
    pub fn total_system_memory() -> u64 {
        let mut system = System::new();
        system.refresh_memory();
        system.total_memory()
    }

    fn read_rss(&self, system: &mut System) -> u64 {
        self.pid
            .and_then(|pid| {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                system.process(pid).map(sysinfo::Process::memory)
            })
            .unwrap_or(0)
    }
}

impl MemorySource for SystemMemorySource {
    fn read(&self) -> MemoryReading {
        let (rss, system_memory) = {
            let mut system = self.system.lock();
            system.refresh_memory();
            let rss = self.read_rss(&mut system);
            let memory = SystemMemory::from_total_free(system.total_memory(), system.free_memory());
            (rss, memory)
        };

        let heap = self.runtime.heap_statistics();
        let process = match heap {
            Some(stats) => ProcessMemory {
                heap_used: stats.used_heap_size,
                heap_total: stats.total_heap_size,
                external: rss.saturating_sub(stats.total_heap_size),
                rss,
            },
            None => ProcessMemory {
                heap_used: rss,
                heap_total: self.max_heap_size,
                external: 0,
                rss,
            },
        };

        MemoryReading {
            process,
            heap,
            system: system_memory,
        }
    }
}
