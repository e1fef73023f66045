//! Host performance counters .

use parking_lot::Mutex;
use sysinfo::System;

/// Snapshot of host CPU/memory, refreshed periodically by the 1 s
/// flush timer rather than on every record (refreshing `sysinfo` per
/// record would itself become a hot-path cost).
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSnapshot {
    pub cpu_usage_percent: f32,
    pub memory_usage_bytes: u64,
}

pub struct HostStats {
    system: Mutex<System>,
    snapshot: Mutex<HostSnapshot>,
}

impl Default for HostStats {
    fn default() -> Self {
        Self::new()
    }
}

impl HostStats {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            snapshot: Mutex::new(HostSnapshot::default()),
        }
    }

    /// Re-reads the host counters. Cheap enough to call once per
    /// flush tick (1 s); never called from the ingest hot path.
    pub fn refresh(&self) {
        let mut system = self.system.lock();
        system.refresh_cpu();
        system.refresh_memory();
        let cpu = system.global_cpu_info().cpu_usage();
        let mem = system.used_memory();
        *self.snapshot.lock() = HostSnapshot {
            cpu_usage_percent: cpu,
            memory_usage_bytes: mem,
        };
    }

    pub fn snapshot(&self) -> HostSnapshot {
        *self.snapshot.lock()
    }

    /// Generational GC counters: always zero on this host .
    pub const fn gc_generations() -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
