//! OS queries behind the metric cache.
//!
//! Every method here is comparatively expensive (it refreshes sysinfo state),
//! which is why the fetcher calls each at most once per refresh cycle.
//! Disk counters and the process list come from the same process refresh:
//! per-process CPU usage is measured over the time since the previous refresh,
//! so a second refresh within one cycle would reset it to almost nothing.

use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, Networks, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemorySample {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

impl MemorySample {
    pub fn usage_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }

    pub fn swap_percent(&self) -> f64 {
        percent(self.swap_used_bytes, self.swap_total_bytes)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

/// Cumulative network counters summed over all interfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Cumulative disk I/O counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCounters {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Everything one process refresh yields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTable {
    pub disk: DiskCounters,
    pub processes: Vec<ProcessSample>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

/// Source of raw system readings.
///
/// The real implementation is [`SysinfoProbe`]; tests substitute scripted probes.
pub trait SystemProbe {
    /// Global CPU usage since the previous call, in percent
    fn cpu_percent(&mut self) -> f32;
    fn cpu_core_count(&mut self) -> usize;
    fn memory(&mut self) -> MemorySample;
    fn network(&mut self) -> NetworkCounters;
    /// Refresh the process list once. Call [`cpu_percent`](Self::cpu_percent)
    /// first in the same cycle, per-process CPU is relative to it.
    fn process_table(&mut self) -> ProcessTable;
}

/// Probe backed by `sysinfo`
pub struct SysinfoProbe {
    system: System,
    networks: Networks,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for SysinfoProbe {
    fn cpu_percent(&mut self) -> f32 {
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage()
    }

    fn cpu_core_count(&mut self) -> usize {
        self.system.cpus().len()
    }

    fn memory(&mut self) -> MemorySample {
        self.system.refresh_memory();

        MemorySample {
            total_bytes: self.system.total_memory(),
            used_bytes: self.system.used_memory(),
            available_bytes: self.system.available_memory(),
            swap_total_bytes: self.system.total_swap(),
            swap_used_bytes: self.system.used_swap(),
        }
    }

    fn network(&mut self) -> NetworkCounters {
        self.networks.refresh(true);

        self.networks
            .values()
            .fold(NetworkCounters::default(), |acc, data| NetworkCounters {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
            })
    }

    // sysinfo has no system-wide I/O counter, so disk totals sum the per-process
    // ones. Exited processes drop out of the sum, which can make it step back.
    fn process_table(&mut self) -> ProcessTable {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_disk_usage(),
        );

        let mut table = ProcessTable::default();
        for proc in self.system.processes().values() {
            let usage = proc.disk_usage();
            table.disk.bytes_read = table.disk.bytes_read.saturating_add(usage.total_read_bytes);
            table.disk.bytes_written = table
                .disk
                .bytes_written
                .saturating_add(usage.total_written_bytes);

            table.processes.push(ProcessSample {
                pid: proc.pid().as_u32(),
                name: proc.name().to_string_lossy().to_string(),
                cpu_percent: proc.cpu_usage(),
                memory_bytes: proc.memory(),
            });
        }
        table
    }
}
