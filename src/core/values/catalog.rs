//! Built-in metric registry.
//!
//! Maps each metric name to how it is computed. Unit variants and rates are
//! described declaratively and resolved through the fetcher cache, so each
//! derived key always agrees with its base key within a refresh cycle.

use std::collections::HashMap;

use super::fetcher::ValueFetcher;
use super::value::MetricValue;

pub(crate) type MetricFn = fn(&mut ValueFetcher) -> MetricValue;

pub(crate) const KB: f64 = 1024.0;
pub(crate) const MB: f64 = 1024.0 * 1024.0;
pub(crate) const GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Clone, Copy)]
pub(crate) enum Computation {
    /// Read straight from the per-cycle probe snapshot
    Direct(MetricFn),
    /// `base / divisor`, where `base` is another registry key
    Scaled { base: &'static str, divisor: f64 },
    /// Per-second rate of the counter stored under another key
    Rate { counter: &'static str },
    /// Sparkline of another key, appended once per cycle
    Plot { base: &'static str },
}

/// (bytes key, KB key, MB key, GB key)
const BYTE_FAMILIES: &[(&str, &str, &str, &str)] = &[
    ("ram_total", "ram_total_kb", "ram_total_mb", "ram_total_gb"),
    ("ram_used", "ram_used_kb", "ram_used_mb", "ram_used_gb"),
    ("ram_available", "ram_available_kb", "ram_available_mb", "ram_available_gb"),
    ("network_bytes_sent", "network_kb_sent", "network_mb_sent", "network_gb_sent"),
    ("network_bytes_recv", "network_kb_recv", "network_mb_recv", "network_gb_recv"),
    ("disk_bytes_read", "disk_kb_read", "disk_mb_read", "disk_gb_read"),
    ("disk_bytes_written", "disk_kb_written", "disk_mb_written", "disk_gb_written"),
];

/// (counter key, bytes/s key, KB/s key, MB/s key)
const RATE_FAMILIES: &[(&str, &str, &str, &str)] = &[
    (
        "network_bytes_sent",
        "network_bytes_sent_per_sec",
        "network_kb_sent_per_sec",
        "network_mb_sent_per_sec",
    ),
    (
        "network_bytes_recv",
        "network_bytes_recv_per_sec",
        "network_kb_recv_per_sec",
        "network_mb_recv_per_sec",
    ),
    (
        "disk_bytes_read",
        "disk_bytes_read_per_sec",
        "disk_kb_read_per_sec",
        "disk_mb_read_per_sec",
    ),
    (
        "disk_bytes_written",
        "disk_bytes_written_per_sec",
        "disk_kb_written_per_sec",
        "disk_mb_written_per_sec",
    ),
];

/// (plot key, plotted key)
pub(crate) const PLOTS: &[(&str, &str)] = &[
    ("cpu_percent_plot", "cpu_percent"),
    ("ram_percent_plot", "ram_percent"),
];

pub(crate) fn builtin_registry() -> HashMap<&'static str, Computation> {
    let direct: [(&'static str, MetricFn); 16] = [
        ("cpu_percent", cpu_percent),
        ("cpu_core_count", cpu_core_count),
        ("ram_percent", ram_percent),
        ("ram_total", ram_total),
        ("ram_used", ram_used),
        ("ram_available", ram_available),
        ("swap_percent", swap_percent),
        ("network_bytes_sent", network_bytes_sent),
        ("network_bytes_recv", network_bytes_recv),
        ("disk_bytes_read", disk_bytes_read),
        ("disk_bytes_written", disk_bytes_written),
        ("process_count", process_count),
        ("top_cpu_process_name", top_cpu_process_name),
        ("top_cpu_process_percent", top_cpu_process_percent),
        ("top_ram_process_name", top_ram_process_name),
        ("top_ram_process_mb", top_ram_process_mb),
    ];

    let mut registry: HashMap<&'static str, Computation> = direct
        .into_iter()
        .map(|(key, f)| (key, Computation::Direct(f)))
        .collect();

    for &(base, kb, mb, gb) in BYTE_FAMILIES {
        registry.insert(kb, Computation::Scaled { base, divisor: KB });
        registry.insert(mb, Computation::Scaled { base, divisor: MB });
        registry.insert(gb, Computation::Scaled { base, divisor: GB });
    }

    for &(counter, per_sec, kb_per_sec, mb_per_sec) in RATE_FAMILIES {
        registry.insert(per_sec, Computation::Rate { counter });
        registry.insert(kb_per_sec, Computation::Scaled { base: per_sec, divisor: KB });
        registry.insert(mb_per_sec, Computation::Scaled { base: per_sec, divisor: MB });
    }

    for &(plot, base) in PLOTS {
        registry.insert(plot, Computation::Plot { base });
    }

    registry
}

fn cpu_percent(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::Float(f.cpu_percent() as f64)
}

fn cpu_core_count(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.cpu_core_count() as u64)
}

fn ram_percent(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::Float(f.memory().usage_percent())
}

fn ram_total(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.memory().total_bytes)
}

fn ram_used(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.memory().used_bytes)
}

fn ram_available(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.memory().available_bytes)
}

fn swap_percent(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::Float(f.memory().swap_percent())
}

fn network_bytes_sent(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.network().bytes_sent)
}

fn network_bytes_recv(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.network().bytes_recv)
}

fn disk_bytes_read(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.disk_io().bytes_read)
}

fn disk_bytes_written(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.disk_io().bytes_written)
}

fn process_count(f: &mut ValueFetcher) -> MetricValue {
    MetricValue::from(f.processes().len() as u64)
}

// Ranking other users' processes by CPU needs administrator rights.
fn top_cpu_process_name(f: &mut ValueFetcher) -> MetricValue {
    if !f.is_admin() {
        return MetricValue::unavailable();
    }
    f.top_process_by_cpu()
        .map(|p| MetricValue::Str(p.name))
        .unwrap_or_else(MetricValue::unavailable)
}

fn top_cpu_process_percent(f: &mut ValueFetcher) -> MetricValue {
    if !f.is_admin() {
        return MetricValue::unavailable_number();
    }
    f.top_process_by_cpu()
        .map(|p| MetricValue::Float(p.cpu_percent as f64))
        .unwrap_or_else(MetricValue::unavailable_number)
}

fn top_ram_process_name(f: &mut ValueFetcher) -> MetricValue {
    f.top_process_by_memory()
        .map(|p| MetricValue::Str(p.name))
        .unwrap_or_else(MetricValue::unavailable)
}

fn top_ram_process_mb(f: &mut ValueFetcher) -> MetricValue {
    f.top_process_by_memory()
        .map(|p| MetricValue::Float(p.memory_bytes as f64 / MB))
        .unwrap_or_else(MetricValue::unavailable_number)
}
