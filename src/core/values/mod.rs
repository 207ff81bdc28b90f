//! Per-refresh-cycle metric cache.
//!
//! A handful of OS queries (CPU, memory, network, disk I/O, process list) feed
//! dozens of named metrics. Values are computed lazily on first read and stay
//! fixed until the next [`ValueFetcher::clear_cache`].

mod catalog;
mod custom;
mod fetcher;
mod probe;
mod rate;
pub mod template;
mod value;

pub use custom::{CommandRunner, ShellCommandRunner};
pub use fetcher::ValueFetcher;
pub use probe::{
    DiskCounters, MemorySample, NetworkCounters, ProcessSample, ProcessTable, SysinfoProbe,
    SystemProbe,
};
pub use rate::{Clock, RateTracker, SystemClock};
pub use template::format_template;
pub use value::{MetricValue, UNAVAILABLE};
