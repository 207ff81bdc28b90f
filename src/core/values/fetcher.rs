use std::collections::{BTreeMap, HashMap};

use crate::core::config::Settings;
use crate::core::sparkline::{SparklineRenderer, SparklineSettings};

use super::catalog::{builtin_registry, Computation, PLOTS};
use super::custom::{CommandRunner, ShellCommandRunner};
use super::probe::{
    DiskCounters, MemorySample, NetworkCounters, ProcessSample, ProcessTable, SystemProbe,
};
use super::rate::{Clock, RateTracker, SystemClock};
use super::value::MetricValue;

/// Raw probe results memoized for the current refresh cycle
#[derive(Debug, Default)]
struct ProbeSnapshot {
    cpu_percent: Option<f32>,
    memory: Option<MemorySample>,
    network: Option<NetworkCounters>,
    process_table: Option<ProcessTable>,
}

/// Resolves metric names to values, computing each at most once per refresh cycle.
///
/// Call [`ValueFetcher::clear_cache`] once at the start of every cycle. Between
/// two clears every key keeps returning the value it was first computed with,
/// even if the OS readings moved in the meantime, so a rendered frame is a
/// consistent snapshot.
///
/// Lookup order is the built-in registry, then configured custom keys. Anything
/// else yields the `N/A` sentinel and a warning.
pub struct ValueFetcher {
    probe: Box<dyn SystemProbe>,
    clock: Box<dyn Clock>,
    runner: Box<dyn CommandRunner>,
    registry: HashMap<&'static str, Computation>,
    custom_metrics: BTreeMap<String, String>,
    cache: HashMap<String, MetricValue>,
    snapshot: ProbeSnapshot,
    rates: HashMap<&'static str, RateTracker>,
    plots: HashMap<&'static str, SparklineRenderer>,
    is_admin: bool,
}

impl ValueFetcher {
    /// `is_admin` is decided once by the caller at startup
    pub fn new(probe: Box<dyn SystemProbe>, is_admin: bool) -> Self {
        if !is_admin {
            log::info!(
                "Not running as administrator; per-process CPU metrics will report {}",
                super::UNAVAILABLE
            );
        }

        let default_plot = SparklineSettings::default();
        let plots = PLOTS
            .iter()
            .map(|&(plot, _)| (plot, SparklineRenderer::new(&default_plot)))
            .collect();

        Self {
            probe,
            clock: Box::new(SystemClock),
            runner: Box::new(ShellCommandRunner),
            registry: builtin_registry(),
            custom_metrics: BTreeMap::new(),
            cache: HashMap::new(),
            snapshot: ProbeSnapshot::default(),
            rates: HashMap::new(),
            plots,
            is_admin,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_command_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Apply sparkline and custom metric settings.
    ///
    /// Sparkline buffers are recreated, so plot history starts over.
    pub fn load_settings(&mut self, settings: &Settings) {
        for &(plot, _) in PLOTS {
            if let Some(plot_settings) = settings.plot_settings(plot) {
                self.plots.insert(plot, SparklineRenderer::new(plot_settings));
            }
        }

        self.custom_metrics = settings
            .custom_metrics
            .iter()
            .filter(|(key, _)| {
                let shadowed = self.registry.contains_key(key.as_str());
                if shadowed {
                    log::warn!("Custom metric '{}' is shadowed by a built-in metric", key);
                }
                !shadowed
            })
            .map(|(key, command)| (key.clone(), command.clone()))
            .collect();

        self.cache.clear();
    }

    /// Start a new refresh cycle
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.snapshot = ProbeSnapshot::default();
    }

    /// Look up a metric by name. Never fails; see the type docs for the sentinel rules.
    pub fn get(&mut self, key: &str) -> MetricValue {
        if let Some(value) = self.cache.get(key) {
            return value.clone();
        }

        let value = if let Some((&name, &computation)) = self.registry.get_key_value(key) {
            self.compute(name, computation)
        } else if let Some(command) = self.custom_metrics.get(key).cloned() {
            MetricValue::Str(self.runner.run(&command))
        } else {
            log::warn!("Requested unknown system value: {}", key);
            return MetricValue::unavailable();
        };

        self.cache.insert(key.to_string(), value.clone());
        value
    }

    fn compute(&mut self, name: &'static str, computation: Computation) -> MetricValue {
        match computation {
            Computation::Direct(f) => f(self),
            Computation::Scaled { base, divisor } => match self.get(base).as_f64() {
                Some(v) => MetricValue::Float(v / divisor),
                None => MetricValue::unavailable_number(),
            },
            Computation::Rate { counter } => match self.get(counter).as_f64() {
                Some(current) => {
                    let now = self.clock.now();
                    let rate = self.rates.entry(name).or_default().sample(now, current);
                    MetricValue::Float(rate)
                }
                None => MetricValue::unavailable_number(),
            },
            Computation::Plot { base } => {
                let value = self.get(base).as_f64().unwrap_or(f64::NAN);
                match self.plots.get_mut(name) {
                    Some(renderer) => MetricValue::Str(renderer.update_and_encode(value)),
                    None => MetricValue::unavailable(),
                }
            }
        }
    }

    /// Every key that resolves to something other than the unknown-key sentinel
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.registry.keys().map(|k| k.to_string()).collect();
        keys.sort();
        keys.extend(self.custom_metrics.keys().cloned());
        keys
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.registry.contains_key(key) || self.custom_metrics.contains_key(key)
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub(crate) fn cpu_percent(&mut self) -> f32 {
        *self
            .snapshot
            .cpu_percent
            .get_or_insert_with(|| self.probe.cpu_percent())
    }

    pub(crate) fn cpu_core_count(&mut self) -> usize {
        self.probe.cpu_core_count()
    }

    pub(crate) fn memory(&mut self) -> MemorySample {
        *self
            .snapshot
            .memory
            .get_or_insert_with(|| self.probe.memory())
    }

    pub(crate) fn network(&mut self) -> NetworkCounters {
        *self
            .snapshot
            .network
            .get_or_insert_with(|| self.probe.network())
    }

    fn process_table(&mut self) -> &ProcessTable {
        if self.snapshot.process_table.is_none() {
            // Per-process CPU is relative to the global CPU refresh, which must come first
            self.cpu_percent();
        }
        self.snapshot
            .process_table
            .get_or_insert_with(|| self.probe.process_table())
    }

    pub(crate) fn disk_io(&mut self) -> DiskCounters {
        self.process_table().disk
    }

    pub(crate) fn processes(&mut self) -> &[ProcessSample] {
        &self.process_table().processes
    }

    pub(crate) fn top_process_by_cpu(&mut self) -> Option<ProcessSample> {
        self.processes()
            .iter()
            .max_by(|a, b| {
                a.cpu_percent
                    .partial_cmp(&b.cpu_percent)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
    }

    pub(crate) fn top_process_by_memory(&mut self) -> Option<ProcessSample> {
        self.processes()
            .iter()
            .max_by_key(|p| p.memory_bytes)
            .cloned()
    }
}
