use std::collections::BTreeMap;
use std::time::Duration;

use obidome::core::config::Settings;
use obidome::core::values::{
    MemorySample, MetricValue, NetworkCounters, ProcessSample, ValueFetcher, UNAVAILABLE,
};

use super::support::{gib, ManualClock, RecordingRunner, ScriptedProbe};

fn fetcher(probe: &ScriptedProbe, clock: &ManualClock, is_admin: bool) -> ValueFetcher {
    ValueFetcher::new(Box::new(probe.clone()), is_admin).with_clock(Box::new(clock.clone()))
}

fn float(value: MetricValue) -> f64 {
    value.as_f64().expect("numeric metric")
}

#[test]
fn test_unit_conversions_agree_with_base() {
    let probe = ScriptedProbe::default();
    probe.state.borrow_mut().memory = MemorySample {
        total_bytes: gib(16),
        used_bytes: gib(6) + 512,
        available_bytes: gib(10) - 512,
        ..Default::default()
    };
    probe.state.borrow_mut().network = NetworkCounters {
        bytes_sent: 123_456_789,
        bytes_recv: 987_654_321,
    };
    let clock = ManualClock::new();
    let mut values = fetcher(&probe, &clock, true);

    for (base, kb, mb, gb) in [
        ("ram_used", "ram_used_kb", "ram_used_mb", "ram_used_gb"),
        ("network_bytes_sent", "network_kb_sent", "network_mb_sent", "network_gb_sent"),
        ("network_bytes_recv", "network_kb_recv", "network_mb_recv", "network_gb_recv"),
    ] {
        let bytes = float(values.get(base));
        assert!((float(values.get(kb)) - bytes / 1024.0).abs() < 1e-9);
        assert!((float(values.get(mb)) - bytes / 1024.0 / 1024.0).abs() < 1e-9);
        assert!((float(values.get(gb)) - bytes / 1024.0 / 1024.0 / 1024.0).abs() < 1e-12);
    }

    assert!((float(values.get("ram_total_gb")) - 16.0).abs() < 1e-12);
}

#[test]
fn test_rates_follow_counter_deltas() {
    let probe = ScriptedProbe::default();
    let clock = ManualClock::new();
    let mut values = fetcher(&probe, &clock, true);

    probe.state.borrow_mut().network.bytes_recv = 10_000;
    assert_eq!(values.get("network_bytes_recv_per_sec"), MetricValue::Float(0.0));

    values.clear_cache();
    clock.advance(Duration::from_millis(500));
    probe.state.borrow_mut().network.bytes_recv = 10_000 + 512 * 1024;

    let rate = float(values.get("network_bytes_recv_per_sec"));
    assert!((rate - 1024.0 * 1024.0).abs() < 1e-6);
    assert!((float(values.get("network_mb_recv_per_sec")) - 1.0).abs() < 1e-9);
}

#[test]
fn test_disk_rates_are_independent() {
    let probe = ScriptedProbe::default();
    let clock = ManualClock::new();
    let mut values = fetcher(&probe, &clock, true);

    values.get("disk_bytes_read_per_sec");

    values.clear_cache();
    clock.advance(Duration::from_secs(2));
    probe.state.borrow_mut().disk.bytes_read = 4096;
    probe.state.borrow_mut().disk.bytes_written = 8192;

    assert_eq!(values.get("disk_bytes_read_per_sec"), MetricValue::Float(2048.0));
    // first read of this rate: no baseline yet
    assert_eq!(values.get("disk_bytes_written_per_sec"), MetricValue::Float(0.0));
}

#[test]
fn test_snapshot_is_stable_within_a_cycle() {
    let probe = ScriptedProbe::default();
    let clock = ManualClock::new();
    let mut values = fetcher(&probe, &clock, true);

    probe.state.borrow_mut().cpu = 12.5;
    let first = values.get("cpu_percent");

    probe.state.borrow_mut().cpu = 99.0;
    assert_eq!(values.get("cpu_percent"), first);

    values.clear_cache();
    assert_eq!(values.get("cpu_percent"), MetricValue::Float(99.0));
}

#[test]
fn test_unknown_key_is_not_an_error() {
    let probe = ScriptedProbe::default();
    let clock = ManualClock::new();
    let mut values = fetcher(&probe, &clock, true);

    assert_eq!(values.get("does_not_exist"), MetricValue::Str(UNAVAILABLE.to_string()));
    assert!(!values.is_known("does_not_exist"));
}

#[test]
fn test_admin_gated_process_metrics() {
    let probe = ScriptedProbe::default();
    probe.state.borrow_mut().processes = vec![
        ProcessSample {
            pid: 1,
            name: "idle.exe".into(),
            cpu_percent: 0.5,
            memory_bytes: 1024,
        },
        ProcessSample {
            pid: 2,
            name: "build.exe".into(),
            cpu_percent: 80.0,
            memory_bytes: 50 * 1024 * 1024,
        },
    ];
    let clock = ManualClock::new();

    let mut limited = fetcher(&probe, &clock, false);
    assert!(limited.get("top_cpu_process_name").is_unavailable());
    assert!(limited.get("top_cpu_process_percent").as_f64().unwrap().is_nan());
    // memory ranking does not need elevation
    assert_eq!(limited.get("top_ram_process_name"), MetricValue::Str("build.exe".into()));
    assert_eq!(limited.get("process_count"), MetricValue::Int(2));

    let mut admin = fetcher(&probe, &clock, true);
    assert_eq!(admin.get("top_cpu_process_name"), MetricValue::Str("build.exe".into()));
    assert_eq!(float(admin.get("top_ram_process_mb")), 50.0);
}

#[test]
fn test_custom_metrics_run_once_per_cycle() {
    let probe = ScriptedProbe::default();
    let runner = RecordingRunner::default();
    let calls = runner.calls.clone();
    let mut values =
        ValueFetcher::new(Box::new(probe), true).with_command_runner(Box::new(runner));

    let mut custom = BTreeMap::new();
    custom.insert("gpu_temp".to_string(), "  61  ".to_string());
    custom.insert("cpu_percent".to_string(), "echo shadowed".to_string());
    values.load_settings(&Settings {
        custom_metrics: custom,
        ..Settings::default()
    });

    assert_eq!(values.get("gpu_temp"), MetricValue::Str("61".into()));
    assert_eq!(values.get("gpu_temp"), MetricValue::Str("61".into()));
    assert_eq!(calls.get(), 1);

    values.clear_cache();
    values.get("gpu_temp");
    assert_eq!(calls.get(), 2);

    // built-ins win over custom keys with the same name
    assert!(matches!(values.get("cpu_percent"), MetricValue::Float(_)));
    assert_eq!(calls.get(), 2);
    assert!(values.keys().contains(&"gpu_temp".to_string()));
}

#[test]
fn test_every_listed_key_resolves() {
    let probe = ScriptedProbe::default();
    let clock = ManualClock::new();
    let mut values = fetcher(&probe, &clock, true);

    for key in values.keys() {
        assert!(values.is_known(&key), "{} should be known", key);
        let _ = values.get(&key);
    }
    assert!(values.keys().len() > 40);
}
