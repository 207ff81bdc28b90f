use std::rc::Rc;

use obidome::core::config::Settings;
use obidome::core::taskbar::{EmbeddingController, TickOutcome};
use obidome::core::values::{MemorySample, ValueFetcher};
use obidome::core::{Dashboard, WidgetApp};
use obidome::platform::{FakeShell, Rect};
use obidome::ui::html_to_text;

use super::support::{gib, ManualClock, RecordingOverlay, ScriptedProbe};

fn dashboard(probe: &ScriptedProbe, template: &str) -> Dashboard {
    let fetcher = ValueFetcher::new(Box::new(probe.clone()), true)
        .with_clock(Box::new(ManualClock::new()));
    let settings = Settings {
        info_label: template.to_string(),
        container_stylesheet: "font-size: 12px;".to_string(),
        ..Settings::default()
    };
    Dashboard::new(fetcher, &settings)
}

#[test]
fn test_render_wraps_template_in_container() {
    let probe = ScriptedProbe::default();
    probe.state.borrow_mut().cpu = 7.3;
    let mut dashboard = dashboard(&probe, "CPU {cpu_percent:5.1f}%");

    assert_eq!(
        dashboard.render_html(),
        "<div style=\"font-size: 12px;\">CPU   7.3%</div>"
    );
}

#[test]
fn test_each_render_is_a_new_cycle() {
    let probe = ScriptedProbe::default();
    let mut dashboard = dashboard(&probe, "{cpu_percent:.0f}");

    probe.state.borrow_mut().cpu = 10.0;
    assert_eq!(dashboard.render_body(), "10");

    probe.state.borrow_mut().cpu = 20.0;
    assert_eq!(dashboard.render_body(), "20");
}

#[test]
fn test_default_template_flattens_to_two_lines() {
    let probe = ScriptedProbe::default();
    probe.state.borrow_mut().cpu = 5.0;
    probe.state.borrow_mut().memory = MemorySample {
        total_bytes: gib(8),
        used_bytes: gib(2),
        available_bytes: gib(6),
        ..Default::default()
    };
    let fetcher = ValueFetcher::new(Box::new(probe.clone()), true);
    let mut dashboard = Dashboard::new(fetcher, &Settings::default());

    assert_eq!(html_to_text(&dashboard.render_html()), "CPU: 5.0%\nRAM: 25.0%");
}

#[test]
fn test_widget_tick_renders_into_overlay() {
    let probe = ScriptedProbe::default();
    probe.state.borrow_mut().cpu = 33.0;

    let shell = Rc::new(FakeShell::default());
    shell.add_window("Shell_TrayWnd", Rect::new(0, 1040, 1920, 1080));
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let overlay = RecordingOverlay::new(hwnd, 90, 1.0);
    let content = overlay.content.clone();

    let settings = Settings {
        refresh_interval_msec: 500,
        ..Settings::default()
    };
    let controller = EmbeddingController::new(shell.clone(), overlay);
    let mut app = WidgetApp::new(controller, dashboard(&probe, "{cpu_percent:.0f}%"), &settings);

    let delay = app.on_timer();

    assert_eq!(delay.as_millis(), 500);
    assert_eq!(
        content.borrow().last().map(String::as_str),
        Some("<div style=\"font-size: 12px;\">33%</div>")
    );
    assert!(shell.last_placement().is_some());

    let mut render = String::new;
    assert!(matches!(
        app.controller_mut().tick(&mut render),
        TickOutcome::Positioned(_)
    ));
}
