use std::cell::RefCell;
use std::rc::Rc;

use tempfile::TempDir;

use obidome::core::config::{Settings, SettingsWatcher};
use obidome::core::taskbar::EmbeddingController;
use obidome::core::values::ValueFetcher;
use obidome::core::{Dashboard, MenuAction, MenuCommand, WidgetApp};
use obidome::platform::{FakeShell, Rect};

use super::support::{ManualClock, RecordingOverlay, ScriptedProbe};

type Contents = Rc<RefCell<Vec<String>>>;

fn widget(
    shell: &Rc<FakeShell>,
    probe: &ScriptedProbe,
) -> (WidgetApp<FakeShell, RecordingOverlay>, Contents) {
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let overlay = RecordingOverlay::new(hwnd, 80, 1.0);
    let contents = overlay.content.clone();

    let settings = Settings {
        info_label: "{cpu_percent:.0f}".to_string(),
        container_stylesheet: String::new(),
        ..Settings::default()
    };
    let fetcher = ValueFetcher::new(Box::new(probe.clone()), true)
        .with_clock(Box::new(ManualClock::new()));
    let dashboard = Dashboard::new(fetcher, &settings);
    let controller = EmbeddingController::new(shell.clone(), overlay);

    (WidgetApp::new(controller, dashboard, &settings), contents)
}

#[test]
fn test_open_menu_freezes_position_but_keeps_rendering() {
    let shell = Rc::new(FakeShell::default());
    shell.add_window("Shell_TrayWnd", Rect::new(0, 1040, 1920, 1080));
    let probe = ScriptedProbe::default();
    let (mut app, contents) = widget(&shell, &probe);

    app.on_timer();
    assert_eq!(shell.placements().len(), 1);

    app.menu_opened();
    probe.state.borrow_mut().cpu = 64.0;
    app.on_timer();
    app.on_timer();

    assert_eq!(shell.placements().len(), 1);
    assert_eq!(
        contents.borrow().last().map(String::as_str),
        Some("<div style=\"\">64</div>")
    );

    assert_eq!(app.menu_closed(None), MenuAction::Nothing);
    app.on_timer();
    assert_eq!(shell.placements().len(), 2);
}

#[test]
fn test_quit_from_menu() {
    let shell = Rc::new(FakeShell::default());
    let (mut app, _) = widget(&shell, &ScriptedProbe::default());

    app.menu_opened();
    assert_eq!(app.menu_closed(Some(MenuCommand::Quit)), MenuAction::Quit);
    assert!(!app.controller().is_held());
}

#[test]
fn test_open_settings_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("obidome").join("settings.json");

    let shell = Rc::new(FakeShell::default());
    let (app, _) = widget(&shell, &ScriptedProbe::default());
    let mut app = app.with_watcher(SettingsWatcher::new(path.clone()));

    app.menu_opened();
    let action = app.menu_closed(Some(MenuCommand::OpenSettings));

    assert_eq!(action, MenuAction::OpenFile(path.clone()));
    assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
}

#[test]
fn test_open_settings_without_a_file_does_nothing() {
    let shell = Rc::new(FakeShell::default());
    let (mut app, _) = widget(&shell, &ScriptedProbe::default());

    assert_eq!(
        app.menu_closed(Some(MenuCommand::OpenSettings)),
        MenuAction::Nothing
    );
}
