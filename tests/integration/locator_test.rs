use std::rc::Rc;

use obidome::core::taskbar::{TaskbarLocator, DEFAULT_TRAY_WIDTH, SHELL_WINDOW_CLASSES};
use obidome::platform::{FakeShell, Rect};

#[test]
fn test_missing_taskbar_is_not_an_error() {
    let shell = Rc::new(FakeShell::default());
    let locator = TaskbarLocator::new(shell);
    assert!(locator.find_taskbar().is_none());
}

#[test]
fn test_tray_width_rejects_implausible_values() {
    let shell = Rc::new(FakeShell::default());
    let taskbar = shell.add_window("Shell_TrayWnd", Rect::new(0, 1040, 1920, 1080));
    let tray = shell.add_child(taskbar, "TrayNotifyWnd", Rect::from_size(1800, 1040, 0, 40));
    let locator = TaskbarLocator::new(shell.clone());

    assert_eq!(locator.tray_notify_width(taskbar), DEFAULT_TRAY_WIDTH);

    shell.set_rect(tray, Rect::from_size(0, 1040, 4000, 40));
    assert_eq!(locator.tray_notify_width(taskbar), DEFAULT_TRAY_WIDTH);

    shell.set_rect(tray, Rect::from_size(1760, 1040, 160, 40));
    assert_eq!(locator.tray_notify_width(taskbar), 160);
}

#[test]
fn test_shell_windows_never_count_as_fullscreen() {
    let shell = Rc::new(FakeShell::new(2560, 1440));
    let taskbar = shell.add_window("Shell_TrayWnd", Rect::new(0, 1392, 2560, 1440));
    let locator = TaskbarLocator::new(shell.clone());

    for class in SHELL_WINDOW_CLASSES {
        let window = shell.add_window(class, Rect::new(0, 0, 2560, 1440));
        shell.set_foreground(Some(window));
        assert!(
            !locator.is_fullscreen_active(taskbar),
            "{} should not trigger fullscreen",
            class
        );
    }

    let video = shell.add_window("MediaPlayerClassicW", Rect::new(-8, -8, 2568, 1448));
    shell.set_foreground(Some(video));
    assert!(locator.is_fullscreen_active(taskbar));
}

#[test]
fn test_screen_size_follows_display_changes() {
    let shell = Rc::new(FakeShell::new(1920, 1080));
    let taskbar = shell.add_window("Shell_TrayWnd", Rect::new(0, 1040, 1920, 1080));
    let app = shell.add_window("Chrome_WidgetWin_1", Rect::new(0, 0, 1920, 1080));
    shell.set_foreground(Some(app));
    let locator = TaskbarLocator::new(shell.clone());

    assert!(locator.is_fullscreen_active(taskbar));

    shell.set_screen_size(3840, 2160);
    assert!(!locator.is_fullscreen_active(taskbar));
}
