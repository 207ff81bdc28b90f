use std::rc::Rc;

use obidome::core::config::Settings;
use obidome::core::taskbar::{EmbeddingController, EmbeddingState, TickOutcome};
use obidome::platform::{FakeShell, Rect, ShellApi, OVERLAY_EX_STYLE};

use super::support::RecordingOverlay;

fn desktop(taskbar_rect: Rect, tray_width: i32) -> Rc<FakeShell> {
    let shell = Rc::new(FakeShell::new(1920, 1080));
    let taskbar = shell.add_window("Shell_TrayWnd", taskbar_rect);
    shell.add_child(
        taskbar,
        "TrayNotifyWnd",
        Rect::new(
            taskbar_rect.right - tray_width,
            taskbar_rect.top,
            taskbar_rect.right,
            taskbar_rect.bottom,
        ),
    );
    shell
}

#[test]
fn test_end_to_end_placement() {
    let shell = desktop(Rect::new(0, 0, 1920, 40), 160);
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let mut controller = EmbeddingController::new(shell.clone(), RecordingOverlay::new(hwnd, 100, 1.0));
    controller.load_settings(&Settings {
        margin_right: 10,
        ..Settings::default()
    });

    let mut render = || "<div>CPU</div>".to_string();
    let TickOutcome::Positioned(placement) = controller.tick(&mut render) else {
        panic!("overlay should have been positioned");
    };

    assert_eq!((placement.x, placement.y), (1650, 2));
    assert_eq!(placement.height, 36);
    assert_eq!(shell.last_placement(), Some((hwnd, Rect::new(1650, 2, 1750, 38))));
}

#[test]
fn test_attach_makes_taskbar_the_owner() {
    let shell = desktop(Rect::new(0, 1040, 1920, 1080), 200);
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let mut controller = EmbeddingController::new(shell.clone(), RecordingOverlay::new(hwnd, 80, 1.0));

    assert!(controller.try_attach());

    let taskbar = shell.find_window("Shell_TrayWnd").unwrap();
    assert_eq!(controller.state(), EmbeddingState::Running { taskbar });
    assert_eq!(shell.owner_of(hwnd), Some(taskbar));
    assert_eq!(shell.ex_style(hwnd) & OVERLAY_EX_STYLE, OVERLAY_EX_STYLE);
}

#[test]
fn test_fullscreen_blanks_without_moving() {
    let shell = desktop(Rect::new(0, 1040, 1920, 1080), 200);
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let overlay = RecordingOverlay::new(hwnd, 80, 1.0);
    let content = overlay.content.clone();
    let mut controller = EmbeddingController::new(shell.clone(), overlay);
    let mut render = || "values".to_string();

    assert!(matches!(controller.tick(&mut render), TickOutcome::Positioned(_)));
    let placements = shell.placements().len();

    let game = shell.add_window("SDL_app", Rect::new(0, 0, 1920, 1080));
    shell.set_foreground(Some(game));

    assert_eq!(controller.tick(&mut render), TickOutcome::Hidden);
    assert_eq!(shell.placements().len(), placements);
    assert_eq!(content.borrow().last().map(String::as_str), Some(""));

    shell.set_foreground(None);
    assert!(matches!(controller.tick(&mut render), TickOutcome::Positioned(_)));
    assert_eq!(content.borrow().last().map(String::as_str), Some("values"));
}

#[test]
fn test_detached_ticks_never_render() {
    let shell = Rc::new(FakeShell::default());
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let overlay = RecordingOverlay::new(hwnd, 80, 1.0);
    let content = overlay.content.clone();
    let mut controller = EmbeddingController::new(shell.clone(), overlay);

    let mut rendered = 0;
    let mut render = || {
        rendered += 1;
        "values".to_string()
    };

    for _ in 0..3 {
        assert_eq!(controller.tick(&mut render), TickOutcome::Detached);
    }
    assert_eq!(controller.state(), EmbeddingState::Retrying { attempts: 3 });
    assert!(content.borrow().iter().all(String::is_empty));
    drop(render);
    assert_eq!(rendered, 0);
}

#[test]
fn test_lost_taskbar_skips_positioning() {
    let shell = desktop(Rect::new(0, 1040, 1920, 1080), 200);
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let mut controller = EmbeddingController::new(shell.clone(), RecordingOverlay::new(hwnd, 80, 1.0));
    let mut render = || "values".to_string();

    controller.tick(&mut render);
    let taskbar = shell.find_window("Shell_TrayWnd").unwrap();
    shell.remove_window(taskbar);

    // The stale handle is kept; a hidden taskbar reads as fullscreen
    assert_eq!(controller.tick(&mut render), TickOutcome::Hidden);
    assert_eq!(controller.state(), EmbeddingState::Running { taskbar });
}

#[test]
fn test_high_dpi_placement_is_centered() {
    let shell = desktop(Rect::new(0, 2088, 3840, 2160), 300);
    let hwnd = shell.add_window("ObidomeOverlay", Rect::default());
    let mut controller = EmbeddingController::new(shell.clone(), RecordingOverlay::new(hwnd, 120, 1.5));
    let mut render = || "x".to_string();

    let TickOutcome::Positioned(placement) = controller.tick(&mut render) else {
        panic!("overlay should have been positioned");
    };

    // 72px physical taskbar at 1.5x: 48 logical, minus padding
    assert_eq!(placement.height, 44);
    let physical = placement.physical_rect();
    let gap_above = physical.top - 2088;
    let gap_below = 2160 - physical.bottom;
    assert!((gap_above - gap_below).abs() <= 1);
    assert!(physical.right <= 3840 - 300);
}
