// Shared fakes for the integration tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use obidome::core::taskbar::OverlaySurface;
use obidome::core::values::{
    Clock, CommandRunner, DiskCounters, MemorySample, NetworkCounters, ProcessSample, ProcessTable,
    SystemProbe,
};
use obidome::platform::WindowHandle;

#[derive(Debug, Default)]
pub struct ProbeState {
    pub cpu: f32,
    pub memory: MemorySample,
    pub network: NetworkCounters,
    pub disk: DiskCounters,
    pub processes: Vec<ProcessSample>,
}

/// Probe whose readings the test can change at any time
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    pub state: Rc<RefCell<ProbeState>>,
}

impl SystemProbe for ScriptedProbe {
    fn cpu_percent(&mut self) -> f32 {
        self.state.borrow().cpu
    }

    fn cpu_core_count(&mut self) -> usize {
        4
    }

    fn memory(&mut self) -> MemorySample {
        self.state.borrow().memory
    }

    fn network(&mut self) -> NetworkCounters {
        self.state.borrow().network
    }

    fn process_table(&mut self) -> ProcessTable {
        let state = self.state.borrow();
        ProcessTable {
            disk: state.disk,
            processes: state.processes.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ManualClock(pub Rc<Cell<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(Instant::now())))
    }

    pub fn advance(&self, by: std::time::Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

/// Returns the command text itself, and counts invocations
#[derive(Clone, Default)]
pub struct RecordingRunner {
    pub calls: Rc<Cell<usize>>,
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &str) -> String {
        self.calls.set(self.calls.get() + 1);
        command.trim().to_string()
    }
}

#[derive(Debug)]
pub struct RecordingOverlay {
    pub hwnd: WindowHandle,
    pub width: i32,
    pub scale: f64,
    pub content: Rc<RefCell<Vec<String>>>,
}

impl RecordingOverlay {
    pub fn new(hwnd: WindowHandle, width: i32, scale: f64) -> Self {
        Self {
            hwnd,
            width,
            scale,
            content: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl OverlaySurface for RecordingOverlay {
    fn handle(&self) -> WindowHandle {
        self.hwnd
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }

    fn preferred_width(&self) -> i32 {
        self.width
    }

    fn set_content(&mut self, content: &str) {
        self.content.borrow_mut().push(content.to_string());
    }
}

pub fn gib(n: u64) -> u64 {
    n * 1024 * 1024 * 1024
}
