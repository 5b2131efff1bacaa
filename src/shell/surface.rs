//! Shell-surface callbacks
//!
//! Only `close` produces an event; the remaining callbacks are logged.

use log::{debug, info};

use crate::events::{EventConverter, WindowHandle};

/// Window state reported by the host shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSurfaceState {
    Default,
    Minimized,
    Maximized,
    Fullscreen,
}

impl ShellSurfaceState {
    pub fn from_raw(state: u32) -> Option<Self> {
        match state {
            0 => Some(ShellSurfaceState::Default),
            1 => Some(ShellSurfaceState::Minimized),
            2 => Some(ShellSurfaceState::Maximized),
            3 => Some(ShellSurfaceState::Fullscreen),
            _ => None,
        }
    }
}

/// Shell-surface events
#[derive(Debug, Clone)]
pub enum ShellSurfaceEvent {
    StateChanged { state: u32 },
    PositionChanged { x: i32, y: i32 },
    Close,
    /// Damage rectangles as flattened (x, y, width, height) quadruples
    Exposed { rectangles: Vec<i32> },
    StateAboutToChange { state: u32 },
}

/// Shell-surface listener table for `window`
pub fn handle_shell_surface_event(
    window: WindowHandle,
    event: ShellSurfaceEvent,
    converter: &dyn EventConverter,
) {
    match event {
        ShellSurfaceEvent::Close => {
            info!("Host shell asked {} to close", window);
            #[cfg(feature = "webos")]
            converter.close_window(window);
            #[cfg(not(feature = "webos"))]
            converter.close_widget(window);
        }
        ShellSurfaceEvent::StateChanged { state }
        | ShellSurfaceEvent::StateAboutToChange { state } => {
            match ShellSurfaceState::from_raw(state) {
                Some(state) => debug!("{} state: {:?}", window, state),
                None => debug!("{} unknown state {}", window, state),
            }
        }
        ShellSurfaceEvent::PositionChanged { x, y } => {
            debug!("{} moved to ({}, {})", window, x, y);
        }
        ShellSurfaceEvent::Exposed { rectangles } => {
            debug!("{} exposed ({} rects)", window, rectangles.len() / 4);
        }
    }
}
