//! Host-shell integration
//!
//! Callbacks from the platform shell surface attached to each window.

pub mod surface;

pub use surface::{handle_shell_surface_event, ShellSurfaceEvent, ShellSurfaceState};
