//! Normalized events
//!
//! Closed, transport-safe representation of everything the seat and the
//! text-input controller report. Payloads are plain geometry, identifiers
//! and text so an event can be moved to another execution context (or
//! serialized for another process) without referencing protocol objects.
//!
//! - `converter`: the per-kind sink interface
//! - `dispatcher`: ordered cross-context delivery to a bound channel
//! - `window_change`: observer fan-out on the consuming side
//! - `keyboard_codes`: keysym to virtual key code mapping

pub mod converter;
pub mod dispatcher;
pub mod keyboard_codes;
pub mod window_change;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use converter::EventConverter;
pub use dispatcher::{
    ChannelSender, DeliveryPump, InputMessage, MessageSender, RemoteEventDispatcher, SendError,
};
pub use keyboard_codes::{keyboard_code_from_keysym, KeyboardCode};
pub use window_change::{ObserverList, WindowChangeObserver, WindowEventRouter};

/// Numeric window/widget handle understood by both ends of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub u32);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Event type carried by button, key and touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    MousePressed,
    MouseReleased,
    MouseMoved,
    MouseWheel,
    KeyPressed,
    KeyReleased,
    TouchPressed,
    TouchReleased,
    TouchMoved,
    TouchCancelled,
}

impl EventType {
    pub fn is_press(self) -> bool {
        matches!(
            self,
            EventType::MousePressed | EventType::KeyPressed | EventType::TouchPressed
        )
    }
}

bitflags! {
    /// Mouse button flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct EventFlags: u32 {
        const LEFT_MOUSE_BUTTON   = 1 << 4;
        const MIDDLE_MOUSE_BUTTON = 1 << 5;
        const RIGHT_MOUSE_BUTTON  = 1 << 6;
    }
}

bitflags! {
    /// Normalized keyboard modifier set
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const SHIFT   = 0b001;
        const CONTROL = 0b010;
        const ALT     = 0b100;
    }
}

/// Normalized input/window event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer moved (surface-local coordinates)
    Motion { x: f64, y: f64 },
    /// Pointer button press/release at the last known pointer position
    Button {
        handle: Option<WindowHandle>,
        kind: EventType,
        flags: EventFlags,
        x: f64,
        y: f64,
    },
    /// Scroll; offsets are multiples of the wheel delta
    Axis {
        x: f64,
        y: f64,
        x_offset: i32,
        y_offset: i32,
    },
    PointerEnter { handle: WindowHandle, x: f64, y: f64 },
    PointerLeave { handle: WindowHandle, x: f64, y: f64 },
    /// Key press/release with a virtual key code
    Key {
        kind: EventType,
        code: KeyboardCode,
        modifiers: Modifiers,
    },
    Touch {
        kind: EventType,
        x: f64,
        y: f64,
        touch_id: i32,
        time_stamp: u32,
    },
    OutputSizeChanged { width: u32, height: u32 },
    WindowResized {
        handle: WindowHandle,
        width: u32,
        height: u32,
    },
    CloseWidget { handle: WindowHandle },
    /// IME committed text
    Commit { handle: WindowHandle, text: String },
    /// IME composing text and the text it would commit
    PreeditChanged {
        handle: WindowHandle,
        text: String,
        commit: String,
    },
    PreeditStart,
    PreeditEnd,
    /// Close requested by the host shell
    #[cfg(feature = "webos")]
    CloseWindow { handle: WindowHandle },
}

impl InputEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            InputEvent::Motion { .. } => "motion",
            InputEvent::Button { .. } => "button",
            InputEvent::Axis { .. } => "axis",
            InputEvent::PointerEnter { .. } => "pointer-enter",
            InputEvent::PointerLeave { .. } => "pointer-leave",
            InputEvent::Key { .. } => "key",
            InputEvent::Touch { .. } => "touch",
            InputEvent::OutputSizeChanged { .. } => "output-size",
            InputEvent::WindowResized { .. } => "window-resized",
            InputEvent::CloseWidget { .. } => "close-widget",
            InputEvent::Commit { .. } => "commit",
            InputEvent::PreeditChanged { .. } => "preedit-changed",
            InputEvent::PreeditStart => "preedit-start",
            InputEvent::PreeditEnd => "preedit-end",
            #[cfg(feature = "webos")]
            InputEvent::CloseWindow { .. } => "close-window",
        }
    }
}
