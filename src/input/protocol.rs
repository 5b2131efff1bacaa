//! Display-server protocol surface
//!
//! Raw callbacks arrive as the enums below, one enum per listener table.
//! The owning device or controller dispatches each table through a single
//! `handle_*` entry point, which plays the role of the listener struct plus
//! its user-data pointer.
//!
//! Protocol objects themselves (seat capabilities, text models) and the
//! window registry are collaborators owned elsewhere and reached through
//! the traits in this module.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::os::fd::OwnedFd;

use crate::constants::{
    FIXED_SCALE, POINTER_AXIS_HORIZONTAL_SCROLL, POINTER_AXIS_VERTICAL_SCROLL, STATE_PRESSED,
    STATE_RELEASED,
};
use crate::events::WindowHandle;

/// Server-side surface identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Seat identifier passed to text-model requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatId(pub u32);

/// Signed 24.8 fixed-point value (wl_fixed_t)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fixed(pub i32);

impl Fixed {
    pub fn from_f64(value: f64) -> Self {
        Self((value * FIXED_SCALE).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / FIXED_SCALE
    }
}

bitflags! {
    /// wl_seat capability bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capability: u32 {
        const POINTER  = 1;
        const KEYBOARD = 2;
        const TOUCH    = 4;
    }
}

/// Button / key state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Released,
    Pressed,
}

impl PressState {
    /// Anything other than "released" counts as a press
    pub fn from_raw(state: u32) -> Self {
        if state == STATE_RELEASED {
            PressState::Released
        } else {
            PressState::Pressed
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            PressState::Released => STATE_RELEASED,
            PressState::Pressed => STATE_PRESSED,
        }
    }

    pub fn is_pressed(self) -> bool {
        self == PressState::Pressed
    }
}

/// Scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    VerticalScroll,
    HorizontalScroll,
}

impl Axis {
    pub fn from_raw(axis: u32) -> Option<Self> {
        match axis {
            POINTER_AXIS_VERTICAL_SCROLL => Some(Axis::VerticalScroll),
            POINTER_AXIS_HORIZONTAL_SCROLL => Some(Axis::HorizontalScroll),
            _ => None,
        }
    }
}

// ============================================================================
// Listener tables
// ============================================================================

/// wl_seat events
#[derive(Debug, Clone, Copy)]
pub enum SeatEvent {
    Capabilities { capabilities: u32 },
}

/// wl_pointer events
#[derive(Debug, Clone, Copy)]
pub enum PointerEvent {
    Enter {
        serial: u32,
        surface: SurfaceId,
        surface_x: Fixed,
        surface_y: Fixed,
    },
    Leave {
        serial: u32,
        surface: SurfaceId,
    },
    Motion {
        time: u32,
        surface_x: Fixed,
        surface_y: Fixed,
    },
    Button {
        serial: u32,
        time: u32,
        button: u32,
        state: u32,
    },
    Axis {
        time: u32,
        axis: u32,
        value: Fixed,
    },
}

/// wl_keyboard events
#[derive(Debug)]
pub enum KeyboardEvent {
    /// Keymap blob shared through a file descriptor
    Keymap { format: u32, fd: OwnedFd, size: u32 },
    Enter {
        serial: u32,
        surface: SurfaceId,
        keys: Vec<u32>,
    },
    Leave {
        serial: u32,
        surface: SurfaceId,
    },
    Key {
        serial: u32,
        time: u32,
        key: u32,
        state: u32,
    },
    Modifiers {
        serial: u32,
        mods_depressed: u32,
        mods_latched: u32,
        mods_locked: u32,
        group: u32,
    },
}

/// text_model events
#[derive(Debug, Clone)]
pub enum TextModelEvent {
    CommitString {
        serial: u32,
        text: String,
    },
    PreeditString {
        serial: u32,
        text: String,
        commit: String,
    },
    DeleteSurroundingText {
        serial: u32,
        index: i32,
        length: u32,
    },
    CursorPosition {
        serial: u32,
        index: i32,
        anchor: i32,
    },
    PreeditStyling {
        serial: u32,
        index: u32,
        length: u32,
        style: u32,
    },
    PreeditCursor {
        serial: u32,
        index: i32,
    },
    ModifiersMap {
        map: Vec<u8>,
    },
    Keysym {
        serial: u32,
        time: u32,
        sym: u32,
        state: u32,
        modifiers: u32,
    },
    Enter {
        surface: SurfaceId,
    },
    Leave,
    InputPanelState {
        state: u32,
    },
    InputPanelRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

// ============================================================================
// Collaborators
// ============================================================================

/// Seat object able to hand out capability objects
///
/// Returned objects are destroyed when dropped.
pub trait SeatProtocol {
    type Pointer;
    type Keyboard;

    fn get_pointer(&mut self) -> Self::Pointer;
    fn get_keyboard(&mut self) -> Self::Keyboard;
}

/// Lookup into the window registry owned by the windowing layer
pub trait WindowRegistry {
    /// Window whose surface is `surface`, if any
    fn window_for_surface(&self, surface: SurfaceId) -> Option<WindowHandle>;
    /// Whether `window` is still a live tracked window
    fn is_window(&self, window: WindowHandle) -> bool;
    /// Surface of the window's shell surface
    fn surface_for_window(&self, window: WindowHandle) -> Option<SurfaceId>;
}

/// Text-input protocol client object
///
/// Destroyed when dropped.
pub trait TextModel {
    fn activate(&mut self, serial: u32, seat: SeatId, surface: SurfaceId);
    fn deactivate(&mut self, seat: SeatId);
}

/// Global that creates text models
pub trait TextModelFactory {
    type Model: TextModel;

    fn create_text_model(&mut self) -> Self::Model;
}

/// Keyboard-engine query used by the text-input keysym path
pub trait KeyNotifyFilter {
    /// True if a key notification would duplicate one already delivered
    fn should_ignore_key_notify(&self, code: u32, is_press: bool) -> bool;
}
