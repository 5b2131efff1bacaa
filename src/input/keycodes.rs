//! evdev code constants
//!
//! Linux input event codes from <linux/input-event-codes.h> that the
//! compositor forwards unchanged in pointer and keyboard events.

// ============================================================================
// Mouse Buttons
// ============================================================================

/// Left mouse button
pub const BTN_LEFT: u32 = 0x110;

/// Right mouse button
pub const BTN_RIGHT: u32 = 0x111;

/// Middle mouse button
pub const BTN_MIDDLE: u32 = 0x112;

/// Side button (not mapped to a flag)
pub const BTN_SIDE: u32 = 0x113;

/// Extra button (not mapped to a flag)
pub const BTN_EXTRA: u32 = 0x114;

// ============================================================================
// Keys referenced by tests and replay scripts
// ============================================================================

/// Backspace key
pub const KEY_BACKSPACE: u32 = 14;

/// Enter key (XKB keycode 36 after offset)
pub const KEY_ENTER: u32 = 28;

/// Left Control key
pub const KEY_LEFTCTRL: u32 = 29;

/// A key
pub const KEY_A: u32 = 30;

/// Left Shift key
pub const KEY_LEFTSHIFT: u32 = 42;

/// Left Alt key
pub const KEY_LEFTALT: u32 = 56;
