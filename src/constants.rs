//! Global constants for seatbridge
//!
//! Protocol enum values and conversion factors shared by the input
//! device, the keymap engine and the text-input controller.

// ============================================================================
// Keyboard
// ============================================================================

/// Offset between evdev scan codes (as sent by the compositor) and XKB keycodes
pub const XKB_KEYCODE_OFFSET: u32 = 8;

/// wl_keyboard keymap format: client must use its own keymap
pub const KEYMAP_FORMAT_NO_KEYMAP: u32 = 0;

/// wl_keyboard keymap format: libxkbcommon text format v1
pub const KEYMAP_FORMAT_XKB_V1: u32 = 1;

/// XKB real modifier names used for the normalized modifier set
pub const XKB_MOD_NAME_CONTROL: &str = "Control";
pub const XKB_MOD_NAME_ALT: &str = "Mod1";
pub const XKB_MOD_NAME_SHIFT: &str = "Shift";

// ============================================================================
// Pointer
// ============================================================================

/// Scroll offset reported per wheel notch
pub const WHEEL_DELTA: i32 = 120;

/// wl_fixed_t is a signed 24.8 fixed-point number
pub const FIXED_SCALE: f64 = 256.0;

/// wl_pointer axis values
pub const POINTER_AXIS_VERTICAL_SCROLL: u32 = 0;
pub const POINTER_AXIS_HORIZONTAL_SCROLL: u32 = 1;

// ============================================================================
// Button / key state
// ============================================================================

/// wl_pointer.button_state and wl_keyboard.key_state share these values
pub const STATE_RELEASED: u32 = 0;
pub const STATE_PRESSED: u32 = 1;

// ============================================================================
// Text input
// ============================================================================

/// Correlation token used when activating the text model
pub const TEXT_MODEL_ACTIVATE_SERIAL: u32 = 0;
