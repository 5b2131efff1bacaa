//! Input handling
//!
//! Seat-side translation of display-server callbacks.
//! - Pointer / keyboard capability objects and focus tracking (device)
//! - Keymap compilation and key translation via xkbcommon (xkb)
//! - Text-input (IME) client over the text_model protocol (text_input)

pub mod cursor;
pub mod device;
pub mod keycodes;
pub mod protocol;
pub mod text_input;
pub mod xkb;

pub use cursor::{CursorImage, WindowComponent};
pub use device::InputDevice;
pub use protocol::{
    Capability, Fixed, KeyNotifyFilter, KeyboardEvent, PointerEvent, SeatEvent, SeatId,
    SeatProtocol, SurfaceId, TextModel, TextModelEvent, TextModelFactory, WindowRegistry,
};
pub use text_input::TextInput;
pub use xkb::{KeymapEngine, KeymapError};
