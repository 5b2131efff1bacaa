//! Virtual key codes
//!
//! Key events cross the channel as Windows-style virtual key codes, which is
//! what the consuming UI layer understands. Keysyms that have no virtual key
//! map to `KeyboardCode::UNKNOWN`.

use serde::{Deserialize, Serialize};
use xkbcommon::xkb::keysyms;

/// Virtual key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyboardCode(pub u32);

impl KeyboardCode {
    pub const UNKNOWN: Self = Self(0x00);

    // ========================================================================
    // Editing / control
    // ========================================================================

    pub const BACK: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const RETURN: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    /// Alt
    pub const MENU: Self = Self(0x12);
    pub const PAUSE: Self = Self(0x13);
    /// Caps Lock
    pub const CAPITAL: Self = Self(0x14);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Page Up
    pub const PRIOR: Self = Self(0x21);
    /// Page Down
    pub const NEXT: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    /// Print Screen
    pub const SNAPSHOT: Self = Self(0x2C);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);

    // ========================================================================
    // Digits / letters (ASCII values)
    // ========================================================================

    pub const KEY_0: Self = Self(0x30);
    pub const KEY_A: Self = Self(0x41);
    pub const LWIN: Self = Self(0x5B);
    pub const RWIN: Self = Self(0x5C);

    // ========================================================================
    // Keypad
    // ========================================================================

    pub const NUMPAD0: Self = Self(0x60);
    pub const MULTIPLY: Self = Self(0x6A);
    pub const ADD: Self = Self(0x6B);
    pub const SEPARATOR: Self = Self(0x6C);
    pub const SUBTRACT: Self = Self(0x6D);
    pub const DECIMAL: Self = Self(0x6E);
    pub const DIVIDE: Self = Self(0x6F);

    // ========================================================================
    // Function keys / locks
    // ========================================================================

    pub const F1: Self = Self(0x70);
    pub const NUMLOCK: Self = Self(0x90);
    pub const SCROLL: Self = Self(0x91);

    // ========================================================================
    // OEM punctuation (US layout)
    // ========================================================================

    /// `;:`
    pub const OEM_1: Self = Self(0xBA);
    /// `=+`
    pub const OEM_PLUS: Self = Self(0xBB);
    /// `,<`
    pub const OEM_COMMA: Self = Self(0xBC);
    /// `-_`
    pub const OEM_MINUS: Self = Self(0xBD);
    /// `.>`
    pub const OEM_PERIOD: Self = Self(0xBE);
    /// `/?`
    pub const OEM_2: Self = Self(0xBF);
    /// `` `~ ``
    pub const OEM_3: Self = Self(0xC0);
    /// `[{`
    pub const OEM_4: Self = Self(0xDB);
    /// `\|`
    pub const OEM_5: Self = Self(0xDC);
    /// `]}`
    pub const OEM_6: Self = Self(0xDD);
    /// `'"`
    pub const OEM_7: Self = Self(0xDE);

    // ========================================================================
    // Action keys forwarded by the input method
    // ========================================================================

    pub const ACTION_KEY_RETURN: Self = Self::RETURN;
    pub const ACTION_KEY_BACK: Self = Self::BACK;
    pub const ACTION_KEY_LEFT: Self = Self::LEFT;
    pub const ACTION_KEY_RIGHT: Self = Self::RIGHT;

    /// Function key `n` (1-24)
    pub fn function(n: u32) -> Self {
        if (1..=24).contains(&n) {
            Self(Self::F1.0 + n - 1)
        } else {
            Self::UNKNOWN
        }
    }
}

/// Convert an XKB keysym to a virtual key code
pub fn keyboard_code_from_keysym(keysym: u32) -> KeyboardCode {
    match keysym {
        // Letters: both cases map to the upper-case code
        keysyms::KEY_a..=keysyms::KEY_z => KeyboardCode(keysym - keysyms::KEY_a + KeyboardCode::KEY_A.0),
        keysyms::KEY_A..=keysyms::KEY_Z => KeyboardCode(keysym - keysyms::KEY_A + KeyboardCode::KEY_A.0),
        keysyms::KEY_0..=keysyms::KEY_9 => KeyboardCode(keysym - keysyms::KEY_0 + KeyboardCode::KEY_0.0),

        // Shifted digits (US layout)
        keysyms::KEY_parenright => KeyboardCode(KeyboardCode::KEY_0.0),
        keysyms::KEY_exclam => KeyboardCode(KeyboardCode::KEY_0.0 + 1),
        keysyms::KEY_at => KeyboardCode(KeyboardCode::KEY_0.0 + 2),
        keysyms::KEY_numbersign => KeyboardCode(KeyboardCode::KEY_0.0 + 3),
        keysyms::KEY_dollar => KeyboardCode(KeyboardCode::KEY_0.0 + 4),
        keysyms::KEY_percent => KeyboardCode(KeyboardCode::KEY_0.0 + 5),
        keysyms::KEY_asciicircum => KeyboardCode(KeyboardCode::KEY_0.0 + 6),
        keysyms::KEY_ampersand => KeyboardCode(KeyboardCode::KEY_0.0 + 7),
        keysyms::KEY_asterisk => KeyboardCode(KeyboardCode::KEY_0.0 + 8),
        keysyms::KEY_parenleft => KeyboardCode(KeyboardCode::KEY_0.0 + 9),

        // Control keys
        keysyms::KEY_BackSpace => KeyboardCode::BACK,
        keysyms::KEY_Tab | keysyms::KEY_ISO_Left_Tab | keysyms::KEY_KP_Tab => KeyboardCode::TAB,
        keysyms::KEY_Return | keysyms::KEY_KP_Enter | keysyms::KEY_ISO_Enter => KeyboardCode::RETURN,
        keysyms::KEY_Escape => KeyboardCode::ESCAPE,
        keysyms::KEY_space | keysyms::KEY_KP_Space => KeyboardCode::SPACE,
        keysyms::KEY_Pause => KeyboardCode::PAUSE,
        keysyms::KEY_Print => KeyboardCode::SNAPSHOT,

        // Navigation (keypad variants included)
        keysyms::KEY_Home | keysyms::KEY_KP_Home => KeyboardCode::HOME,
        keysyms::KEY_End | keysyms::KEY_KP_End => KeyboardCode::END,
        keysyms::KEY_Prior | keysyms::KEY_KP_Prior => KeyboardCode::PRIOR,
        keysyms::KEY_Next | keysyms::KEY_KP_Next => KeyboardCode::NEXT,
        keysyms::KEY_Left | keysyms::KEY_KP_Left => KeyboardCode::LEFT,
        keysyms::KEY_Right | keysyms::KEY_KP_Right => KeyboardCode::RIGHT,
        keysyms::KEY_Up | keysyms::KEY_KP_Up => KeyboardCode::UP,
        keysyms::KEY_Down | keysyms::KEY_KP_Down => KeyboardCode::DOWN,
        keysyms::KEY_Insert | keysyms::KEY_KP_Insert => KeyboardCode::INSERT,
        keysyms::KEY_Delete | keysyms::KEY_KP_Delete => KeyboardCode::DELETE,

        // Modifiers and locks
        keysyms::KEY_Shift_L | keysyms::KEY_Shift_R => KeyboardCode::SHIFT,
        keysyms::KEY_Control_L | keysyms::KEY_Control_R => KeyboardCode::CONTROL,
        keysyms::KEY_Alt_L | keysyms::KEY_Alt_R | keysyms::KEY_Meta_L | keysyms::KEY_Meta_R => {
            KeyboardCode::MENU
        }
        keysyms::KEY_Super_L => KeyboardCode::LWIN,
        keysyms::KEY_Super_R => KeyboardCode::RWIN,
        keysyms::KEY_Caps_Lock => KeyboardCode::CAPITAL,
        keysyms::KEY_Num_Lock => KeyboardCode::NUMLOCK,
        keysyms::KEY_Scroll_Lock => KeyboardCode::SCROLL,

        // Keypad
        keysyms::KEY_KP_0..=keysyms::KEY_KP_9 => {
            KeyboardCode(keysym - keysyms::KEY_KP_0 + KeyboardCode::NUMPAD0.0)
        }
        keysyms::KEY_KP_Multiply => KeyboardCode::MULTIPLY,
        keysyms::KEY_KP_Add => KeyboardCode::ADD,
        keysyms::KEY_KP_Separator => KeyboardCode::SEPARATOR,
        keysyms::KEY_KP_Subtract => KeyboardCode::SUBTRACT,
        keysyms::KEY_KP_Decimal => KeyboardCode::DECIMAL,
        keysyms::KEY_KP_Divide => KeyboardCode::DIVIDE,

        // Function keys
        keysyms::KEY_F1..=keysyms::KEY_F24 => KeyboardCode::function(keysym - keysyms::KEY_F1 + 1),

        // Punctuation
        keysyms::KEY_semicolon | keysyms::KEY_colon => KeyboardCode::OEM_1,
        keysyms::KEY_equal | keysyms::KEY_plus => KeyboardCode::OEM_PLUS,
        keysyms::KEY_comma | keysyms::KEY_less => KeyboardCode::OEM_COMMA,
        keysyms::KEY_minus | keysyms::KEY_underscore => KeyboardCode::OEM_MINUS,
        keysyms::KEY_period | keysyms::KEY_greater => KeyboardCode::OEM_PERIOD,
        keysyms::KEY_slash | keysyms::KEY_question => KeyboardCode::OEM_2,
        keysyms::KEY_grave | keysyms::KEY_asciitilde => KeyboardCode::OEM_3,
        keysyms::KEY_bracketleft | keysyms::KEY_braceleft => KeyboardCode::OEM_4,
        keysyms::KEY_backslash | keysyms::KEY_bar => KeyboardCode::OEM_5,
        keysyms::KEY_bracketright | keysyms::KEY_braceright => KeyboardCode::OEM_6,
        keysyms::KEY_apostrophe | keysyms::KEY_quotedbl => KeyboardCode::OEM_7,

        _ => KeyboardCode::UNKNOWN,
    }
}
