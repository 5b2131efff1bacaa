//! Keymap / modifier engine
//!
//! Compiles the keymap the compositor shares over wl_keyboard, keeps the
//! XKB state in sync with modifier events and resolves raw key codes to a
//! single keysym plus the normalized modifier set.
//!
//! A keymap that can't be mapped or compiled leaves the engine without a
//! keymap; key events are then ignored rather than translated.

use log::{debug, info, warn};
use memmap2::MmapOptions;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::os::fd::OwnedFd;
use thiserror::Error;
use xkbcommon::xkb;
use xkbcommon::xkb::keysyms;

use super::protocol::KeyNotifyFilter;
use crate::constants::{
    KEYMAP_FORMAT_XKB_V1, XKB_KEYCODE_OFFSET, XKB_MOD_NAME_ALT, XKB_MOD_NAME_CONTROL,
    XKB_MOD_NAME_SHIFT,
};
use crate::events::Modifiers;

/// Reasons a keymap was rejected
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("unsupported keymap format {0}")]
    UnsupportedFormat(u32),
    #[error("failed to map keymap: {0}")]
    Map(#[from] std::io::Error),
    #[error("keymap is not valid UTF-8")]
    InvalidUtf8,
    #[error("failed to compile keymap")]
    Compile,
}

/// Compiled keymap with its live state
///
/// Keymap and state live and die together.
struct LoadedKeymap {
    keymap: xkb::Keymap,
    state: xkb::State,
    control_mask: u32,
    alt_mask: u32,
    shift_mask: u32,
}

impl LoadedKeymap {
    fn compile(context: &xkb::Context, text: &str) -> Result<Self, KeymapError> {
        let keymap = xkb::Keymap::new_from_string(
            context,
            text.to_string(),
            xkb::KEYMAP_FORMAT_TEXT_V1,
            xkb::COMPILE_NO_FLAGS,
        )
        .ok_or(KeymapError::Compile)?;

        let state = xkb::State::new(&keymap);
        let control_mask = mod_mask(&keymap, XKB_MOD_NAME_CONTROL);
        let alt_mask = mod_mask(&keymap, XKB_MOD_NAME_ALT);
        let shift_mask = mod_mask(&keymap, XKB_MOD_NAME_SHIFT);

        Ok(Self {
            keymap,
            state,
            control_mask,
            alt_mask,
            shift_mask,
        })
    }
}

/// Bit for a named modifier, 0 if the keymap doesn't define it
fn mod_mask(keymap: &xkb::Keymap, name: &str) -> u32 {
    let index = keymap.mod_get_index(name);
    if index == xkb::MOD_INVALID || index >= u32::BITS {
        debug!("Keymap has no {} modifier", name);
        0
    } else {
        1 << index
    }
}

/// Text-input echo bookkeeping for one keysym
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct KeyEcho {
    /// Keyboard path delivered a press no text-input press has matched yet
    keyboard_press: bool,
    /// A text-input press was suppressed; its release must be too
    suppressed_press: bool,
}

/// Keyboard keymap state machine
pub struct KeymapEngine {
    context: xkb::Context,
    loaded: Option<LoadedKeymap>,
    /// Keysyms the keyboard path delivered that text input may echo
    echoes: RefCell<HashMap<u32, KeyEcho>>,
}

impl KeymapEngine {
    pub fn new() -> Self {
        Self {
            context: xkb::Context::new(xkb::CONTEXT_NO_FLAGS),
            loaded: None,
            echoes: RefCell::new(HashMap::new()),
        }
    }

    pub fn has_keymap(&self) -> bool {
        self.loaded.is_some()
    }

    /// Load a keymap shared through `fd`
    ///
    /// Consumes (and thereby closes) the descriptor in every case.
    pub fn load_keymap(&mut self, format: u32, fd: OwnedFd, size: u32) {
        let result = map_keymap(format, fd, size)
            .and_then(|text| LoadedKeymap::compile(&self.context, &text));
        self.install(result);
    }

    /// Load a keymap from its text form
    pub fn load_keymap_str(&mut self, format: u32, text: &str) {
        let result = if format == KEYMAP_FORMAT_XKB_V1 {
            LoadedKeymap::compile(&self.context, text)
        } else {
            Err(KeymapError::UnsupportedFormat(format))
        };
        self.install(result);
    }

    fn install(&mut self, result: Result<LoadedKeymap, KeymapError>) {
        self.echoes.borrow_mut().clear();
        match result {
            Ok(loaded) => {
                info!(
                    "Keymap loaded ({} layouts, ctrl={:#x} alt={:#x} shift={:#x})",
                    loaded.keymap.num_layouts(),
                    loaded.control_mask,
                    loaded.alt_mask,
                    loaded.shift_mask
                );
                self.loaded = Some(loaded);
            }
            Err(e) => {
                warn!("Keymap rejected, key events will be ignored: {}", e);
                self.loaded = None;
            }
        }
    }

    /// Drop the keymap (keyboard capability revoked)
    pub fn clear(&mut self) {
        if self.loaded.take().is_some() {
            debug!("Keymap released");
        }
        self.echoes.borrow_mut().clear();
    }

    /// Merge a wl_keyboard.modifiers report into the XKB state
    pub fn update_modifier_mask(&mut self, depressed: u32, latched: u32, locked: u32, group: u32) {
        match self.loaded.as_mut() {
            Some(loaded) => {
                loaded
                    .state
                    .update_mask(depressed, latched, locked, 0, 0, group);
            }
            None => debug!("Modifiers ignored: no keymap"),
        }
    }

    /// Resolve a raw (evdev) key code
    ///
    /// `None` means no keymap is loaded. A key producing anything other
    /// than exactly one keysym resolves to `KEY_NoSymbol`.
    pub fn translate_key(&self, code: u32) -> Option<u32> {
        let loaded = self.loaded.as_ref()?;
        let keycode = xkb::Keycode::new(code + XKB_KEYCODE_OFFSET);
        let syms = loaded.state.key_get_syms(keycode);
        if syms.len() == 1 {
            Some(syms[0].raw())
        } else {
            Some(keysyms::KEY_NoSymbol)
        }
    }

    /// Normalized modifiers from the current XKB state
    pub fn current_modifiers(&self) -> Modifiers {
        let Some(loaded) = self.loaded.as_ref() else {
            return Modifiers::empty();
        };
        let mask = loaded
            .state
            .serialize_mods(xkb::STATE_MODS_DEPRESSED | xkb::STATE_MODS_LATCHED);

        let mut modifiers = Modifiers::empty();
        if mask & loaded.control_mask != 0 {
            modifiers |= Modifiers::CONTROL;
        }
        if mask & loaded.alt_mask != 0 {
            modifiers |= Modifiers::ALT;
        }
        if mask & loaded.shift_mask != 0 {
            modifiers |= Modifiers::SHIFT;
        }
        modifiers
    }

    /// Record a key the primary keyboard path just emitted
    ///
    /// Only presses open an echo window; a release always comes from the
    /// same path as its press.
    pub fn note_key_emitted(&self, keysym: u32, pressed: bool) {
        if pressed {
            self.echoes
                .borrow_mut()
                .entry(keysym)
                .or_default()
                .keyboard_press = true;
        }
    }
}

impl Default for KeymapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyNotifyFilter for KeymapEngine {
    /// Suppress a text-input keysym the keyboard path already delivered
    ///
    /// A text-input press is suppressed when it matches an unmatched
    /// keyboard press of the same keysym, and its release is suppressed
    /// with it, whichever order the two paths interleave in. Keys that only
    /// arrive through text input pass through as press/release pairs.
    fn should_ignore_key_notify(&self, code: u32, is_press: bool) -> bool {
        if code == keysyms::KEY_NoSymbol {
            return true;
        }
        let mut echoes = self.echoes.borrow_mut();
        let Some(echo) = echoes.get_mut(&code) else {
            return false;
        };

        let ignore = if is_press {
            if echo.keyboard_press {
                echo.keyboard_press = false;
                echo.suppressed_press = true;
                true
            } else {
                false
            }
        } else {
            std::mem::take(&mut echo.suppressed_press)
        };

        if *echo == KeyEcho::default() {
            echoes.remove(&code);
        }
        ignore
    }
}

/// Map the shared keymap blob and return its text (up to the first NUL)
fn map_keymap(format: u32, fd: OwnedFd, size: u32) -> Result<String, KeymapError> {
    if format != KEYMAP_FORMAT_XKB_V1 {
        return Err(KeymapError::UnsupportedFormat(format));
    }

    let file = File::from(fd);
    // SAFETY: read-only private view of a compositor-owned keymap; the
    // mapping is copied into a String before the file is dropped.
    let map = unsafe { MmapOptions::new().len(size as usize).map(&file)? };
    let end = map.iter().position(|&b| b == 0).unwrap_or(map.len());
    let text = std::str::from_utf8(&map[..end]).map_err(|_| KeymapError::InvalidUtf8)?;
    Ok(text.to_string())
}
