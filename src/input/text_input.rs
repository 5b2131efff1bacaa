//! Text-input (IME) controller
//!
//! Client of the compositor's text_model protocol for one input device.
//!
//! State machine:
//!
//! ```text
//!   Inactive ──show──▶ Active-Visible ──hide──▶ Inactive
//!      │                    ▲
//!    reset                show (needs an active window)
//!      ▼                    │
//!   Active-Hidden ──────────┘
//! ```
//!
//! Hiding destroys the text model; the next show creates a fresh one.
//! Commit/preedit callbacks are tagged with the *last* active window, which
//! survives focus loss so late callbacks still reach the right window.

use log::{debug, info, trace, warn};
use std::rc::Rc;
use std::sync::Arc;
use xkbcommon::xkb::keysyms;

use super::protocol::{
    KeyNotifyFilter, PressState, SeatId, TextModel, TextModelEvent, TextModelFactory,
    WindowRegistry,
};
use crate::config::{ImeConfig, MissingWindowPolicy};
use crate::constants::{
    TEXT_MODEL_ACTIVATE_SERIAL, XKB_MOD_NAME_ALT, XKB_MOD_NAME_CONTROL, XKB_MOD_NAME_SHIFT,
};
use crate::events::{EventConverter, EventType, KeyboardCode, Modifiers, WindowHandle};

pub struct TextInput<F: TextModelFactory> {
    /// `None` when the compositor doesn't offer the extension (or IME is off)
    factory: Option<F>,
    text_model: Option<F::Model>,
    visible: bool,
    active_window: Option<WindowHandle>,
    last_active_window: Option<WindowHandle>,
    missing_window: MissingWindowPolicy,
    /// Keysym modifier bit i stands for `modifiers_map[i]`
    modifiers_map: Vec<Modifiers>,
    registry: Rc<dyn WindowRegistry>,
    converter: Arc<dyn EventConverter>,
}

impl<F: TextModelFactory> TextInput<F> {
    pub fn new(
        factory: Option<F>,
        registry: Rc<dyn WindowRegistry>,
        converter: Arc<dyn EventConverter>,
        config: &ImeConfig,
    ) -> Self {
        let factory = if config.enabled {
            factory
        } else {
            info!("IME disabled by config");
            None
        };
        Self {
            factory,
            text_model: None,
            visible: false,
            active_window: None,
            last_active_window: None,
            missing_window: config.missing_window,
            modifiers_map: Vec::new(),
            registry,
            converter,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_text_model(&self) -> bool {
        self.text_model.is_some()
    }

    pub fn active_window(&self) -> Option<WindowHandle> {
        self.active_window
    }

    pub fn last_active_window(&self) -> Option<WindowHandle> {
        self.last_active_window
    }

    /// Create the text model if possible; visibility is left alone
    pub fn reset_ime(&mut self) {
        self.ensure_text_model();
    }

    fn ensure_text_model(&mut self) {
        if self.text_model.is_some() {
            return;
        }
        if let Some(factory) = self.factory.as_mut() {
            debug!("Creating text model");
            self.text_model = Some(factory.create_text_model());
        }
    }

    /// Activate the text model on the active window's surface
    ///
    /// Silently does nothing without an active window.
    pub fn show_input_panel(&mut self, seat: SeatId) {
        if self.visible {
            return;
        }
        self.ensure_text_model();

        let Some(window) = self.active_window else {
            debug!("show_input_panel: no active window");
            return;
        };
        let Some(model) = self.text_model.as_mut() else {
            debug!("show_input_panel: text input unavailable");
            return;
        };
        let Some(surface) = self.registry.surface_for_window(window) else {
            warn!("show_input_panel: {} has no surface", window);
            return;
        };

        model.activate(TEXT_MODEL_ACTIVATE_SERIAL, seat, surface);
        self.visible = true;
        debug!("Input panel shown for {}", window);
    }

    /// Deactivate and destroy the text model
    pub fn hide_input_panel(&mut self, seat: SeatId) {
        if !self.visible {
            return;
        }
        if let Some(mut model) = self.text_model.take() {
            model.deactivate(seat);
            drop(model);
        }
        self.visible = false;
        debug!("Input panel hidden");
    }

    /// Set the window text input targets
    ///
    /// A non-null window also becomes the last active window; clearing the
    /// active window keeps the last one.
    pub fn set_active_window(&mut self, window: Option<WindowHandle>) {
        self.active_window = window;
        if window.is_some() {
            self.last_active_window = window;
        }
    }

    /// text_model listener table
    pub fn handle_event(&mut self, event: TextModelEvent, filter: &dyn KeyNotifyFilter) {
        match event {
            TextModelEvent::CommitString { text, .. } => self.on_commit_string(&text),
            TextModelEvent::PreeditString { text, commit, .. } => {
                self.on_preedit_string(&text, &commit)
            }
            TextModelEvent::Keysym {
                sym,
                state,
                modifiers,
                ..
            } => self.on_keysym(sym, state, modifiers, filter),
            TextModelEvent::ModifiersMap { map } => {
                self.modifiers_map = parse_modifiers_map(&map);
                debug!("text_model modifiers map: {:?}", self.modifiers_map);
            }
            other => trace!("text_model event ignored: {:?}", other),
        }
    }

    fn on_commit_string(&self, text: &str) {
        match self.last_active_window {
            Some(window) => self.converter.commit(window, text),
            None => self.missing_window("commit"),
        }
    }

    fn on_preedit_string(&self, text: &str, commit: &str) {
        match self.last_active_window {
            Some(window) => self.converter.preedit_changed(window, text, commit),
            None => self.missing_window("preedit"),
        }
    }

    fn on_keysym(&self, sym: u32, state: u32, modifiers: u32, filter: &dyn KeyNotifyFilter) {
        let kind = match PressState::from_raw(state) {
            PressState::Pressed => EventType::KeyPressed,
            PressState::Released => EventType::KeyReleased,
        };

        // Already delivered by the keyboard path: skip the duplicate send
        if filter.should_ignore_key_notify(sym, kind.is_press()) {
            trace!("keysym {:#x} already handled", sym);
            return;
        }

        let code = match sym {
            keysyms::KEY_KP_Enter | keysyms::KEY_Return | keysyms::KEY_ISO_Enter => {
                KeyboardCode::ACTION_KEY_RETURN
            }
            keysyms::KEY_BackSpace => KeyboardCode::ACTION_KEY_BACK,
            keysyms::KEY_Left | keysyms::KEY_KP_Left => KeyboardCode::ACTION_KEY_LEFT,
            keysyms::KEY_Right | keysyms::KEY_KP_Right => KeyboardCode::ACTION_KEY_RIGHT,
            _ => {
                trace!("keysym {:#x} dropped", sym);
                return;
            }
        };
        self.converter
            .key_notify(kind, code, self.translate_modifiers(modifiers));
    }

    /// Map text_model modifier bits onto the normalized set
    ///
    /// Bits without a known name (or before any map arrived) are dropped.
    fn translate_modifiers(&self, bits: u32) -> Modifiers {
        self.modifiers_map
            .iter()
            .enumerate()
            .take(u32::BITS as usize)
            .filter(|(i, _)| bits & (1 << i) != 0)
            .fold(Modifiers::empty(), |acc, (_, m)| acc | *m)
    }

    fn missing_window(&self, what: &str) {
        match self.missing_window {
            MissingWindowPolicy::Abort => {
                panic!("text_model {} arrived with no active window", what)
            }
            MissingWindowPolicy::Ignore => {
                warn!("text_model {} arrived with no active window, dropped", what)
            }
        }
    }
}

/// Split a NUL-separated modifier name list, one entry per bit
fn parse_modifiers_map(map: &[u8]) -> Vec<Modifiers> {
    map.split(|&b| b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| match std::str::from_utf8(name) {
            Ok(XKB_MOD_NAME_SHIFT) => Modifiers::SHIFT,
            Ok(XKB_MOD_NAME_CONTROL) => Modifiers::CONTROL,
            Ok(XKB_MOD_NAME_ALT) | Ok("Alt") => Modifiers::ALT,
            _ => Modifiers::empty(),
        })
        .collect()
}

impl<F: TextModelFactory> Drop for TextInput<F> {
    fn drop(&mut self) {
        if self.text_model.take().is_some() {
            debug!("Text model destroyed");
        }
    }
}
