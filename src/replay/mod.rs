//! Scripted replay
//!
//! Feeds a TOML script of raw seat / text-model / shell-surface events
//! through an `InputDevice`, delivers the resulting messages through the
//! dispatcher and routes them to a logging observer. Lets the whole
//! pipeline run without a display server.
//!
//! ```toml
//! [[window]]
//! handle = 1
//! surface = 100
//!
//! [[step]]
//! kind = "capabilities"
//! pointer = true
//! keyboard = true
//!
//! [[step]]
//! kind = "key"
//! key = 28
//! pressed = true
//! ```

mod script;

pub use script::{Script, Step, WindowDecl};

use anyhow::{Context, Result};
use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::KEYMAP_FORMAT_XKB_V1;
use crate::events::{
    EventConverter, InputMessage, MessageSender, ObserverList, RemoteEventDispatcher, SendError,
    WindowChangeObserver, WindowEventRouter, WindowHandle,
};
use crate::input::{
    Capability, Fixed, InputDevice, KeyboardEvent, PointerEvent, SeatEvent, SeatId,
    SeatProtocol, SurfaceId, TextModel, TextModelEvent, TextModelFactory, WindowRegistry,
};
use crate::shell::{handle_shell_surface_event, ShellSurfaceEvent};

// ============================================================================
// Scripted collaborators
// ============================================================================

/// Protocol object stand-in; logs its destruction
pub struct ScriptedObject(&'static str);

impl Drop for ScriptedObject {
    fn drop(&mut self) {
        debug!("{} destroyed", self.0);
    }
}

pub struct ScriptedSeat;

impl SeatProtocol for ScriptedSeat {
    type Pointer = ScriptedObject;
    type Keyboard = ScriptedObject;

    fn get_pointer(&mut self) -> ScriptedObject {
        debug!("pointer created");
        ScriptedObject("pointer")
    }

    fn get_keyboard(&mut self) -> ScriptedObject {
        debug!("keyboard created");
        ScriptedObject("keyboard")
    }
}

/// Window table declared by the script
#[derive(Default)]
pub struct ScriptedRegistry {
    windows: RefCell<HashMap<WindowHandle, SurfaceId>>,
}

impl ScriptedRegistry {
    pub fn insert(&self, window: WindowHandle, surface: SurfaceId) {
        self.windows.borrow_mut().insert(window, surface);
    }

    /// Forget a window locally; the server may still send events for it
    pub fn destroy(&self, window: WindowHandle) -> bool {
        self.windows.borrow_mut().remove(&window).is_some()
    }
}

impl WindowRegistry for ScriptedRegistry {
    fn window_for_surface(&self, surface: SurfaceId) -> Option<WindowHandle> {
        self.windows
            .borrow()
            .iter()
            .find(|(_, s)| **s == surface)
            .map(|(w, _)| *w)
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        self.windows.borrow().contains_key(&window)
    }

    fn surface_for_window(&self, window: WindowHandle) -> Option<SurfaceId> {
        self.windows.borrow().get(&window).copied()
    }
}

pub struct ScriptedTextModel;

impl TextModel for ScriptedTextModel {
    fn activate(&mut self, serial: u32, seat: SeatId, surface: SurfaceId) {
        info!("text_model.activate(serial={}, {:?}, {:?})", serial, seat, surface);
    }

    fn deactivate(&mut self, seat: SeatId) {
        info!("text_model.deactivate({:?})", seat);
    }
}

impl Drop for ScriptedTextModel {
    fn drop(&mut self) {
        debug!("text_model destroyed");
    }
}

pub struct ScriptedTextModelFactory;

impl TextModelFactory for ScriptedTextModelFactory {
    type Model = ScriptedTextModel;

    fn create_text_model(&mut self) -> ScriptedTextModel {
        debug!("text_model created");
        ScriptedTextModel
    }
}

// ============================================================================
// Consumer side
// ============================================================================

/// Observer that records every notification as a line of text
#[derive(Default)]
pub struct LoggingObserver {
    lines: RefCell<Vec<String>>,
}

impl LoggingObserver {
    fn record(&self, line: String) {
        info!("observer: {}", line);
        self.lines.borrow_mut().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl WindowChangeObserver for LoggingObserver {
    fn on_window_focused(&self, handle: WindowHandle) {
        self.record(format!("focused {}", handle));
    }
    fn on_window_enter(&self, handle: WindowHandle) {
        self.record(format!("enter {}", handle));
    }
    fn on_window_leave(&self, handle: WindowHandle) {
        self.record(format!("leave {}", handle));
    }
    fn on_window_close(&self, handle: WindowHandle) {
        self.record(format!("close {}", handle));
    }
    fn on_window_resized(&self, handle: WindowHandle, width: u32, height: u32) {
        self.record(format!("resized {} {}x{}", handle, width, height));
    }
    fn on_preedit_changed(&self, handle: WindowHandle, text: &str, commit: &str) {
        self.record(format!("preedit {} {:?} {:?}", handle, text, commit));
    }
    fn on_commit(&self, handle: WindowHandle, text: &str) {
        self.record(format!("commit {} {:?}", handle, text));
    }
    #[cfg(feature = "webos")]
    fn on_webos_window_close(&self, handle: WindowHandle) {
        self.record(format!("shell close {}", handle));
    }
}

/// Outbound endpoint: keep a copy of each message, then route it
struct RecordingSender {
    router: WindowEventRouter,
    messages: Vec<InputMessage>,
}

impl MessageSender for RecordingSender {
    fn send(&mut self, message: InputMessage) -> Result<(), SendError> {
        self.messages.push(message.clone());
        self.router.send(message)
    }
}

/// Outcome of a replay
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Messages in delivery order
    pub messages: Vec<InputMessage>,
    /// Observer notifications in order
    pub notifications: Vec<String>,
}

// ============================================================================
// Runner
// ============================================================================

/// Replay `script`; relative keymap paths resolve against `base_dir`
pub fn run(script: &Script, base_dir: &Path, config: &Config) -> Result<ReplayReport> {
    let registry = Rc::new(ScriptedRegistry::default());
    for decl in &script.windows {
        registry.insert(WindowHandle(decl.handle), SurfaceId(decl.surface));
    }

    let dispatcher = Arc::new(RemoteEventDispatcher::new(&config.dispatch));
    let converter: Arc<dyn EventConverter> = dispatcher.clone();
    let mut device = InputDevice::new(
        ScriptedSeat,
        SeatId(script.seat),
        registry.clone(),
        converter.clone(),
        Some(ScriptedTextModelFactory),
        config,
    );

    let observers = Rc::new(ObserverList::new());
    let observer = Rc::new(LoggingObserver::default());
    let observer_dyn: Rc<dyn WindowChangeObserver> = observer.clone();
    observers.add_observer(&observer_dyn);
    let mut sender = Some(RecordingSender {
        router: WindowEventRouter::new(observers),
        messages: Vec::new(),
    });

    let binds_explicitly = script.steps.iter().any(|s| matches!(s, Step::Bind));
    let mut pump = None;
    if !binds_explicitly {
        pump = sender
            .take()
            .and_then(|s| dispatcher.channel_established(s));
    }

    let mut serial = 0u32;
    for (index, step) in script.steps.iter().enumerate() {
        debug!("step {}: {:?}", index, step);
        serial += 1;
        match step {
            Step::Bind => {
                if let Some(s) = sender.take() {
                    pump = dispatcher.channel_established(s);
                }
            }
            Step::Capabilities { pointer, keyboard } => {
                let mut caps = Capability::empty();
                caps.set(Capability::POINTER, *pointer);
                caps.set(Capability::KEYBOARD, *keyboard);
                device.handle_seat_event(SeatEvent::Capabilities {
                    capabilities: caps.bits(),
                });
            }
            Step::Keymap { path } => {
                let path = base_dir.join(path);
                let (fd, size) = open_keymap(&path)?;
                device.handle_keyboard_event(KeyboardEvent::Keymap {
                    format: KEYMAP_FORMAT_XKB_V1,
                    fd,
                    size,
                });
            }
            Step::PointerEnter { surface, x, y } => {
                device.handle_pointer_event(PointerEvent::Enter {
                    serial,
                    surface: SurfaceId(*surface),
                    surface_x: Fixed::from_f64(*x),
                    surface_y: Fixed::from_f64(*y),
                });
            }
            Step::PointerLeave { surface } => {
                device.handle_pointer_event(PointerEvent::Leave {
                    serial,
                    surface: SurfaceId(*surface),
                });
            }
            Step::Motion { x, y } => {
                device.handle_pointer_event(PointerEvent::Motion {
                    time: serial,
                    surface_x: Fixed::from_f64(*x),
                    surface_y: Fixed::from_f64(*y),
                });
            }
            Step::Button { button, pressed } => {
                device.handle_pointer_event(PointerEvent::Button {
                    serial,
                    time: serial,
                    button: *button,
                    state: u32::from(*pressed),
                });
            }
            Step::Axis { axis, value } => {
                device.handle_pointer_event(PointerEvent::Axis {
                    time: serial,
                    axis: *axis,
                    value: Fixed::from_f64(*value),
                });
            }
            Step::KeyboardEnter { surface } => {
                device.handle_keyboard_event(KeyboardEvent::Enter {
                    serial,
                    surface: SurfaceId(*surface),
                    keys: Vec::new(),
                });
            }
            Step::KeyboardLeave { surface } => {
                device.handle_keyboard_event(KeyboardEvent::Leave {
                    serial,
                    surface: SurfaceId(*surface),
                });
            }
            Step::Key { key, pressed } => {
                device.handle_keyboard_event(KeyboardEvent::Key {
                    serial,
                    time: serial,
                    key: *key,
                    state: u32::from(*pressed),
                });
            }
            Step::Modifiers {
                depressed,
                latched,
                locked,
                group,
            } => {
                device.handle_keyboard_event(KeyboardEvent::Modifiers {
                    serial,
                    mods_depressed: *depressed,
                    mods_latched: *latched,
                    mods_locked: *locked,
                    group: *group,
                });
            }
            Step::SetActiveWindow { window } => {
                device.set_active_window(window.map(WindowHandle));
            }
            Step::ResetIme => device.reset_ime(),
            Step::ShowInputPanel => device.show_input_panel(),
            Step::HideInputPanel => device.hide_input_panel(),
            Step::Commit { text } => {
                device.handle_text_model_event(TextModelEvent::CommitString {
                    serial,
                    text: text.clone(),
                });
            }
            Step::Preedit { text, commit } => {
                device.handle_text_model_event(TextModelEvent::PreeditString {
                    serial,
                    text: text.clone(),
                    commit: commit.clone(),
                });
            }
            Step::Keysym {
                sym,
                pressed,
                modifiers,
            } => {
                device.handle_text_model_event(TextModelEvent::Keysym {
                    serial,
                    time: serial,
                    sym: *sym,
                    state: u32::from(*pressed),
                    modifiers: *modifiers,
                });
            }
            Step::Resize {
                window,
                width,
                height,
            } => converter.window_resized(WindowHandle(*window), *width, *height),
            Step::ShellClose { window } => {
                handle_shell_surface_event(
                    WindowHandle(*window),
                    ShellSurfaceEvent::Close,
                    converter.as_ref(),
                );
            }
            Step::DestroyWindow { window } => {
                if !registry.destroy(WindowHandle(*window)) {
                    debug!("window#{} was not registered", window);
                }
            }
        }

        if let Some(pump) = pump.as_mut() {
            pump.drain();
        }
    }

    let messages = match pump {
        Some(mut pump) => {
            pump.drain();
            info!("Replay delivered {} messages", pump.delivered());
            std::mem::take(&mut pump.sender_mut().messages)
        }
        None => Vec::new(),
    };

    Ok(ReplayReport {
        messages,
        notifications: observer.lines(),
    })
}

/// Open a keymap file the way a compositor shares one: fd plus size
fn open_keymap(path: &Path) -> Result<(OwnedFd, u32)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open keymap: {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat keymap: {}", path.display()))?
        .len();
    let size = u32::try_from(len)
        .with_context(|| format!("Keymap too large: {}", path.display()))?;
    Ok((OwnedFd::from(file), size))
}
