//! Window change notifications
//!
//! Window-management code learns about focus, close, resize and IME text
//! through `WindowChangeObserver`. Observers are notification sinks only:
//! nothing they do feeds back into the emitting side.
//!
//! `WindowEventRouter` sits on the receiving end of the channel and turns
//! delivered messages into observer calls.

use log::{debug, trace};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::dispatcher::{InputMessage, MessageSender, SendError};
use super::{EventType, InputEvent, WindowHandle};

/// Window state change notifications
///
/// Every method has an empty default so implementors only override what
/// they care about.
pub trait WindowChangeObserver {
    /// Pointer pressed a button inside the window
    fn on_window_focused(&self, _handle: WindowHandle) {}
    /// Pointer entered the window
    fn on_window_enter(&self, _handle: WindowHandle) {}
    /// Pointer left the window
    fn on_window_leave(&self, _handle: WindowHandle) {}
    fn on_window_close(&self, _handle: WindowHandle) {}
    /// Window resized by the server
    fn on_window_resized(&self, _handle: WindowHandle, _width: u32, _height: u32) {}
    fn on_preedit_changed(&self, _handle: WindowHandle, _text: &str, _commit: &str) {}
    fn on_commit(&self, _handle: WindowHandle, _text: &str) {}
    /// Close requested by the host shell
    #[cfg(feature = "webos")]
    fn on_webos_window_close(&self, _handle: WindowHandle) {}
}

/// Runtime-mutable set of observers
///
/// Holds weak references; an observer dropped by its owner simply stops
/// receiving calls. Adding or removing observers from inside a notification
/// takes effect from the next notification on.
#[derive(Default)]
pub struct ObserverList {
    observers: RefCell<Vec<Weak<dyn WindowChangeObserver>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: &Rc<dyn WindowChangeObserver>) {
        let weak = Rc::downgrade(observer);
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| o.ptr_eq(&weak)) {
            observers.push(weak);
        }
    }

    pub fn remove_observer(&self, observer: &Rc<dyn WindowChangeObserver>) {
        let weak = Rc::downgrade(observer);
        self.observers.borrow_mut().retain(|o| !o.ptr_eq(&weak));
    }

    /// Number of live observers
    pub fn len(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call `f` on every live observer
    pub fn notify(&self, f: impl Fn(&dyn WindowChangeObserver)) {
        // Snapshot first: observers may add/remove during the callback.
        let live: Vec<Rc<dyn WindowChangeObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in &live {
            f(observer.as_ref());
        }
    }
}

/// Consumer-side fan-out of delivered messages to observers
pub struct WindowEventRouter {
    observers: Rc<ObserverList>,
    /// Window under the pointer, from enter/leave messages
    pointer_window: Cell<Option<WindowHandle>>,
}

impl WindowEventRouter {
    pub fn new(observers: Rc<ObserverList>) -> Self {
        Self {
            observers,
            pointer_window: Cell::new(None),
        }
    }

    pub fn observers(&self) -> &Rc<ObserverList> {
        &self.observers
    }

    /// Route one event to the observers
    ///
    /// Events without a window-level meaning (motion, axis, key, touch,
    /// output size, preedit start/end) produce no notification.
    pub fn route(&self, event: &InputEvent) {
        match event {
            InputEvent::Button {
                handle,
                kind: EventType::MousePressed,
                ..
            } => {
                if let Some(handle) = handle.or(self.pointer_window.get()) {
                    self.observers.notify(|o| o.on_window_focused(handle));
                }
            }
            InputEvent::PointerEnter { handle, .. } => {
                self.pointer_window.set(Some(*handle));
                self.observers.notify(|o| o.on_window_enter(*handle));
            }
            InputEvent::PointerLeave { handle, .. } => {
                if self.pointer_window.get() == Some(*handle) {
                    self.pointer_window.set(None);
                }
                self.observers.notify(|o| o.on_window_leave(*handle));
            }
            InputEvent::CloseWidget { handle } => {
                if self.pointer_window.get() == Some(*handle) {
                    self.pointer_window.set(None);
                }
                self.observers.notify(|o| o.on_window_close(*handle));
            }
            InputEvent::WindowResized {
                handle,
                width,
                height,
            } => {
                self.observers
                    .notify(|o| o.on_window_resized(*handle, *width, *height));
            }
            InputEvent::Commit { handle, text } => {
                self.observers.notify(|o| o.on_commit(*handle, text));
            }
            InputEvent::PreeditChanged {
                handle,
                text,
                commit,
            } => {
                self.observers
                    .notify(|o| o.on_preedit_changed(*handle, text, commit));
            }
            #[cfg(feature = "webos")]
            InputEvent::CloseWindow { handle } => {
                self.observers.notify(|o| o.on_webos_window_close(*handle));
            }
            other => trace!("No observer notification for {}", other.name()),
        }
    }
}

impl MessageSender for WindowEventRouter {
    fn send(&mut self, message: InputMessage) -> Result<(), SendError> {
        debug!("Route #{} {}", message.sequence, message.event.name());
        self.route(&message.event);
        Ok(())
    }
}
