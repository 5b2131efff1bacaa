//! Event converter interface
//!
//! Sink for normalized events. The input device and the text-input
//! controller only know this trait; the remote dispatcher is the production
//! implementation, tests plug in recorders.

use super::{EventFlags, EventType, InputEvent, KeyboardCode, Modifiers, WindowHandle};

/// One call per normalized event kind
///
/// Every provided method builds the event immediately and hands it to
/// `dispatch`, so implementors only decide what happens to a finished event.
pub trait EventConverter {
    fn dispatch(&self, event: InputEvent);

    fn motion_notify(&self, x: f64, y: f64) {
        self.dispatch(InputEvent::Motion { x, y });
    }

    fn button_notify(
        &self,
        handle: Option<WindowHandle>,
        kind: EventType,
        flags: EventFlags,
        x: f64,
        y: f64,
    ) {
        self.dispatch(InputEvent::Button {
            handle,
            kind,
            flags,
            x,
            y,
        });
    }

    fn axis_notify(&self, x: f64, y: f64, x_offset: i32, y_offset: i32) {
        self.dispatch(InputEvent::Axis {
            x,
            y,
            x_offset,
            y_offset,
        });
    }

    fn pointer_enter(&self, handle: WindowHandle, x: f64, y: f64) {
        self.dispatch(InputEvent::PointerEnter { handle, x, y });
    }

    fn pointer_leave(&self, handle: WindowHandle, x: f64, y: f64) {
        self.dispatch(InputEvent::PointerLeave { handle, x, y });
    }

    fn key_notify(&self, kind: EventType, code: KeyboardCode, modifiers: Modifiers) {
        self.dispatch(InputEvent::Key {
            kind,
            code,
            modifiers,
        });
    }

    fn touch_notify(&self, kind: EventType, x: f64, y: f64, touch_id: i32, time_stamp: u32) {
        self.dispatch(InputEvent::Touch {
            kind,
            x,
            y,
            touch_id,
            time_stamp,
        });
    }

    fn output_size_changed(&self, width: u32, height: u32) {
        self.dispatch(InputEvent::OutputSizeChanged { width, height });
    }

    fn window_resized(&self, handle: WindowHandle, width: u32, height: u32) {
        self.dispatch(InputEvent::WindowResized {
            handle,
            width,
            height,
        });
    }

    fn close_widget(&self, handle: WindowHandle) {
        self.dispatch(InputEvent::CloseWidget { handle });
    }

    fn commit(&self, handle: WindowHandle, text: &str) {
        self.dispatch(InputEvent::Commit {
            handle,
            text: text.to_string(),
        });
    }

    fn preedit_changed(&self, handle: WindowHandle, text: &str, commit: &str) {
        self.dispatch(InputEvent::PreeditChanged {
            handle,
            text: text.to_string(),
            commit: commit.to_string(),
        });
    }

    fn preedit_start(&self) {
        self.dispatch(InputEvent::PreeditStart);
    }

    fn preedit_end(&self) {
        self.dispatch(InputEvent::PreeditEnd);
    }

    #[cfg(feature = "webos")]
    fn close_window(&self, handle: WindowHandle) {
        self.dispatch(InputEvent::CloseWindow { handle });
    }
}
