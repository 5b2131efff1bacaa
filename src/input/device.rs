//! Seat input device
//!
//! One instance per seat. Owns the pointer/keyboard protocol objects, the
//! keymap engine and the text-input controller, and turns raw seat,
//! pointer, keyboard and text-model callbacks into normalized events on the
//! event converter.
//!
//! Windows are never owned here: pointer and keyboard focus are handles
//! resolved through the window registry.

use log::{debug, info, trace, warn};
use std::rc::Rc;
use std::sync::Arc;

use super::cursor::{cursor_for_component, CursorImage, WindowComponent};
use super::keycodes::{BTN_LEFT, BTN_MIDDLE, BTN_RIGHT};
use super::protocol::{
    Axis, Capability, KeyboardEvent, PointerEvent, PressState, SeatEvent, SeatId, SeatProtocol,
    TextModelEvent, TextModelFactory, WindowRegistry,
};
use super::text_input::TextInput;
use super::xkb::KeymapEngine;
use crate::config::Config;
use crate::events::{
    keyboard_code_from_keysym, EventConverter, EventFlags, EventType, WindowHandle,
};

pub struct InputDevice<S: SeatProtocol, F: TextModelFactory> {
    seat: S,
    seat_id: SeatId,
    pointer: Option<S::Pointer>,
    keyboard: Option<S::Keyboard>,
    keymap: KeymapEngine,
    text_input: TextInput<F>,
    registry: Rc<dyn WindowRegistry>,
    converter: Arc<dyn EventConverter>,

    pointer_position: (f64, f64),
    pointer_enter_serial: u32,
    last_serial: u32,
    current_pointer_image: CursorImage,
    pointer_focus: Option<WindowHandle>,
    keyboard_focus: Option<WindowHandle>,
    wheel_delta: i32,
}

impl<S: SeatProtocol, F: TextModelFactory> InputDevice<S, F> {
    pub fn new(
        seat: S,
        seat_id: SeatId,
        registry: Rc<dyn WindowRegistry>,
        converter: Arc<dyn EventConverter>,
        text_model_factory: Option<F>,
        config: &Config,
    ) -> Self {
        let text_input = TextInput::new(
            text_model_factory,
            registry.clone(),
            converter.clone(),
            &config.ime,
        );
        Self {
            seat,
            seat_id,
            pointer: None,
            keyboard: None,
            keymap: KeymapEngine::new(),
            text_input,
            registry,
            converter,
            pointer_position: (0.0, 0.0),
            pointer_enter_serial: 0,
            last_serial: 0,
            current_pointer_image: CursorImage::Unset,
            pointer_focus: None,
            keyboard_focus: None,
            wheel_delta: config.pointer.wheel_delta,
        }
    }

    // ========================================================================
    // wl_seat
    // ========================================================================

    pub fn handle_seat_event(&mut self, event: SeatEvent) {
        match event {
            SeatEvent::Capabilities { capabilities } => {
                self.update_capabilities(Capability::from_bits_truncate(capabilities))
            }
        }
    }

    fn update_capabilities(&mut self, caps: Capability) {
        if caps.contains(Capability::POINTER) && self.pointer.is_none() {
            info!("Seat {:?}: pointer available", self.seat_id);
            self.pointer = Some(self.seat.get_pointer());
        } else if !caps.contains(Capability::POINTER) && self.pointer.is_some() {
            info!("Seat {:?}: pointer removed", self.seat_id);
            self.pointer = None;
            self.pointer_focus = None;
        }

        if caps.contains(Capability::KEYBOARD) && self.keyboard.is_none() {
            info!("Seat {:?}: keyboard available", self.seat_id);
            self.keyboard = Some(self.seat.get_keyboard());
        } else if !caps.contains(Capability::KEYBOARD) && self.keyboard.is_some() {
            info!("Seat {:?}: keyboard removed", self.seat_id);
            self.keyboard = None;
            self.keyboard_focus = None;
            self.keymap.clear();
        }
    }

    // ========================================================================
    // wl_pointer
    // ========================================================================

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter {
                serial,
                surface,
                surface_x,
                surface_y,
            } => {
                self.last_serial = serial;
                self.pointer_enter_serial = serial;
                self.pointer_position = (surface_x.to_f64(), surface_y.to_f64());

                self.pointer_focus = self.registry.window_for_surface(surface);
                match self.pointer_focus {
                    Some(window) => {
                        let (x, y) = self.pointer_position;
                        self.converter.pointer_enter(window, x, y);
                    }
                    None => debug!("Pointer entered unknown surface {:?}", surface),
                }
            }
            PointerEvent::Leave { serial, surface } => {
                self.last_serial = serial;
                let window = self
                    .pointer_focus
                    .take()
                    .filter(|w| self.registry.is_window(*w));
                self.current_pointer_image = CursorImage::Unset;

                match window {
                    Some(window) => {
                        let (x, y) = self.pointer_position;
                        self.converter.pointer_leave(window, x, y);
                    }
                    None => debug!("Pointer left {:?} without a live window", surface),
                }
            }
            PointerEvent::Motion {
                surface_x,
                surface_y,
                ..
            } => {
                self.pointer_position = (surface_x.to_f64(), surface_y.to_f64());
                let (x, y) = self.pointer_position;
                self.converter.motion_notify(x, y);
            }
            PointerEvent::Button {
                serial,
                button,
                state,
                ..
            } => {
                self.last_serial = serial;
                let flags = match button {
                    BTN_LEFT => EventFlags::LEFT_MOUSE_BUTTON,
                    BTN_MIDDLE => EventFlags::MIDDLE_MOUSE_BUTTON,
                    BTN_RIGHT => EventFlags::RIGHT_MOUSE_BUTTON,
                    _ => EventFlags::empty(),
                };
                let kind = match PressState::from_raw(state) {
                    PressState::Pressed => EventType::MousePressed,
                    PressState::Released => EventType::MouseReleased,
                };
                let (x, y) = self.pointer_position;
                self.converter
                    .button_notify(self.pointer_focus, kind, flags, x, y);
            }
            PointerEvent::Axis { axis, value, .. } => {
                let Some(axis) = Axis::from_raw(axis) else {
                    debug!("Unknown pointer axis {}", axis);
                    return;
                };
                // Positive raw values scroll down/right; wheel offsets are the other way round
                let delta = if value.to_f64() > 0.0 {
                    -self.wheel_delta
                } else {
                    self.wheel_delta
                };
                let (x_offset, y_offset) = match axis {
                    Axis::VerticalScroll => (0, delta),
                    Axis::HorizontalScroll => (delta, 0),
                };
                let (x, y) = self.pointer_position;
                self.converter.axis_notify(x, y, x_offset, y_offset);
            }
        }
    }

    /// Pick the cursor for a hit-test component
    ///
    /// Returns the image only when it differs from the one already shown.
    pub fn update_cursor_for_component(
        &mut self,
        component: WindowComponent,
    ) -> Option<CursorImage> {
        let image = cursor_for_component(component);
        if image == self.current_pointer_image {
            return None;
        }
        self.current_pointer_image = image;
        Some(image)
    }

    // ========================================================================
    // wl_keyboard
    // ========================================================================

    pub fn handle_keyboard_event(&mut self, event: KeyboardEvent) {
        match event {
            KeyboardEvent::Keymap { format, fd, size } => {
                self.keymap.load_keymap(format, fd, size);
            }
            KeyboardEvent::Enter {
                serial, surface, ..
            } => {
                self.last_serial = serial;
                self.keyboard_focus = self.registry.window_for_surface(surface);
                if self.keyboard_focus.is_none() {
                    debug!("Keyboard entered unknown surface {:?}", surface);
                }
            }
            KeyboardEvent::Leave { serial, surface } => {
                self.last_serial = serial;
                // The compositor may announce leave for a window already destroyed here
                let Some(focus) = self
                    .keyboard_focus
                    .filter(|w| self.registry.is_window(*w))
                else {
                    debug!("Keyboard leave without a live focused window");
                    return;
                };
                if self.registry.window_for_surface(surface) != Some(focus) {
                    debug!("Keyboard leave for unfocused surface {:?}", surface);
                    return;
                }
                self.keyboard_focus = None;
            }
            KeyboardEvent::Key {
                serial, key, state, ..
            } => {
                self.last_serial = serial;
                self.on_key(key, PressState::from_raw(state));
            }
            KeyboardEvent::Modifiers {
                mods_depressed,
                mods_latched,
                mods_locked,
                group,
                ..
            } => {
                self.keymap
                    .update_modifier_mask(mods_depressed, mods_latched, mods_locked, group);
            }
        }
    }

    fn on_key(&mut self, key: u32, state: PressState) {
        let Some(sym) = self.keymap.translate_key(key) else {
            warn!("Key {} ignored: no keymap", key);
            return;
        };
        let modifiers = self.keymap.current_modifiers();
        let code = keyboard_code_from_keysym(sym);
        let kind = match state {
            PressState::Pressed => EventType::KeyPressed,
            PressState::Released => EventType::KeyReleased,
        };
        trace!("key {} -> sym {:#x} -> {:?} {:?}", key, sym, code, modifiers);

        self.converter.key_notify(kind, code, modifiers);
        self.keymap.note_key_emitted(sym, state.is_pressed());
    }

    // ========================================================================
    // Text input
    // ========================================================================

    pub fn handle_text_model_event(&mut self, event: TextModelEvent) {
        self.text_input.handle_event(event, &self.keymap);
    }

    pub fn reset_ime(&mut self) {
        self.text_input.reset_ime();
    }

    pub fn show_input_panel(&mut self) {
        self.text_input.show_input_panel(self.seat_id);
    }

    pub fn hide_input_panel(&mut self) {
        self.text_input.hide_input_panel(self.seat_id);
    }

    pub fn set_active_window(&mut self, window: Option<WindowHandle>) {
        self.text_input.set_active_window(window);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn seat_id(&self) -> SeatId {
        self.seat_id
    }

    pub fn pointer_position(&self) -> (f64, f64) {
        self.pointer_position
    }

    pub fn pointer_focus(&self) -> Option<WindowHandle> {
        self.pointer_focus
    }

    pub fn keyboard_focus(&self) -> Option<WindowHandle> {
        self.keyboard_focus
    }

    /// Latest serial from any serial-carrying callback
    pub fn last_serial(&self) -> u32 {
        self.last_serial
    }

    pub fn pointer_enter_serial(&self) -> u32 {
        self.pointer_enter_serial
    }

    pub fn current_pointer_image(&self) -> CursorImage {
        self.current_pointer_image
    }

    pub fn has_pointer(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn has_keyboard(&self) -> bool {
        self.keyboard.is_some()
    }

    pub fn keymap(&self) -> &KeymapEngine {
        &self.keymap
    }

    pub fn text_input(&self) -> &TextInput<F> {
        &self.text_input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingWindowPolicy;
    use crate::constants::KEYMAP_FORMAT_XKB_V1;
    use crate::events::{InputEvent, KeyboardCode, Modifiers};
    use crate::input::keycodes::{BTN_EXTRA, BTN_SIDE, KEY_A, KEY_ENTER};
    use crate::input::protocol::{Fixed, SurfaceId, TextModel};
    use crate::input::xkb::tests::{keymap_fd, MINIMAL_KEYMAP};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use xkbcommon::xkb::keysyms;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<InputEvent>>);

    impl EventConverter for Recorder {
        fn dispatch(&self, event: InputEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl Recorder {
        fn take(&self) -> Vec<InputEvent> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    #[derive(Default)]
    struct Windows(RefCell<HashMap<WindowHandle, SurfaceId>>);

    impl Windows {
        fn insert(&self, window: WindowHandle, surface: SurfaceId) {
            self.0.borrow_mut().insert(window, surface);
        }

        fn destroy(&self, window: WindowHandle) {
            self.0.borrow_mut().remove(&window);
        }
    }

    impl WindowRegistry for Windows {
        fn window_for_surface(&self, surface: SurfaceId) -> Option<WindowHandle> {
            self.0
                .borrow()
                .iter()
                .find(|(_, s)| **s == surface)
                .map(|(w, _)| *w)
        }
        fn is_window(&self, window: WindowHandle) -> bool {
            self.0.borrow().contains_key(&window)
        }
        fn surface_for_window(&self, window: WindowHandle) -> Option<SurfaceId> {
            self.0.borrow().get(&window).copied()
        }
    }

    #[derive(Default)]
    struct SeatCalls {
        pointers_created: u32,
        pointers_destroyed: u32,
        keyboards_created: u32,
        keyboards_destroyed: u32,
    }

    struct Pointer(Rc<RefCell<SeatCalls>>);
    impl Drop for Pointer {
        fn drop(&mut self) {
            self.0.borrow_mut().pointers_destroyed += 1;
        }
    }

    struct Keyboard(Rc<RefCell<SeatCalls>>);
    impl Drop for Keyboard {
        fn drop(&mut self) {
            self.0.borrow_mut().keyboards_destroyed += 1;
        }
    }

    struct Seat(Rc<RefCell<SeatCalls>>);

    impl SeatProtocol for Seat {
        type Pointer = Pointer;
        type Keyboard = Keyboard;

        fn get_pointer(&mut self) -> Pointer {
            self.0.borrow_mut().pointers_created += 1;
            Pointer(self.0.clone())
        }
        fn get_keyboard(&mut self) -> Keyboard {
            self.0.borrow_mut().keyboards_created += 1;
            Keyboard(self.0.clone())
        }
    }

    struct NullModel;
    impl TextModel for NullModel {
        fn activate(&mut self, _serial: u32, _seat: SeatId, _surface: SurfaceId) {}
        fn deactivate(&mut self, _seat: SeatId) {}
    }

    struct NullFactory;
    impl TextModelFactory for NullFactory {
        type Model = NullModel;
        fn create_text_model(&mut self) -> NullModel {
            NullModel
        }
    }

    const WINDOW: WindowHandle = WindowHandle(7);
    const SURFACE: SurfaceId = SurfaceId(70);

    struct Fixture {
        device: InputDevice<Seat, NullFactory>,
        seat: Rc<RefCell<SeatCalls>>,
        windows: Rc<Windows>,
        events: Arc<Recorder>,
    }

    fn fixture() -> Fixture {
        let seat = Rc::new(RefCell::new(SeatCalls::default()));
        let windows = Rc::new(Windows::default());
        windows.insert(WINDOW, SURFACE);
        let events = Arc::new(Recorder::default());
        let mut config = Config::default();
        config.ime.missing_window = MissingWindowPolicy::Ignore;
        let device = InputDevice::new(
            Seat(seat.clone()),
            SeatId(1),
            windows.clone(),
            events.clone(),
            Some(NullFactory),
            &config,
        );
        Fixture {
            device,
            seat,
            windows,
            events,
        }
    }

    fn capabilities(bits: Capability) -> SeatEvent {
        SeatEvent::Capabilities {
            capabilities: bits.bits(),
        }
    }

    fn with_keymap(f: &mut Fixture) {
        f.device
            .handle_seat_event(capabilities(Capability::POINTER | Capability::KEYBOARD));
        let (fd, size) = keymap_fd("device", MINIMAL_KEYMAP.as_bytes());
        f.device.handle_keyboard_event(KeyboardEvent::Keymap {
            format: KEYMAP_FORMAT_XKB_V1,
            fd,
            size,
        });
        assert!(f.device.keymap().has_keymap());
    }

    fn key(key: u32, state: u32) -> KeyboardEvent {
        KeyboardEvent::Key {
            serial: 30,
            time: 0,
            key,
            state,
        }
    }

    fn button(button: u32, state: u32) -> PointerEvent {
        PointerEvent::Button {
            serial: 40,
            time: 0,
            button,
            state,
        }
    }

    fn axis(axis: u32, value: f64) -> PointerEvent {
        PointerEvent::Axis {
            time: 0,
            axis,
            value: Fixed::from_f64(value),
        }
    }

    #[test]
    fn test_capabilities_create_and_destroy() {
        let mut f = fixture();
        f.device
            .handle_seat_event(capabilities(Capability::POINTER | Capability::KEYBOARD));
        assert!(f.device.has_pointer());
        assert!(f.device.has_keyboard());

        // Re-announcing held capabilities is a no-op
        f.device
            .handle_seat_event(capabilities(Capability::POINTER | Capability::KEYBOARD));
        assert_eq!(f.seat.borrow().pointers_created, 1);
        assert_eq!(f.seat.borrow().keyboards_created, 1);

        f.device.handle_seat_event(capabilities(Capability::KEYBOARD));
        assert!(!f.device.has_pointer());
        assert!(f.device.has_keyboard());
        assert_eq!(f.seat.borrow().pointers_destroyed, 1);

        f.device.handle_seat_event(capabilities(Capability::empty()));
        assert!(!f.device.has_keyboard());
        assert_eq!(f.seat.borrow().keyboards_destroyed, 1);
    }

    #[test]
    fn test_keyboard_removal_drops_keymap() {
        let mut f = fixture();
        with_keymap(&mut f);
        f.device.handle_seat_event(capabilities(Capability::POINTER));
        assert!(!f.device.keymap().has_keymap());
    }

    #[test]
    fn test_motion_converts_fixed_point() {
        let mut f = fixture();
        f.device.handle_pointer_event(PointerEvent::Motion {
            time: 0,
            surface_x: Fixed(3136),
            surface_y: Fixed(-128),
        });
        assert_eq!(f.device.pointer_position(), (12.25, -0.5));
        assert_eq!(
            f.events.take(),
            vec![InputEvent::Motion { x: 12.25, y: -0.5 }]
        );
    }

    #[test]
    fn test_button_flags() {
        let mut f = fixture();
        let known = [
            (BTN_LEFT, EventFlags::LEFT_MOUSE_BUTTON),
            (BTN_MIDDLE, EventFlags::MIDDLE_MOUSE_BUTTON),
            (BTN_RIGHT, EventFlags::RIGHT_MOUSE_BUTTON),
            (BTN_SIDE, EventFlags::empty()),
            (BTN_EXTRA, EventFlags::empty()),
            (0, EventFlags::empty()),
            (0x2ff, EventFlags::empty()),
        ];
        for (code, expected) in known {
            f.device.handle_pointer_event(button(code, 1));
            match &f.events.take()[..] {
                [InputEvent::Button { flags, kind, .. }] => {
                    assert_eq!(*flags, expected, "button {:#x}", code);
                    assert_eq!(*kind, EventType::MousePressed);
                }
                other => panic!("unexpected events {:?}", other),
            }
        }
    }

    #[test]
    fn test_button_uses_last_position_and_focus() {
        let mut f = fixture();
        f.device.handle_pointer_event(PointerEvent::Enter {
            serial: 5,
            surface: SURFACE,
            surface_x: Fixed::from_f64(10.0),
            surface_y: Fixed::from_f64(20.0),
        });
        f.events.take();

        f.device.handle_pointer_event(button(BTN_LEFT, 0));
        assert_eq!(
            f.events.take(),
            vec![InputEvent::Button {
                handle: Some(WINDOW),
                kind: EventType::MouseReleased,
                flags: EventFlags::LEFT_MOUSE_BUTTON,
                x: 10.0,
                y: 20.0,
            }]
        );
        assert_eq!(f.device.last_serial(), 40);
        assert_eq!(f.device.pointer_enter_serial(), 5);
    }

    #[test]
    fn test_axis_sign_is_inverted() {
        let mut f = fixture();
        for (raw_axis, value, expected) in [
            (0, 10.0, (0, -120)),
            (0, -10.0, (0, 120)),
            (1, 2.5, (-120, 0)),
            (1, -0.25, (120, 0)),
        ] {
            f.device.handle_pointer_event(axis(raw_axis, value));
            match &f.events.take()[..] {
                [InputEvent::Axis {
                    x_offset, y_offset, ..
                }] => assert_eq!((*x_offset, *y_offset), expected),
                other => panic!("unexpected events {:?}", other),
            }
        }

        f.device.handle_pointer_event(axis(9, 1.0));
        assert!(f.events.take().is_empty());
    }

    #[test]
    fn test_pointer_enter_leave() {
        let mut f = fixture();
        assert_eq!(
            f.device.update_cursor_for_component(WindowComponent::Client),
            Some(CursorImage::LeftPtr)
        );
        assert_eq!(
            f.device.update_cursor_for_component(WindowComponent::Caption),
            None
        );

        f.device.handle_pointer_event(PointerEvent::Enter {
            serial: 11,
            surface: SURFACE,
            surface_x: Fixed::from_f64(1.0),
            surface_y: Fixed::from_f64(2.0),
        });
        assert_eq!(f.device.pointer_focus(), Some(WINDOW));

        f.device.handle_pointer_event(PointerEvent::Leave {
            serial: 12,
            surface: SURFACE,
        });
        assert_eq!(f.device.pointer_focus(), None);
        assert_eq!(f.device.current_pointer_image(), CursorImage::Unset);
        assert_eq!(f.device.last_serial(), 12);
        assert_eq!(
            f.events.take(),
            vec![
                InputEvent::PointerEnter {
                    handle: WINDOW,
                    x: 1.0,
                    y: 2.0
                },
                InputEvent::PointerLeave {
                    handle: WINDOW,
                    x: 1.0,
                    y: 2.0
                },
            ]
        );

        // Next enter recomputes the cursor
        assert_eq!(
            f.device.update_cursor_for_component(WindowComponent::Client),
            Some(CursorImage::LeftPtr)
        );
    }

    #[test]
    fn test_pointer_leave_for_destroyed_window() {
        let mut f = fixture();
        f.device.handle_pointer_event(PointerEvent::Enter {
            serial: 1,
            surface: SURFACE,
            surface_x: Fixed(0),
            surface_y: Fixed(0),
        });
        f.events.take();
        f.windows.destroy(WINDOW);

        f.device.handle_pointer_event(PointerEvent::Leave {
            serial: 2,
            surface: SURFACE,
        });
        assert_eq!(f.device.pointer_focus(), None);
        assert!(f.events.take().is_empty());
    }

    #[test]
    fn test_keyboard_enter_then_leave() {
        let mut f = fixture();
        f.device.handle_keyboard_event(KeyboardEvent::Enter {
            serial: 1,
            surface: SURFACE,
            keys: vec![],
        });
        assert_eq!(f.device.keyboard_focus(), Some(WINDOW));

        f.device.handle_keyboard_event(KeyboardEvent::Leave {
            serial: 2,
            surface: SURFACE,
        });
        assert_eq!(f.device.keyboard_focus(), None);
    }

    #[test]
    fn test_keyboard_leave_for_unknown_window_keeps_focus() {
        let mut f = fixture();
        f.device.handle_keyboard_event(KeyboardEvent::Enter {
            serial: 1,
            surface: SURFACE,
            keys: vec![],
        });

        f.device.handle_keyboard_event(KeyboardEvent::Leave {
            serial: 2,
            surface: SurfaceId(999),
        });
        assert_eq!(f.device.keyboard_focus(), Some(WINDOW));
    }

    #[test]
    fn test_keyboard_leave_for_unfocused_window_keeps_focus() {
        let mut f = fixture();
        let other = WindowHandle(8);
        f.windows.insert(other, SurfaceId(80));
        f.device.handle_keyboard_event(KeyboardEvent::Enter {
            serial: 1,
            surface: SURFACE,
            keys: vec![],
        });

        f.device.handle_keyboard_event(KeyboardEvent::Leave {
            serial: 2,
            surface: SurfaceId(80),
        });
        assert_eq!(f.device.keyboard_focus(), Some(WINDOW));
    }

    #[test]
    fn test_keyboard_leave_after_local_destroy_is_ignored() {
        let mut f = fixture();
        f.device.handle_keyboard_event(KeyboardEvent::Enter {
            serial: 1,
            surface: SURFACE,
            keys: vec![],
        });
        f.windows.destroy(WINDOW);

        f.device.handle_keyboard_event(KeyboardEvent::Leave {
            serial: 2,
            surface: SURFACE,
        });
        assert_eq!(f.device.keyboard_focus(), Some(WINDOW));
        assert_eq!(f.device.last_serial(), 2);
    }

    #[test]
    fn test_return_key_end_to_end() {
        let mut f = fixture();
        with_keymap(&mut f);
        // Control held
        f.device.handle_keyboard_event(KeyboardEvent::Modifiers {
            serial: 3,
            mods_depressed: 1 << 2,
            mods_latched: 0,
            mods_locked: 0,
            group: 0,
        });
        assert!(f.events.take().is_empty());

        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        assert_eq!(
            f.events.take(),
            vec![InputEvent::Key {
                kind: EventType::KeyPressed,
                code: KeyboardCode::RETURN,
                modifiers: Modifiers::CONTROL,
            }]
        );
    }

    #[test]
    fn test_key_pairs_keep_order() {
        let mut f = fixture();
        with_keymap(&mut f);
        f.device.handle_keyboard_event(key(KEY_A, 1));
        f.device.handle_keyboard_event(key(KEY_A, 0));
        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        f.device.handle_keyboard_event(key(KEY_ENTER, 0));

        let kinds: Vec<_> = f
            .events
            .take()
            .into_iter()
            .map(|e| match e {
                InputEvent::Key { kind, code, .. } => (kind, code),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EventType::KeyPressed, KeyboardCode::KEY_A),
                (EventType::KeyReleased, KeyboardCode::KEY_A),
                (EventType::KeyPressed, KeyboardCode::RETURN),
                (EventType::KeyReleased, KeyboardCode::RETURN),
            ]
        );
    }

    #[test]
    fn test_key_without_keymap_is_ignored() {
        let mut f = fixture();
        f.device
            .handle_seat_event(capabilities(Capability::KEYBOARD));
        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        assert!(f.events.take().is_empty());
    }

    #[test]
    fn test_bad_keymap_format_degrades() {
        let mut f = fixture();
        f.device
            .handle_seat_event(capabilities(Capability::KEYBOARD));
        let (fd, size) = keymap_fd("device-bad", MINIMAL_KEYMAP.as_bytes());
        f.device.handle_keyboard_event(KeyboardEvent::Keymap {
            format: 7,
            fd,
            size,
        });
        assert!(!f.device.keymap().has_keymap());
        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        assert!(f.events.take().is_empty());
    }

    #[test]
    fn test_ime_keysym_not_duplicated() {
        let mut f = fixture();
        with_keymap(&mut f);
        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        f.events.take();

        let keysym = TextModelEvent::Keysym {
            serial: 0,
            time: 0,
            sym: keysyms::KEY_Return,
            state: 1,
            modifiers: 0,
        };
        // Same press already delivered by the keyboard path
        f.device.handle_text_model_event(keysym.clone());
        assert!(f.events.take().is_empty());

        // A second, genuine one goes through
        f.device.handle_text_model_event(keysym);
        assert_eq!(f.events.take().len(), 1);
    }

    fn ime_keysym(sym: u32, state: u32) -> TextModelEvent {
        TextModelEvent::Keysym {
            serial: 0,
            time: 0,
            sym,
            state,
            modifiers: 0,
        }
    }

    fn key_kinds(events: Vec<InputEvent>) -> Vec<EventType> {
        events
            .into_iter()
            .map(|e| match e {
                InputEvent::Key { kind, .. } => kind,
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_ime_echo_after_keyboard_pair_stays_balanced() {
        let mut f = fixture();
        with_keymap(&mut f);
        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        f.device.handle_keyboard_event(key(KEY_ENTER, 0));
        f.device
            .handle_text_model_event(ime_keysym(keysyms::KEY_Return, 1));
        f.device
            .handle_text_model_event(ime_keysym(keysyms::KEY_Return, 0));

        assert_eq!(
            key_kinds(f.events.take()),
            vec![EventType::KeyPressed, EventType::KeyReleased]
        );
    }

    #[test]
    fn test_ime_echo_inside_keyboard_pair_stays_balanced() {
        let mut f = fixture();
        with_keymap(&mut f);
        f.device.handle_keyboard_event(key(KEY_ENTER, 1));
        f.device
            .handle_text_model_event(ime_keysym(keysyms::KEY_Return, 1));
        f.device
            .handle_text_model_event(ime_keysym(keysyms::KEY_Return, 0));
        f.device.handle_keyboard_event(key(KEY_ENTER, 0));

        assert_eq!(
            key_kinds(f.events.take()),
            vec![EventType::KeyPressed, EventType::KeyReleased]
        );

        // Text-input-only pair afterwards is delivered whole
        f.device
            .handle_text_model_event(ime_keysym(keysyms::KEY_Return, 1));
        f.device
            .handle_text_model_event(ime_keysym(keysyms::KEY_Return, 0));
        assert_eq!(
            key_kinds(f.events.take()),
            vec![EventType::KeyPressed, EventType::KeyReleased]
        );
    }

    #[test]
    fn test_ime_requests_use_device_seat() {
        let mut f = fixture();
        f.device.set_active_window(Some(WINDOW));
        f.device.show_input_panel();
        assert!(f.device.text_input().is_visible());
        f.device.hide_input_panel();
        assert!(!f.device.text_input().is_visible());
        f.device.reset_ime();
        assert!(f.device.text_input().has_text_model());
    }
}
