//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit window events into engine InputEvents.
//
// Architecture:
//   Winit Events → InputProcessor → InputEvent (engine type) → channel
//
// Stateful modifier tracking: caches modifier state from ModifiersChanged
// events and applies it to all subsequent key/mouse events.
//
// Auto-repeat: OS key repeats are dropped so a held key produces exactly
// one KeyDown. Text produced by a repeat is still forwarded as TextInput,
// which is what text fields expect.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::ElementState,
    event::{KeyEvent, MouseButton as WinitMouseButton},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== InputProcessor ======================================================

/// Converts Winit events to engine InputEvents with stateful modifier tracking.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a Winit key event into zero, one or two engine events:
    /// the key transition (unless it is an auto-repeat) followed by any
    /// text the press produced.
    pub(crate) fn process_key_event(&self, key_event: &KeyEvent) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(2);

        if let Some(event) =
            self.process_key(key_event.physical_key, key_event.state, key_event.repeat)
        {
            events.push(event);
        }

        if key_event.state == ElementState::Pressed {
            if let Some(event) = self.process_text(key_event.text.as_deref()) {
                events.push(event);
            }
        }

        events
    }

    /// Converts a physical key transition. Repeats become `None`; keys
    /// without an engine mapping become [`InputEvent::Unidentified`].
    pub(crate) fn process_key(
        &self,
        physical_key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    ) -> Option<InputEvent> {
        if repeat {
            return None;
        }

        let key_code = match physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            PhysicalKey::Unidentified(_) => KeyCode::Unidentified,
        };

        if key_code == KeyCode::Unidentified {
            return Some(InputEvent::Unidentified);
        }

        Some(self.create_key_input_event(key_code, state))
    }

    /// Wraps produced text, dropping empty strings and control characters
    /// (Backspace and Enter arrive as keys already).
    pub(crate) fn process_text(&self, text: Option<&str>) -> Option<InputEvent> {
        let text = text?;
        if text.is_empty() || text.chars().all(char::is_control) {
            return None;
        }
        Some(InputEvent::TextInput(text.to_owned()))
    }

    /// Converts Winit mouse button event to InputEvent (with modifiers).
    pub(crate) fn process_mouse_button(
        &self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> InputEvent {
        let mouse_button = MouseButton::from(button);

        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown {
                button: mouse_button,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::MouseButtonUp {
                button: mouse_button,
                modifiers: self.current_modifiers,
            },
        }
    }

    /// Creates a mouse move event (window space, no modifiers).
    pub(crate) fn process_mouse_move(&self, x: f32, y: f32) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }

    //--- Internal Helpers -------------------------------------------------

    fn create_key_input_event(&self, key: KeyCode, state: ElementState) -> InputEvent {
        match state {
            ElementState::Pressed => InputEvent::KeyDown {
                key,
                modifiers: self.current_modifiers,
            },
            ElementState::Released => InputEvent::KeyUp {
                key,
                modifiers: self.current_modifiers,
            },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Maps A-Z, 0-9, arrows, editing and modifier keys. Anything else
/// (function keys, numpad, media keys) becomes `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            Space => KeyCode::Space,
            Enter | NumpadEnter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            ShiftLeft => KeyCode::ShiftLeft,
            ShiftRight => KeyCode::ShiftRight,
            ControlLeft => KeyCode::ControlLeft,
            ControlRight => KeyCode::ControlRight,
            AltLeft => KeyCode::AltLeft,
            AltRight => KeyCode::AltRight,

            _ => KeyCode::Unidentified,
        }
    }
}

/// Back/Forward/Other collapse into `Other`.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    fn modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    fn code(key: WinitKeyCode) -> PhysicalKey {
        PhysicalKey::Code(key)
    }

    //=====================================================================
    // Keys
    //=====================================================================

    #[test]
    fn key_press_carries_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(modifiers(false, true, false));

        let event = processor.process_key(code(WinitKeyCode::KeyS), ElementState::Pressed, false);

        assert_eq!(
            event,
            Some(InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL })
        );
    }

    #[test]
    fn key_release_becomes_key_up() {
        let processor = InputProcessor::new();

        let event = processor.process_key(code(WinitKeyCode::KeyA), ElementState::Released, false);

        assert_eq!(event, Some(InputEvent::key_up(KeyCode::KeyA)));
    }

    #[test]
    fn auto_repeat_is_dropped() {
        let processor = InputProcessor::new();

        let event = processor.process_key(code(WinitKeyCode::Space), ElementState::Pressed, true);

        assert_eq!(event, None);
    }

    #[test]
    fn unmapped_keys_become_unidentified_events() {
        let processor = InputProcessor::new();

        let function_key = processor.process_key(code(WinitKeyCode::F13), ElementState::Pressed, false);
        let native = processor.process_key(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            ElementState::Pressed,
            false,
        );

        assert_eq!(function_key, Some(InputEvent::Unidentified));
        assert_eq!(native, Some(InputEvent::Unidentified));
    }

    #[test]
    fn keycode_conversion_covers_editing_and_modifier_keys() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyZ), KeyCode::KeyZ);
        assert_eq!(KeyCode::from(WinitKeyCode::NumpadEnter), KeyCode::Enter);
        assert_eq!(KeyCode::from(WinitKeyCode::Backspace), KeyCode::Backspace);
        assert_eq!(KeyCode::from(WinitKeyCode::ShiftRight), KeyCode::ShiftRight);
        assert_eq!(KeyCode::from(WinitKeyCode::AltLeft), KeyCode::AltLeft);
    }

    //=====================================================================
    // Text
    //=====================================================================

    #[test]
    fn printable_text_is_forwarded() {
        let processor = InputProcessor::new();

        assert_eq!(
            processor.process_text(Some("é")),
            Some(InputEvent::TextInput("é".into()))
        );
    }

    #[test]
    fn control_text_and_empty_text_are_dropped() {
        let processor = InputProcessor::new();

        assert_eq!(processor.process_text(Some("\u{8}")), None);
        assert_eq!(processor.process_text(Some("\r")), None);
        assert_eq!(processor.process_text(Some("")), None);
        assert_eq!(processor.process_text(None), None);
    }

    //=====================================================================
    // Mouse & Modifiers
    //=====================================================================

    #[test]
    fn mouse_button_has_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(modifiers(false, false, true));

        let event = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);

        assert_eq!(
            event,
            InputEvent::MouseButtonDown { button: MouseButton::Left, modifiers: Modifiers::ALT }
        );
    }

    #[test]
    fn mouse_move_keeps_coordinates() {
        let processor = InputProcessor::new();

        assert_eq!(
            processor.process_mouse_move(123.5, 456.75),
            InputEvent::MouseMoved { x: 123.5, y: 456.75 }
        );
    }

    #[test]
    fn modifiers_persist_across_events() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(modifiers(true, false, false));
        assert_eq!(processor.current_modifiers(), Modifiers::SHIFT);

        let click = processor.process_mouse_button(WinitMouseButton::Right, ElementState::Released);
        let key = processor.process_key(code(WinitKeyCode::Space), ElementState::Pressed, false);

        assert!(matches!(click, InputEvent::MouseButtonUp { modifiers, .. } if modifiers.shift));
        assert!(matches!(key, Some(InputEvent::KeyDown { modifiers, .. }) if modifiers.shift));
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(MouseButton::from(WinitMouseButton::Middle), MouseButton::Middle);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }
}
