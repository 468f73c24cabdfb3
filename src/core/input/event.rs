//=========================================================================
// Input Event Types
//
// Defines the engine's representation of low-level input events.
//
// This module abstracts away platform-specific input (e.g. Winit) into
// a unified format consumed by the dispatcher and by input boxes.
//
// Responsibilities:
// - Represent keyboard, mouse, text and quit events in a portable way
// - Classify events into `EventKind` tags used as registry keys
// - Map user-facing pointer registrations (`Move`, `Click`) onto kinds
//
// Event Flow:
// ```text
// Backend (Winit / Headless)
//         ↓
//    InputEvent (this module)
//         ↓
//    Dispatcher ──► key / pointer handlers
//         ↓
//    InputBoxes (every event, self-filtering)
// ```
//
//=========================================================================

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// Text produced by a key press arrives separately as
/// [`InputEvent::TextInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    //--- Modifier Keys ----------------------------------------------------

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    /// Fallback for keys not explicitly mapped by the backend.
    Unidentified,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt) at the time of an event.
///
/// Left and right variants are not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };

    /// Shift only.
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };

    /// Ctrl only.
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };

    /// Alt only.
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };

    /// Returns `true` if no modifier is held.
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt)
    }
}

//=== EventKind ===========================================================

/// Payload-free tag of an [`InputEvent`].
///
/// Used as the registry key for pointer handlers, so that handlers are
/// looked up by *what happened* rather than by event data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Quit,
    KeyDown,
    KeyUp,
    MouseButtonDown,
    MouseButtonUp,
    MouseMotion,
    TextInput,
    Unidentified,
}

//=== MouseEventKind ======================================================

/// User-facing pointer registration kinds.
///
/// `Move` and `Click` map transparently onto the underlying
/// [`EventKind::MouseMotion`] and [`EventKind::MouseButtonDown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Move,
    Click,
}

impl MouseEventKind {
    /// Returns the event kind this registration listens to.
    pub fn event_kind(self) -> EventKind {
        match self {
            Self::Move => EventKind::MouseMotion,
            Self::Click => EventKind::MouseButtonDown,
        }
    }
}

impl From<MouseEventKind> for EventKind {
    fn from(kind: MouseEventKind) -> Self {
        kind.event_kind()
    }
}

//=== InputEvent ==========================================================

/// Low-level input event produced by a backend.
///
/// # Event Types
///
/// - **Quit**: the window was closed or the OS asked the app to exit
/// - **KeyDown/KeyUp**: physical key transitions (auto-repeat is filtered
///   by the backend, so one KeyDown means one physical press)
/// - **MouseButtonDown/MouseButtonUp**: button transitions
/// - **MouseMoved**: cursor position in screen pixels (top-left origin)
/// - **TextInput**: characters produced by typing, for input boxes
/// - **Unidentified**: anything the backend could not classify
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Quit,

    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },

    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },

    MouseButtonDown {
        button: MouseButton,
        modifiers: Modifiers,
    },

    MouseButtonUp {
        button: MouseButton,
        modifiers: Modifiers,
    },

    MouseMoved { x: f32, y: f32 },

    TextInput(String),

    Unidentified,
}

impl InputEvent {
    /// Convenience constructor for an unmodified key press.
    pub fn key_down(key: KeyCode) -> Self {
        Self::KeyDown { key, modifiers: Modifiers::NONE }
    }

    /// Convenience constructor for an unmodified key release.
    pub fn key_up(key: KeyCode) -> Self {
        Self::KeyUp { key, modifiers: Modifiers::NONE }
    }

    /// Convenience constructor for an unmodified button press.
    pub fn mouse_down(button: MouseButton) -> Self {
        Self::MouseButtonDown { button, modifiers: Modifiers::NONE }
    }

    /// Returns the payload-free kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Quit => EventKind::Quit,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::MouseButtonDown { .. } => EventKind::MouseButtonDown,
            Self::MouseButtonUp { .. } => EventKind::MouseButtonUp,
            Self::MouseMoved { .. } => EventKind::MouseMotion,
            Self::TextInput(_) => EventKind::TextInput,
            Self::Unidentified => EventKind::Unidentified,
        }
    }

    /// Returns the key for keyboard transitions, `None` otherwise.
    pub fn key(&self) -> Option<KeyCode> {
        match self {
            Self::KeyDown { key, .. } | Self::KeyUp { key, .. } => Some(*key),
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
