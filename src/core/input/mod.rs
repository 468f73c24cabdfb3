//=========================================================================
// Input System
//=========================================================================
//
// Input event types, held-key tracking, and handler dispatch.
//
// Architecture:
//   Backend → InputEvent → Dispatcher → handlers(&mut Stage)
//                              └──────► KeyState (held keys)
//
//=========================================================================

//=== Module Declarations =================================================

pub mod dispatcher;
pub mod event;
mod key_state;

//=== Public API ==========================================================

pub use dispatcher::{Dispatcher, KeyHandler, KeyTrigger, PointerHandler};
pub use event::{EventKind, InputEvent, KeyCode, Modifiers, MouseButton, MouseEventKind};
pub use key_state::KeyState;
