//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_arcade::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::engine::{Engine, EngineBuilder, EngineError};
pub use crate::core::TickControl;

// Backends
pub use crate::core::platform_bridge::{Backend, Canvas, ImageId, PlatformError, Rgba, Screen};
pub use crate::platform::{EventInjector, HeadlessBackend};
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use crate::platform::{Presenter, WgpuPresenter, WinitBackend};

// Input
pub use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton, MouseEventKind};

// Stage & objects
pub use crate::core::object::{GameObject, InputBox, ObjectRef, Rect, Sprite};
pub use crate::core::stage::{Stage, StageError, Timer, TimerHandle};
