//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges a multimedia backend (winit, headless, etc.) with the engine.
//
// This module defines the contract between backend implementations and
// the frame loop, so that backends can be swapped without changing
// engine code.
//
// Components:
// - `interface`: Backend / Canvas traits, handles and error definitions
//
//=========================================================================

//=== Module Declarations =================================================

mod interface;

//=== Public API ==========================================================

pub use interface::{Backend, Canvas, ImageId, PlatformError, Rgba, Screen};
