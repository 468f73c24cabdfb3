//=========================================================================
// Core Systems
//
// Everything the frame loop coordinates, independent of any backend.
//
// Responsibilities:
// - `input`: event types, held-key state and handler dispatch
// - `stage`: world state (objects, input boxes, collisions, timers)
// - `object`: object contracts, rectangles and sprites
// - `platform_bridge`: the backend contract the loop drives
//
//=========================================================================

//=== Module Declarations =================================================

pub mod input;
pub mod object;
pub mod platform_bridge;
pub mod stage;

//=== TickControl =========================================================

/// Frame loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}
