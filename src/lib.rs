//=========================================================================
// Aetheric Arcade: Library Root
//
// A single-threaded arcade game loop: input dispatch, render ordering,
// countdown timers and per-pair collision callbacks.
//
// Responsibilities:
// - Expose the engine facade (`Engine`, `EngineBuilder`)
// - Expose the backends (`WinitBackend` for desktop, `HeadlessBackend`
//   for tests and tooling)
// - Keep the platform internals private
//
// Typical usage:
// ```no_run
// use aetheric_arcade::prelude::*;
//
// fn main() -> Result<(), EngineError> {
//     let mut engine = EngineBuilder::new(WinitBackend::new())
//         .with_title("Pong")
//         .with_screen(640, 480)
//         .with_frame_cap(60.0)
//         .build()?;
//
//     engine.on_key_pressed(KeyCode::Escape, |stage| stage.quit());
//     engine.start(|_stage| {})
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the backend-independent systems (input, stage, objects,
// backend contract). Applications mostly go through `Engine` and the
// prelude.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, EngineError};
pub use platform::{DrawCommand, EventInjector, Framebuffer, HeadlessBackend};

#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use platform::{Presenter, WgpuPresenter, WinitBackend};
