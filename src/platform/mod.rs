//=========================================================================
// Platform Subsystem
//
// Concrete implementations of the `Backend` contract.
//
// Architecture:
// ```text
//                    Backend (core::platform_bridge)
//                   ┌────────────┴─────────────┐
//            WinitBackend                 HeadlessBackend
//   ┌──────────────────────────┐   ┌───────────────────────────┐
//   │ Winit window (pumped)    │   │ EventInjector ─► channel  │
//   │  ↓                       │   │ simulated clock           │
//   │ InputProcessor           │   │ recorded DrawCommands     │
//   │  ↓                       │   │ fake image ids            │
//   │ channel ─► poll_events() │   └───────────────────────────┘
//   │ Framebuffer ─► Presenter │
//   │   (WgpuPresenter default)│
//   └──────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Pumped, not run**: the engine owns the frame loop, so the Winit
//   event loop is pumped with a zero timeout once per frame
// - **Sticky modifiers**: modifier state persists across events until
//   explicitly changed
// - **Repeats filtered**: a held key yields one KeyDown; its text repeats
//
//=========================================================================

//=== Submodules ==========================================================

mod framebuffer;
mod headless;
mod input_processor;

#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
mod wgpu_presenter;
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
mod window;

//=== Public API ==========================================================

pub use framebuffer::Framebuffer;
pub use headless::{DrawCommand, EventInjector, HeadlessBackend};

#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use wgpu_presenter::WgpuPresenter;
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use window::{Presenter, WinitBackend};
