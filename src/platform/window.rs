//=========================================================================
// Winit Backend
//=========================================================================
//
// Desktop backend: a Winit window pumped once per frame from the engine
// loop, with frames composed in a CPU framebuffer.
//
// Architecture:
// ```text
//  Engine::frame()
//     │
//     ├─ poll_events() ──► pump_app_events(0 ms) ──► WindowState
//     │                                               ├─ InputProcessor
//     │                                               └─ Sender<InputEvent>
//     │        ◄── try_iter() ── Receiver<InputEvent> ◄──┘
//     │
//     ├─ draw_image / fill_rect ──► Framebuffer
//     │
//     └─ present() ──► Presenter ──► clear
// ```
//
// The event loop is pumped rather than run, so the engine keeps control
// of the frame loop on the calling thread. Winit requires that thread to
// be the main thread on macOS.
//
// Unless the application attaches its own [`Presenter`], a
// [`WgpuPresenter`] is created for the window on the first present. If no
// GPU surface can be set up, frames are composed and discarded.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use super::framebuffer::Framebuffer;
use super::input_processor::InputProcessor;
use super::wgpu_presenter::WgpuPresenter;
use crate::core::input::InputEvent;
use crate::core::object::Rect;
use crate::core::platform_bridge::{Backend, Canvas, ImageId, PlatformError, Rgba, Screen};

//=== Presenter ===========================================================

/// Copies a composed frame onto a window.
///
/// [`WgpuPresenter`] is the default; applications drawing through another
/// surface crate attach their own with [`WinitBackend::with_presenter`].
pub trait Presenter {
    fn present(&mut self, frame: &RgbaImage) -> Result<(), PlatformError>;
}

//=== WindowState =========================================================

const DEFAULT_SIZE: (u32, u32) = (800, 600);

/// Winit application state, driven by `pump_app_events`.
struct WindowState {
    window: Option<Arc<Window>>,
    title: String,
    size: (u32, u32),
    sender: Sender<InputEvent>,
    input_processor: InputProcessor,
    mouse: (f32, f32),
    failure: Option<PlatformError>,
}

impl WindowState {
    fn new(sender: Sender<InputEvent>) -> Self {
        Self {
            window: None,
            title: String::from("Aetheric Arcade"),
            size: DEFAULT_SIZE,
            sender,
            input_processor: InputProcessor::new(),
            mouse: (0.0, 0.0),
            failure: None,
        }
    }

    fn send(&self, event: InputEvent) {
        if self.sender.send(event).is_err() {
            warn!(target: "platform::input", "Channel disconnected, dropping event");
        }
    }
}

impl ApplicationHandler for WindowState {
    /// Creates the window on first resume.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (resume)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.failure = Some(PlatformError::WindowCreation(e.to_string()));
                self.send(InputEvent::Quit);
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.send(InputEvent::Quit);
            }

            WindowEvent::ModifiersChanged(state) => {
                self.input_processor.update_modifiers(state.state());
                trace!(
                    target: "platform::input",
                    "Modifiers changed: {:?}",
                    self.input_processor.current_modifiers()
                );
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.mouse = (x, y);
                self.send(self.input_processor.process_mouse_move(x, y));
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                for event in self.input_processor.process_key_event(key_event) {
                    self.send(event);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.send(self.input_processor.process_mouse_button(*button, *state));
            }

            _ => {}
        }
    }
}

//=== WinitBackend ========================================================

/// Desktop [`Backend`] built on Winit.
///
/// The event loop and window are created by [`Backend::init`], which the
/// engine calls once on construction.
pub struct WinitBackend {
    event_loop: Option<EventLoop<()>>,
    state: WindowState,
    receiver: Receiver<InputEvent>,
    started: Instant,
    framebuffer: Framebuffer,
    presenter: Option<Box<dyn Presenter>>,
    default_presenter_failed: bool,
    reported_offscreen: bool,
}

impl WinitBackend {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            event_loop: None,
            state: WindowState::new(sender),
            receiver,
            started: Instant::now(),
            framebuffer: Framebuffer::new(DEFAULT_SIZE.0, DEFAULT_SIZE.1),
            presenter: None,
            default_presenter_failed: false,
            reported_offscreen: false,
        }
    }

    /// Attaches the presenter that puts frames on screen, replacing the
    /// default WGPU one.
    pub fn with_presenter<P: Presenter + 'static>(mut self, presenter: P) -> Self {
        self.set_presenter(presenter);
        self
    }

    /// Replaces the presenter, e.g. with one built from [`Self::window`]
    /// after the engine started.
    pub fn set_presenter<P: Presenter + 'static>(&mut self, presenter: P) {
        self.presenter = Some(Box::new(presenter));
    }

    /// The OS window, once created.
    pub fn window(&self) -> Option<&Arc<Window>> {
        self.state.window.as_ref()
    }

    /// The frame being composed.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    fn pump(&mut self) {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return;
        };

        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            info!(target: "platform", "Event loop exited with code {}", code);
            self.event_loop = None;
            self.state.send(InputEvent::Quit);
        }
    }

    /// Creates the WGPU presenter once a window exists, if none is attached.
    fn ensure_presenter(&mut self) {
        if self.presenter.is_some() || self.default_presenter_failed {
            return;
        }
        let Some(window) = self.state.window.clone() else {
            return;
        };

        match WgpuPresenter::new(window) {
            Ok(presenter) => self.presenter = Some(Box::new(presenter)),
            Err(e) => {
                warn!(target: "platform", "{}; frames are composed off-screen", e);
                self.default_presenter_failed = true;
            }
        }
    }
}

impl Default for WinitBackend {
    fn default() -> Self {
        Self::new()
    }
}

//--- Canvas --------------------------------------------------------------

impl Canvas for WinitBackend {
    fn draw_image(&mut self, image: ImageId, dest: Rect) {
        self.framebuffer.draw_image(image, dest);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.framebuffer.fill_rect(rect, color);
    }
}

//--- Backend -------------------------------------------------------------

impl Backend for WinitBackend {
    fn init(&mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Creating Winit event loop");

        let event_loop = EventLoop::new()
            .map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;
        self.event_loop = Some(event_loop);
        self.started = Instant::now();

        // First pump delivers `resumed`, which creates the window.
        self.pump();

        match self.state.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn ticks(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.pump();
        self.receiver.try_iter().collect()
    }

    fn mouse_position(&self) -> (f32, f32) {
        self.state.mouse
    }

    fn create_screen(&mut self, width: u32, height: u32) -> Result<Screen, PlatformError> {
        self.state.size = (width, height);
        self.framebuffer.resize(width, height);

        if let Some(window) = &self.state.window {
            let _ = window.request_inner_size(LogicalSize::new(width, height));
        }

        Ok(Screen { width, height })
    }

    fn set_title(&mut self, title: &str) {
        self.state.title = title.to_owned();
        if let Some(window) = &self.state.window {
            window.set_title(title);
        }
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageId, PlatformError> {
        self.framebuffer.load(path)
    }

    fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        self.framebuffer.image_size(image)
    }

    fn release_image(&mut self, image: ImageId) {
        self.framebuffer.release(image);
    }

    fn present(&mut self) -> Result<(), PlatformError> {
        self.ensure_presenter();

        let shown = match self.presenter.as_mut() {
            Some(presenter) => presenter.present(self.framebuffer.frame()),
            None => {
                if !self.reported_offscreen {
                    info!(target: "platform", "No window to present to, frames are composed off-screen");
                    self.reported_offscreen = true;
                }
                Ok(())
            }
        };

        self.framebuffer.clear();
        shown
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
//
// No event loop is created here: these cover the backend state that does
// not need a display.
