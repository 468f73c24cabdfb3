//=========================================================================
// Headless Backend
//=========================================================================
//
// Windowless backend driven entirely by the caller.
//
// Architecture:
// ```text
//   EventInjector ──► crossbeam channel ──► poll_events()
//
//   present() ──► last_frame = pending draws, clock += frame_step
// ```
//
// The clock only moves on `present()` (one frame step) or on an explicit
// `advance_clock()`, so frame timing is reproducible. Images are never
// decoded: `load_image` hands out ids and remembers the path.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;
use crate::core::object::Rect;
use crate::core::platform_bridge::{Backend, Canvas, ImageId, PlatformError, Rgba, Screen};

//=== DrawCommand =========================================================

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Image { image: ImageId, dest: Rect },
    Fill { rect: Rect, color: Rgba },
}

//=== EventInjector =======================================================

/// Cloneable handle for feeding events into a [`HeadlessBackend`].
///
/// Stays usable after the backend has moved into an engine.
#[derive(Debug, Clone)]
pub struct EventInjector {
    sender: Sender<InputEvent>,
}

impl EventInjector {
    /// Queues `event` for the next `poll_events()`. Returns `false` if the
    /// backend is gone.
    pub fn push(&self, event: InputEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

//=== HeadlessBackend =====================================================

struct HeadlessImage {
    path: PathBuf,
    size: (u32, u32),
}

/// Deterministic in-memory backend for tests and tooling.
pub struct HeadlessBackend {
    clock_ms: u64,
    frame_step_ms: u64,
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
    mouse: (f32, f32),
    screen: Option<Screen>,
    title: String,
    image_size: (u32, u32),
    images: HashMap<ImageId, HeadlessImage>,
    next_image: u32,
    released: Vec<ImageId>,
    pending: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
    presented: u64,
    init_calls: u32,
}

impl HeadlessBackend {
    //--- Construction -----------------------------------------------------

    /// Creates a backend advancing 16 ms per presented frame.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            clock_ms: 0,
            frame_step_ms: 16,
            sender,
            receiver,
            mouse: (0.0, 0.0),
            screen: None,
            title: String::new(),
            image_size: (32, 32),
            images: HashMap::new(),
            next_image: 0,
            released: Vec::new(),
            pending: Vec::new(),
            last_frame: Vec::new(),
            presented: 0,
            init_calls: 0,
        }
    }

    /// Sets how far the clock moves on every `present()`.
    pub fn with_frame_step(mut self, millis: u64) -> Self {
        self.frame_step_ms = millis;
        self
    }

    /// Sets the natural size reported for loaded images.
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = (width, height);
        self
    }

    //--- Input ------------------------------------------------------------

    pub fn injector(&self) -> EventInjector {
        EventInjector {
            sender: self.sender.clone(),
        }
    }

    pub fn push_event(&self, event: InputEvent) {
        // The backend holds the receiver, so this cannot fail.
        let _ = self.sender.send(event);
    }

    pub fn set_mouse_position(&mut self, x: f32, y: f32) {
        self.mouse = (x, y);
    }

    //--- Clock ------------------------------------------------------------

    pub fn set_frame_step(&mut self, millis: u64) {
        self.frame_step_ms = millis;
    }

    pub fn advance_clock(&mut self, millis: u64) {
        self.clock_ms += millis;
    }

    //--- Inspection -------------------------------------------------------

    /// Draw calls of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    /// Draw calls issued since the last `present()`.
    pub fn pending_draws(&self) -> &[DrawCommand] {
        &self.pending
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    /// Released images, in release order.
    pub fn released_images(&self) -> &[ImageId] {
        &self.released
    }

    /// Path an image was loaded from, while it is still alive.
    pub fn image_path(&self, image: ImageId) -> Option<&Path> {
        self.images.get(&image).map(|img| img.path.as_path())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

//=== Backend =============================================================

impl Canvas for HeadlessBackend {
    fn draw_image(&mut self, image: ImageId, dest: Rect) {
        self.pending.push(DrawCommand::Image { image, dest });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.pending.push(DrawCommand::Fill { rect, color });
    }
}

impl Backend for HeadlessBackend {
    fn init(&mut self) -> Result<(), PlatformError> {
        self.init_calls += 1;
        debug!(target: "platform", "Headless backend initialized");
        Ok(())
    }

    fn ticks(&self) -> u64 {
        self.clock_ms
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        let events: Vec<InputEvent> = self.receiver.try_iter().collect();

        for event in &events {
            if let InputEvent::MouseMoved { x, y } = event {
                self.mouse = (*x, *y);
            }
        }

        if !events.is_empty() {
            trace!(target: "platform::input", "Drained {} injected events", events.len());
        }
        events
    }

    fn mouse_position(&self) -> (f32, f32) {
        self.mouse
    }

    fn create_screen(&mut self, width: u32, height: u32) -> Result<Screen, PlatformError> {
        let screen = Screen { width, height };
        self.screen = Some(screen);
        Ok(screen)
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageId, PlatformError> {
        let id = ImageId::new(self.next_image);
        self.next_image += 1;
        self.images.insert(
            id,
            HeadlessImage {
                path: path.to_path_buf(),
                size: self.image_size,
            },
        );
        Ok(id)
    }

    fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        self.images.get(&image).map(|img| img.size)
    }

    fn release_image(&mut self, image: ImageId) {
        if self.images.remove(&image).is_some() {
            self.released.push(image);
        }
    }

    fn present(&mut self) -> Result<(), PlatformError> {
        self.last_frame = std::mem::take(&mut self.pending);
        self.presented += 1;
        self.clock_ms += self.frame_step_ms;
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::KeyCode;

    #[test]
    fn injected_events_drain_in_order() {
        let mut backend = HeadlessBackend::new();
        let input = backend.injector();

        assert!(input.push(InputEvent::key_down(KeyCode::KeyA)));
        backend.push_event(InputEvent::Quit);

        assert_eq!(
            backend.poll_events(),
            vec![InputEvent::key_down(KeyCode::KeyA), InputEvent::Quit]
        );
        assert!(backend.poll_events().is_empty());
    }

    #[test]
    fn mouse_follows_motion_events() {
        let mut backend = HeadlessBackend::new();
        backend.set_mouse_position(1.0, 2.0);
        assert_eq!(backend.mouse_position(), (1.0, 2.0));

        backend.push_event(InputEvent::MouseMoved { x: 7.0, y: 9.0 });
        backend.poll_events();

        assert_eq!(backend.mouse_position(), (7.0, 9.0));
    }

    #[test]
    fn clock_moves_only_on_present_or_advance() {
        let mut backend = HeadlessBackend::new().with_frame_step(20);
        assert_eq!(backend.ticks(), 0);

        backend.present().unwrap();
        backend.advance_clock(5);
        assert_eq!(backend.ticks(), 25);

        backend.set_frame_step(100);
        backend.present().unwrap();
        assert_eq!(backend.ticks(), 125);
    }

    #[test]
    fn present_swaps_recorded_frame() {
        let mut backend = HeadlessBackend::new();
        backend.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), [1, 2, 3, 4]);
        assert_eq!(backend.pending_draws().len(), 1);

        backend.present().unwrap();
        assert_eq!(
            backend.last_frame(),
            &[DrawCommand::Fill { rect: Rect::new(0.0, 0.0, 1.0, 1.0), color: [1, 2, 3, 4] }]
        );
        assert!(backend.pending_draws().is_empty());

        backend.present().unwrap();
        assert!(backend.last_frame().is_empty());
        assert_eq!(backend.presented_frames(), 2);
    }

    #[test]
    fn images_are_tracked_until_released() {
        let mut backend = HeadlessBackend::new().with_image_size(64, 16);
        let id = backend.load_image(Path::new("hero.png")).unwrap();

        assert_eq!(backend.image_size(id), Some((64, 16)));
        assert_eq!(backend.image_path(id), Some(Path::new("hero.png")));

        backend.release_image(id);
        backend.release_image(id);

        assert_eq!(backend.released_images(), &[id]);
        assert_eq!(backend.image_size(id), None);
    }

    #[test]
    fn push_fails_once_backend_is_dropped() {
        let backend = HeadlessBackend::new();
        let input = backend.injector();
        drop(backend);

        assert!(!input.push(InputEvent::Quit));
    }
}
