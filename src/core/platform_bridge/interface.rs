//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// The contract between the engine loop and a multimedia backend.
//
// A backend owns everything the engine delegates: the window and its
// surface, the clock, the input queue, image decoding and drawing.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;
use crate::core::object::Rect;

//=== Basic Types =========================================================

/// RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// Opaque handle to an image loaded by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u32);

impl ImageId {
    /// Wraps a backend-assigned index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the backend-assigned index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Handle to the drawable surface created by [`Backend::create_screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}

impl Screen {
    /// Rectangle covering the whole screen.
    pub fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

//=== PlatformError =======================================================

/// Backend initialization and runtime errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(String),

    /// The OS refused to create a window.
    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    /// An image could not be read or decoded.
    #[error("Failed to load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    /// No GPU surface, adapter or device could be set up for the window.
    #[error("Graphics initialization failed: {0}")]
    GraphicsInit(String),

    /// The finished frame could not be shown.
    #[error("Frame presentation failed: {0}")]
    Present(String),
}

//=== Canvas ==============================================================

/// Drawing target handed to objects during rendering.
pub trait Canvas {
    /// Draws `image` stretched to `dest`.
    fn draw_image(&mut self, image: ImageId, dest: Rect);

    /// Fills `rect` with `color`, alpha-blended.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
}

//=== Backend =============================================================

/// Multimedia backend driven by the engine loop.
///
/// All methods are called from the loop thread. `poll_events` must never
/// block: it returns whatever is queued right now, possibly nothing.
pub trait Backend: Canvas {
    /// Initializes the backend. Called exactly once per engine.
    fn init(&mut self) -> Result<(), PlatformError>;

    /// Milliseconds elapsed since [`Backend::init`].
    fn ticks(&self) -> u64;

    /// Drains all pending input events.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Current pointer position in screen pixels.
    fn mouse_position(&self) -> (f32, f32);

    /// Creates (or resizes) the drawable surface.
    fn create_screen(&mut self, width: u32, height: u32) -> Result<Screen, PlatformError>;

    /// Sets the window caption.
    fn set_title(&mut self, title: &str);

    /// Loads an image from disk.
    fn load_image(&mut self, path: &Path) -> Result<ImageId, PlatformError>;

    /// Natural size of a loaded image, `None` if unknown.
    fn image_size(&self, image: ImageId) -> Option<(u32, u32)>;

    /// Frees a loaded image. Unknown handles are ignored.
    fn release_image(&mut self, image: ImageId);

    /// Shows the composed frame.
    fn present(&mut self) -> Result<(), PlatformError>;
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_id_round_trips_index() {
        assert_eq!(ImageId::new(7).index(), 7);
    }

    #[test]
    fn screen_viewport_covers_surface() {
        let screen = Screen { width: 640, height: 480 };
        assert_eq!(screen.viewport(), Rect::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn platform_error_display_format() {
        let err = PlatformError::ImageLoad {
            path: PathBuf::from("assets/bg.png"),
            reason: "not found".into(),
        };
        assert_eq!(err.to_string(), "Failed to load image assets/bg.png: not found");

        let err = PlatformError::EventLoopCreation("busy".into());
        assert_eq!(err.to_string(), "Event loop creation failed: busy");
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
