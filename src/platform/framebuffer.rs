//=========================================================================
// Framebuffer
//=========================================================================
//
// CPU-side RGBA canvas plus the image store backing `ImageId`s.
//
// Images are decoded once on load. Draws at a size other than the
// image's natural size use a nearest-neighbour copy, cached per
// (image, width, height) until the image is released. Draws larger than
// the frame are sampled straight into the visible pixels instead, so the
// scaled copy never outgrows the frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::object::Rect;
use crate::core::platform_bridge::{Canvas, ImageId, PlatformError, Rgba};

//=== Framebuffer =========================================================

/// Software render target and image store.
pub struct Framebuffer {
    frame: RgbaImage,
    clear_color: Rgba,
    images: HashMap<ImageId, RgbaImage>,
    scaled: HashMap<(ImageId, u32, u32), RgbaImage>,
    next_id: u32,
}

impl Framebuffer {
    /// Creates an opaque black frame of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let clear_color = [0, 0, 0, 255];
        Self {
            frame: RgbaImage::from_pixel(width, height, image::Rgba(clear_color)),
            clear_color,
            images: HashMap::new(),
            scaled: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn with_clear_color(mut self, color: Rgba) -> Self {
        self.clear_color = color;
        self.clear();
        self
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// The composed frame.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Reallocates the frame; contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame = RgbaImage::from_pixel(width, height, image::Rgba(self.clear_color));
    }

    /// Fills the frame with the clear color.
    pub fn clear(&mut self) {
        let color = image::Rgba(self.clear_color);
        for pixel in self.frame.pixels_mut() {
            *pixel = color;
        }
    }

    //--- Image Store ------------------------------------------------------

    /// Decodes the image at `path` and stores it.
    pub fn load(&mut self, path: &Path) -> Result<ImageId, PlatformError> {
        let decoded = image::open(path).map_err(|e| PlatformError::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let id = self.insert_image(decoded.to_rgba8());
        debug!(target: "platform", "Loaded {} as {:?}", path.display(), id);
        Ok(id)
    }

    /// Stores an already decoded image.
    pub fn insert_image(&mut self, image: RgbaImage) -> ImageId {
        let id = ImageId::new(self.next_id);
        self.next_id += 1;
        self.images.insert(id, image);
        id
    }

    pub fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        self.images.get(&image).map(|img| img.dimensions())
    }

    /// Frees an image and its scaled copies. Returns `false` if unknown.
    pub fn release(&mut self, image: ImageId) -> bool {
        self.scaled.retain(|(id, _, _), _| *id != image);
        self.images.remove(&image).is_some()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

//=== Canvas ==============================================================

impl Canvas for Framebuffer {
    fn draw_image(&mut self, image: ImageId, dest: Rect) {
        let Some(source) = self.images.get(&image) else {
            trace!(target: "platform", "Draw of unknown {:?} skipped", image);
            return;
        };

        let width = dest.width.round();
        let height = dest.height.round();
        if width < 1.0 || height < 1.0 {
            return;
        }
        if width > self.frame.width() as f32 || height > self.frame.height() as f32 {
            draw_clipped(&mut self.frame, source, dest);
            return;
        }
        let (width, height) = (width as u32, height as u32);
        let (x, y) = (dest.x.round() as i64, dest.y.round() as i64);

        if source.dimensions() == (width, height) {
            imageops::overlay(&mut self.frame, source, x, y);
            return;
        }

        let scaled = self
            .scaled
            .entry((image, width, height))
            .or_insert_with(|| imageops::resize(source, width, height, FilterType::Nearest));
        imageops::overlay(&mut self.frame, scaled, x, y);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let left = rect.x.max(0.0).round() as u32;
        let top = rect.y.max(0.0).round() as u32;
        let right = rect.right().min(self.frame.width() as f32).round();
        let bottom = rect.bottom().min(self.frame.height() as f32).round();
        if right <= left as f32 || bottom <= top as f32 {
            return;
        }

        let paint = image::Rgba(color);
        for y in top..bottom as u32 {
            for x in left..right as u32 {
                self.frame.get_pixel_mut(x, y).blend(&paint);
            }
        }
    }
}

/// Nearest-neighbour draw of `source` over `dest`, touching only the
/// part of `dest` inside `frame`.
fn draw_clipped(frame: &mut RgbaImage, source: &RgbaImage, dest: Rect) {
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 {
        return;
    }

    let (frame_w, frame_h) = (frame.width() as f32, frame.height() as f32);
    let left = dest.x.clamp(0.0, frame_w).round() as u32;
    let top = dest.y.clamp(0.0, frame_h).round() as u32;
    let right = dest.right().clamp(0.0, frame_w).round() as u32;
    let bottom = dest.bottom().clamp(0.0, frame_h).round() as u32;

    let scale_x = src_w as f64 / dest.width as f64;
    let scale_y = src_h as f64 / dest.height as f64;

    for y in top..bottom {
        let sy = (((y as f64 + 0.5 - dest.y as f64) * scale_y) as u32).min(src_h - 1);
        for x in left..right {
            let sx = (((x as f64 + 0.5 - dest.x as f64) * scale_x) as u32).min(src_w - 1);
            frame.get_pixel_mut(x, y).blend(source.get_pixel(sx, sy));
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
