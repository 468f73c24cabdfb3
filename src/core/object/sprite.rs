//=========================================================================
// Sprite
//=========================================================================
//
// The stock image-backed object. Backgrounds are sprites too.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{GameObject, Rect};
use crate::core::platform_bridge::{Canvas, ImageId};

/// Render order given to backgrounds.
pub const BACKGROUND_RENDER_ORDER: i32 = 100;

//=== Sprite ==============================================================

/// An image drawn stretched to its bounds.
#[derive(Debug, Clone)]
pub struct Sprite {
    image: ImageId,
    bounds: Rect,
    render_order: i32,
    interactive: bool,
    destroyed: bool,
}

impl Sprite {
    /// Creates an interactive sprite.
    pub fn new(image: ImageId, bounds: Rect, render_order: i32) -> Self {
        Self {
            image,
            bounds,
            render_order,
            interactive: true,
            destroyed: false,
        }
    }

    /// Creates a full-viewport, non-interactive background sprite.
    pub fn background(image: ImageId, viewport: Rect) -> Self {
        Self::new(image, viewport, BACKGROUND_RENDER_ORDER).with_interactive(false)
    }

    /// Non-interactive sprites never collide.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn image(&self) -> ImageId {
        self.image
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_render_order(&mut self, render_order: i32) {
        self.render_order = render_order;
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.bounds = self.bounds.translated(dx, dy);
    }
}

impl GameObject for Sprite {
    fn render_order(&self) -> i32 {
        self.render_order
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn render(&mut self, canvas: &mut dyn Canvas) {
        if !self.destroyed {
            canvas.draw_image(self.image, self.bounds);
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn is_collidable(&self) -> bool {
        self.interactive && !self.destroyed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform_bridge::Rgba;

    #[derive(Default)]
    struct RecordingCanvas {
        images: Vec<(ImageId, Rect)>,
    }

    impl Canvas for RecordingCanvas {
        fn draw_image(&mut self, image: ImageId, dest: Rect) {
            self.images.push((image, dest));
        }
        fn fill_rect(&mut self, _rect: Rect, _color: Rgba) {}
    }

    #[test]
    fn render_draws_image_at_bounds() {
        let mut sprite = Sprite::new(ImageId::new(3), Rect::new(1.0, 2.0, 3.0, 4.0), 0);
        let mut canvas = RecordingCanvas::default();

        sprite.render(&mut canvas);

        assert_eq!(canvas.images, vec![(ImageId::new(3), Rect::new(1.0, 2.0, 3.0, 4.0))]);
    }

    #[test]
    fn destroyed_sprite_is_not_drawn_or_collidable() {
        let mut sprite = Sprite::new(ImageId::new(0), Rect::new(0.0, 0.0, 8.0, 8.0), 0);
        let other = Sprite::new(ImageId::new(1), Rect::new(0.0, 0.0, 8.0, 8.0), 0);
        let mut canvas = RecordingCanvas::default();

        assert!(sprite.check_collision(&other));
        sprite.destroy();
        sprite.render(&mut canvas);

        assert!(sprite.is_destroyed());
        assert!(canvas.images.is_empty());
        assert!(!sprite.check_collision(&other));
    }

    #[test]
    fn background_is_non_interactive_with_high_order() {
        let bg = Sprite::background(ImageId::new(9), Rect::new(0.0, 0.0, 640.0, 480.0));
        let player = Sprite::new(ImageId::new(1), Rect::new(10.0, 10.0, 5.0, 5.0), 0);

        assert_eq!(bg.render_order(), BACKGROUND_RENDER_ORDER);
        assert!(!bg.is_interactive());
        assert!(!player.check_collision(&bg));
    }

    #[test]
    fn move_by_translates_bounds() {
        let mut sprite = Sprite::new(ImageId::new(0), Rect::new(0.0, 0.0, 4.0, 4.0), 0);
        sprite.move_by(3.0, -1.0);
        assert_eq!(sprite.bounds(), Rect::new(3.0, -1.0, 4.0, 4.0));
        sprite.move_to(10.0, 10.0);
        assert_eq!(sprite.bounds(), Rect::new(10.0, 10.0, 4.0, 4.0));
    }
}
