//=========================================================================
// Game Objects
//=========================================================================
//
// Contracts for everything the stage renders and collides.
//
// Objects are shared as `Rc<RefCell<dyn GameObject>>`: the render list,
// input box list and collision registry all refer to the same allocation,
// and identity is the allocation address.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;
use crate::core::platform_bridge::Canvas;

//=== Module Declarations =================================================

mod rect;
mod sprite;

//=== Public API ==========================================================

pub use rect::Rect;
pub use sprite::{Sprite, BACKGROUND_RENDER_ORDER};

//=== Shared Handles ======================================================

/// Shared handle to a registered object.
pub type ObjectRef = Rc<RefCell<dyn GameObject>>;

/// Non-owning handle, used where a dropped object should read as "null".
pub type WeakObjectRef = Weak<RefCell<dyn GameObject>>;

/// Shared handle to a registered input box.
pub type InputBoxRef = Rc<RefCell<dyn InputBox>>;

/// Identity of a shared object: its allocation address.
pub(crate) fn object_addr<T: ?Sized>(object: &Rc<RefCell<T>>) -> usize {
    Rc::as_ptr(object) as *const () as usize
}

//=== GameObject ==========================================================

/// Something the engine can draw and test for collisions.
///
/// Only [`bounds`](GameObject::bounds) drives the default collision
/// predicate; override [`check_collision`](GameObject::check_collision)
/// for other shapes.
pub trait GameObject {
    /// Draw priority. Higher values are drawn earlier (underneath).
    fn render_order(&self) -> i32;

    /// Destroyed objects are skipped by collision sweeps.
    fn is_destroyed(&self) -> bool;

    /// Draws the object.
    fn render(&mut self, canvas: &mut dyn Canvas);

    /// Marks the object destroyed and frees what it owns.
    fn destroy(&mut self);

    /// Screen-space bounds.
    fn bounds(&self) -> Rect;

    /// Whether the object takes part in collision checks at all.
    fn is_collidable(&self) -> bool {
        true
    }

    /// Collision predicate: both collidable and bounds overlapping.
    fn check_collision(&self, other: &dyn GameObject) -> bool {
        self.is_collidable()
            && other.is_collidable()
            && self.bounds().intersects(&other.bounds())
    }
}

//=== InputBox ============================================================

/// An object that also receives every input event.
///
/// The engine does not filter: input boxes decide themselves which
/// events matter (focus, text, clicks).
pub trait InputBox: GameObject {
    fn handle_event(&mut self, event: &InputEvent);
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Block {
        bounds: Rect,
        solid: bool,
    }

    impl GameObject for Block {
        fn render_order(&self) -> i32 {
            0
        }
        fn is_destroyed(&self) -> bool {
            false
        }
        fn render(&mut self, _canvas: &mut dyn Canvas) {}
        fn destroy(&mut self) {}
        fn bounds(&self) -> Rect {
            self.bounds
        }
        fn is_collidable(&self) -> bool {
            self.solid
        }
    }

    #[test]
    fn default_collision_uses_bounds() {
        let a = Block { bounds: Rect::new(0.0, 0.0, 10.0, 10.0), solid: true };
        let b = Block { bounds: Rect::new(5.0, 5.0, 10.0, 10.0), solid: true };
        let c = Block { bounds: Rect::new(50.0, 50.0, 10.0, 10.0), solid: true };

        assert!(a.check_collision(&b));
        assert!(!a.check_collision(&c));
    }

    #[test]
    fn non_collidable_objects_never_collide() {
        let a = Block { bounds: Rect::new(0.0, 0.0, 10.0, 10.0), solid: true };
        let ghost = Block { bounds: Rect::new(0.0, 0.0, 10.0, 10.0), solid: false };

        assert!(!a.check_collision(&ghost));
        assert!(!ghost.check_collision(&a));
    }

    #[test]
    fn identity_survives_unsizing() {
        let block = Rc::new(RefCell::new(Block { bounds: Rect::default(), solid: true }));
        let shared: ObjectRef = block.clone();
        let other: ObjectRef = Rc::new(RefCell::new(Block { bounds: Rect::default(), solid: true }));

        assert_eq!(object_addr(&block), object_addr(&shared));
        assert_ne!(object_addr(&block), object_addr(&other));
    }
}
