//=========================================================================
// Render List
//=========================================================================
//
// Objects in draw order: descending render order, ties in insertion
// order.
//
// Insertion scans left to right and inserts before the first entry whose
// render order is strictly lower than the new object's, else appends.
// The list stays sorted as long as objects do not change their render
// order after insertion; if they do, later insertions only look for the
// first lower entry and the list is not re-sorted.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::object::{object_addr, GameObject, ObjectRef};

//=== RenderList ==========================================================

#[derive(Default)]
pub(crate) struct RenderList {
    objects: Vec<ObjectRef>,
}

impl RenderList {
    pub(crate) fn new() -> Self {
        Self { objects: Vec::new() }
    }

    /// Inserts `object` using the first-lower-entry scan.
    pub(crate) fn insert(&mut self, object: ObjectRef) {
        let order = object.borrow().render_order();
        match self
            .objects
            .iter()
            .position(|existing| order > existing.borrow().render_order())
        {
            Some(index) => self.objects.insert(index, object),
            None => self.objects.push(object),
        }
    }

    /// Removes `object` by identity. Returns `false` if it was not listed.
    pub(crate) fn remove<T: GameObject + ?Sized>(&mut self, object: &Rc<RefCell<T>>) -> bool {
        let addr = object_addr(object);
        match self.objects.iter().position(|o| object_addr(o) == addr) {
            Some(index) => {
                self.objects.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains<T: GameObject + ?Sized>(&self, object: &Rc<RefCell<T>>) -> bool {
        let addr = object_addr(object);
        self.objects.iter().any(|o| object_addr(o) == addr)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::Sprite;
    use crate::core::object::Rect;
    use crate::core::platform_bridge::ImageId;

    fn sprite(order: i32) -> Rc<RefCell<Sprite>> {
        Rc::new(RefCell::new(Sprite::new(ImageId::new(order as u32), Rect::default(), order)))
    }

    fn orders(list: &RenderList) -> Vec<i32> {
        list.iter().map(|o| o.borrow().render_order()).collect()
    }

    #[test]
    fn distinct_orders_end_up_descending() {
        let mut list = RenderList::new();
        for order in [3, 9, 1, 7, 5, 0, 8] {
            list.insert(sprite(order));
        }

        assert_eq!(orders(&list), vec![9, 8, 7, 5, 3, 1, 0]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut list = RenderList::new();
        let first = sprite(5);
        let second = sprite(5);
        list.insert(first.clone());
        list.insert(sprite(1));
        list.insert(second.clone());

        let ids: Vec<usize> = list.iter().map(|o| object_addr(o)).collect();
        assert_eq!(ids[0], object_addr(&first));
        assert_eq!(ids[1], object_addr(&second));
    }

    #[test]
    fn remove_is_identity_based() {
        let mut list = RenderList::new();
        let a = sprite(1);
        let twin = sprite(1);
        list.insert(a.clone());

        assert!(!list.remove(&twin), "Equal render order is not identity");
        assert!(list.remove(&a));
        assert!(!list.remove(&a));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn mutated_order_is_not_resorted() {
        let mut list = RenderList::new();
        let a = sprite(10);
        list.insert(a.clone());
        list.insert(sprite(5));

        a.borrow_mut().set_render_order(0);
        list.insert(sprite(3));

        // List was [0, 5]; 3 lands before the first lower entry, at the front.
        assert_eq!(orders(&list), vec![3, 0, 5]);
    }
}
