//=========================================================================
// Collision Registry
//=========================================================================
//
// One handler per ordered object pair.
//
// Pairs hold `Weak` references: a participant dropped everywhere else
// reads as null, and null or destroyed pairs are pruned by the sweep
// (see `Stage::sweep_collisions`). Pairs keep registration order;
// re-registering a pair replaces its handler in place.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::Stage;
use crate::core::object::{object_addr, ObjectRef, WeakObjectRef};

//=== Types ===============================================================

/// Collision callback, invoked with the pair in registration order.
pub type CollisionHandler = dyn FnMut(&mut Stage, &ObjectRef, &ObjectRef);

/// Identity of an ordered pair: both allocation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PairKey {
    first: usize,
    second: usize,
}

impl PairKey {
    pub(crate) fn of<A: ?Sized, B: ?Sized>(first: &Rc<RefCell<A>>, second: &Rc<RefCell<B>>) -> Self {
        Self {
            first: object_addr(first),
            second: object_addr(second),
        }
    }
}

//=== CollisionPair =======================================================

#[derive(Clone)]
pub(crate) struct CollisionPair {
    pub(crate) key: PairKey,
    first: WeakObjectRef,
    second: WeakObjectRef,
    handler: Rc<RefCell<CollisionHandler>>,
}

impl CollisionPair {
    /// Both participants, or `None` if either is null or destroyed.
    pub(crate) fn participants(&self) -> Option<(ObjectRef, ObjectRef)> {
        let first = self.first.upgrade()?;
        let second = self.second.upgrade()?;

        if first.borrow().is_destroyed() || second.borrow().is_destroyed() {
            return None;
        }

        Some((first, second))
    }
}

//=== CollisionRegistry ===================================================

#[derive(Default)]
pub(crate) struct CollisionRegistry {
    pairs: Vec<CollisionPair>,
}

impl CollisionRegistry {
    pub(crate) fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Registers `handler` for (`first`, `second`), replacing any previous one.
    pub(crate) fn insert<F>(&mut self, first: &ObjectRef, second: &ObjectRef, handler: F)
    where
        F: FnMut(&mut Stage, &ObjectRef, &ObjectRef) + 'static,
    {
        let key = PairKey::of(first, second);
        let handler: Rc<RefCell<CollisionHandler>> = Rc::new(RefCell::new(handler));

        if let Some(existing) = self.pairs.iter_mut().find(|pair| pair.key == key) {
            existing.handler = handler;
            return;
        }

        self.pairs.push(CollisionPair {
            key,
            first: Rc::downgrade(first),
            second: Rc::downgrade(second),
            handler,
        });
    }

    /// Removes the pair with `key`. Returns `false` if it was not registered.
    pub(crate) fn remove(&mut self, key: PairKey) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|pair| pair.key != key);
        self.pairs.len() != before
    }

    /// The handler currently registered for `key`.
    pub(crate) fn handler(&self, key: PairKey) -> Option<Rc<RefCell<CollisionHandler>>> {
        self.pairs
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.handler.clone())
    }

    pub(crate) fn contains(&self, key: PairKey) -> bool {
        self.pairs.iter().any(|pair| pair.key == key)
    }

    /// Shallow copy of the registry, safe to iterate while handlers mutate it.
    pub(crate) fn snapshot(&self) -> Vec<CollisionPair> {
        self.pairs.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }
}
