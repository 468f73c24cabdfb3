//=========================================================================
// Input Dispatcher
//=========================================================================
//
// Observer registries for keyboard and pointer input.
//
// Architecture:
// ```text
//   InputEvent ──► dispatch() ──┬─► pointer handlers  (by EventKind)
//                               ├─► KeyTrigger::Pressed(key)
//                               ├─► KeyTrigger::Released(key)
//                               └─► Stage input boxes (every event)
//
//   once per frame ──► fire_held() ──► KeyTrigger::Held(key) per held key
// ```
//
// Registries are append-only: registering the same trigger twice keeps
// both handlers and fires them in registration order.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{info, trace};

//=== Internal Dependencies ===============================================

use super::event::{EventKind, InputEvent, KeyCode, MouseEventKind};
use crate::core::stage::Stage;
use crate::core::TickControl;

//=== Handler Types =======================================================

/// Keyboard handler. Receives the stage so it can mutate world state.
pub type KeyHandler = Box<dyn FnMut(&mut Stage)>;

/// Pointer handler. Receives the stage and the cursor position.
pub type PointerHandler = Box<dyn FnMut(&mut Stage, f32, f32)>;

//=== KeyTrigger ==========================================================

/// When a keyboard handler fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTrigger {
    /// Every frame the key is held (level-triggered).
    Held(KeyCode),

    /// Once per UP → DOWN transition (edge-triggered).
    Pressed(KeyCode),

    /// Once per DOWN → UP transition.
    Released(KeyCode),
}

//=== Dispatcher ==========================================================

/// Handler registries for keyboard and pointer input.
#[derive(Default)]
pub struct Dispatcher {
    key_handlers: HashMap<KeyTrigger, Vec<KeyHandler>>,
    pointer_handlers: HashMap<EventKind, Vec<PointerHandler>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no handlers.
    pub fn new() -> Self {
        Self {
            key_handlers: HashMap::new(),
            pointer_handlers: HashMap::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends a keyboard handler for `trigger`.
    pub fn on_key<F>(&mut self, trigger: KeyTrigger, handler: F)
    where
        F: FnMut(&mut Stage) + 'static,
    {
        trace!(target: "engine", "Registering key handler for {:?}", trigger);
        self.key_handlers
            .entry(trigger)
            .or_default()
            .push(Box::new(handler));
    }

    /// Appends a pointer handler for `kind`.
    pub fn on_pointer<F>(&mut self, kind: MouseEventKind, handler: F)
    where
        F: FnMut(&mut Stage, f32, f32) + 'static,
    {
        trace!(target: "engine", "Registering pointer handler for {:?}", kind);
        self.pointer_handlers
            .entry(kind.event_kind())
            .or_default()
            .push(Box::new(handler));
    }

    /// Number of handlers registered for `trigger`.
    pub fn key_handler_count(&self, trigger: KeyTrigger) -> usize {
        self.key_handlers.get(&trigger).map_or(0, Vec::len)
    }

    /// Number of handlers registered for `kind`.
    pub fn pointer_handler_count(&self, kind: MouseEventKind) -> usize {
        self.pointer_handlers.get(&kind.event_kind()).map_or(0, Vec::len)
    }

    //--- Dispatch ---------------------------------------------------------

    /// Dispatches one event.
    ///
    /// `pointer` is only called when pointer handlers exist for the event's
    /// kind. Returns [`TickControl::Exit`] for a quit event; the caller is
    /// expected to finish the frame before stopping.
    pub(crate) fn dispatch<P>(
        &mut self,
        event: &InputEvent,
        stage: &mut Stage,
        pointer: P,
    ) -> TickControl
    where
        P: FnOnce() -> (f32, f32),
    {
        let mut control = TickControl::Continue;

        if let InputEvent::Quit = event {
            info!(target: "engine", "Quit requested");
            control = TickControl::Exit;
        }

        if let Some(handlers) = self.pointer_handlers.get_mut(&event.kind()) {
            let (x, y) = pointer();
            for handler in handlers.iter_mut() {
                handler(stage, x, y);
            }
        }

        match event {
            InputEvent::KeyDown { key, .. } => {
                if stage.keys_mut().press(*key) {
                    Self::fire(&mut self.key_handlers, KeyTrigger::Pressed(*key), stage);
                }
            }
            InputEvent::KeyUp { key, .. } => {
                stage.keys_mut().release(*key);
                Self::fire(&mut self.key_handlers, KeyTrigger::Released(*key), stage);
            }
            _ => {}
        }

        stage.forward_to_input_boxes(event);

        control
    }

    /// Fires `Held` handlers for every key currently held.
    pub(crate) fn fire_held(&mut self, stage: &mut Stage) {
        for key in stage.keys().held() {
            Self::fire(&mut self.key_handlers, KeyTrigger::Held(key), stage);
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn fire(
        handlers: &mut HashMap<KeyTrigger, Vec<KeyHandler>>,
        trigger: KeyTrigger,
        stage: &mut Stage,
    ) {
        if let Some(handlers) = handlers.get_mut(&trigger) {
            for handler in handlers.iter_mut() {
                handler(stage);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
