//=========================================================================
// Stage
//=========================================================================
//
// Mutable world state shared with every handler.
//
// Architecture:
//   Stage
//     ├─ keys:        KeyState            (held keys, read-only to users)
//     ├─ objects:     RenderList          (draw order)
//     ├─ input_boxes: Vec<InputBoxRef>    (subset of objects)
//     ├─ collisions:  CollisionRegistry   (pair → handler)
//     └─ timers:      TimerList
//
// Handlers receive `&mut Stage`, so they may add or remove objects,
// timers and collision pairs mid-frame. Collision and timer sweeps
// iterate snapshots to stay consistent under such mutation.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyState};
use crate::core::object::{object_addr, GameObject, InputBox, InputBoxRef, ObjectRef};
use crate::core::platform_bridge::{Canvas, Screen};

//=== Module Declarations =================================================

mod collision;
mod render_list;
mod timer;

//=== Public API ==========================================================

pub use collision::CollisionHandler;
pub use timer::{Timer, TimerCallback, TimerHandle};

use collision::{CollisionRegistry, PairKey};
use render_list::RenderList;
use timer::TimerList;

//=== StageError ==========================================================

/// Registry errors. All of them mean the caller asked to remove
/// something that was never registered (or was already removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("object is not registered")]
    ObjectNotFound,

    #[error("input box is not registered")]
    InputBoxNotFound,

    #[error("timer is not registered")]
    TimerNotFound,
}

//=== Stage ===============================================================

/// World state handed to handlers and to the per-frame update callback.
pub struct Stage {
    delta_time: f64,
    keys: KeyState,
    objects: RenderList,
    input_boxes: Vec<InputBoxRef>,
    collisions: CollisionRegistry,
    timers: TimerList,
    screen: Option<Screen>,
    quit_requested: bool,
}

impl Stage {
    pub(crate) fn new() -> Self {
        Self {
            delta_time: 0.0,
            keys: KeyState::new(),
            objects: RenderList::new(),
            input_boxes: Vec::new(),
            collisions: CollisionRegistry::new(),
            timers: TimerList::new(),
            screen: None,
            quit_requested: false,
        }
    }

    //=====================================================================
    // Frame State
    //=====================================================================

    /// Seconds elapsed between the previous frame and this one.
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Keys currently held.
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// The screen created by the engine, if any.
    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    /// Asks the engine to stop after the current frame.
    pub fn quit(&mut self) {
        debug!(target: "stage", "Quit requested by handler");
        self.quit_requested = true;
    }

    pub(crate) fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    pub(crate) fn set_delta_time(&mut self, delta_time: f64) {
        self.delta_time = delta_time;
    }

    pub(crate) fn set_screen(&mut self, screen: Screen) {
        self.screen = Some(screen);
    }

    pub(crate) fn take_quit_request(&mut self) -> bool {
        std::mem::take(&mut self.quit_requested)
    }

    //=====================================================================
    // Objects
    //=====================================================================

    /// Registers an object for rendering.
    ///
    /// It is placed before the first listed object with a strictly lower
    /// render order, or at the end.
    pub fn add_object(&mut self, object: ObjectRef) {
        trace!(target: "stage", "Adding object (render order {})", object.borrow().render_order());
        self.objects.insert(object);
    }

    /// Deregisters an object by identity.
    pub fn remove_object<T>(&mut self, object: &Rc<RefCell<T>>) -> Result<(), StageError>
    where
        T: GameObject + ?Sized,
    {
        if self.objects.remove(object) {
            Ok(())
        } else {
            Err(StageError::ObjectNotFound)
        }
    }

    pub fn contains_object<T>(&self, object: &Rc<RefCell<T>>) -> bool
    where
        T: GameObject + ?Sized,
    {
        self.objects.contains(object)
    }

    /// Registered objects in draw order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.iter()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    //=====================================================================
    // Input Boxes
    //=====================================================================

    /// Registers an input box; it is also added as an object.
    pub fn add_input_box<T>(&mut self, input_box: Rc<RefCell<T>>)
    where
        T: InputBox + 'static,
    {
        let as_input: InputBoxRef = input_box.clone();
        self.input_boxes.push(as_input);
        self.add_object(input_box);
    }

    /// Deregisters an input box from both the input and object lists.
    pub fn remove_input_box<T>(&mut self, input_box: &Rc<RefCell<T>>) -> Result<(), StageError>
    where
        T: InputBox + ?Sized,
    {
        let addr = object_addr(input_box);
        let index = self
            .input_boxes
            .iter()
            .position(|b| object_addr(b) == addr)
            .ok_or(StageError::InputBoxNotFound)?;

        self.input_boxes.remove(index);
        self.remove_object(input_box)
    }

    pub fn input_box_count(&self) -> usize {
        self.input_boxes.len()
    }

    pub(crate) fn forward_to_input_boxes(&self, event: &InputEvent) {
        for input_box in &self.input_boxes {
            input_box.borrow_mut().handle_event(event);
        }
    }

    //=====================================================================
    // Collisions
    //=====================================================================

    /// Registers `handler` for the ordered pair (`first`, `second`).
    ///
    /// The handler runs every frame the pair overlaps. Registering the same
    /// pair again replaces the handler. The pair is dropped for good once
    /// either object is destroyed or no longer alive.
    pub fn on_collision<F>(&mut self, first: ObjectRef, second: ObjectRef, handler: F)
    where
        F: FnMut(&mut Stage, &ObjectRef, &ObjectRef) + 'static,
    {
        self.collisions.insert(&first, &second, handler);
    }

    /// Deregisters the pair. Returns `false` if it was not registered.
    pub fn remove_collision<A, B>(&mut self, first: &Rc<RefCell<A>>, second: &Rc<RefCell<B>>) -> bool
    where
        A: GameObject + ?Sized,
        B: GameObject + ?Sized,
    {
        self.collisions.remove(PairKey::of(first, second))
    }

    pub fn has_collision<A, B>(&self, first: &Rc<RefCell<A>>, second: &Rc<RefCell<B>>) -> bool
    where
        A: GameObject + ?Sized,
        B: GameObject + ?Sized,
    {
        self.collisions.contains(PairKey::of(first, second))
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    /// Runs the collision sweep for one frame.
    pub(crate) fn sweep_collisions(&mut self) {
        let mut stale = Vec::new();

        for pair in self.collisions.snapshot() {
            // An earlier handler may have removed or replaced this pair.
            let Some(handler) = self.collisions.handler(pair.key) else {
                continue;
            };

            let Some((first, second)) = pair.participants() else {
                stale.push(pair.key);
                continue;
            };

            let hit = first.borrow().check_collision(&*second.borrow());
            if hit {
                let mut handler = handler.borrow_mut();
                (&mut *handler)(self, &first, &second);
            }
        }

        for key in stale {
            if self.collisions.remove(key) {
                debug!(target: "stage", "Pruned collision pair with a destroyed participant");
            }
        }
    }

    //=====================================================================
    // Timers
    //=====================================================================

    /// Creates and registers a one-shot timer.
    pub fn add_timer<F>(&mut self, duration: f64, callback: F) -> TimerHandle
    where
        F: FnMut(&mut Stage) + 'static,
    {
        self.add_timer_instance(Timer::new(duration, callback))
    }

    /// Creates and registers a one-shot timer with a parameter.
    pub fn add_timer_with<P, F>(&mut self, duration: f64, param: P, callback: F) -> TimerHandle
    where
        P: 'static,
        F: FnMut(&mut Stage, &mut P) + 'static,
    {
        self.add_timer_instance(Timer::with_param(duration, param, callback))
    }

    /// Registers a caller-constructed timer.
    pub fn add_timer_instance(&mut self, timer: Timer) -> TimerHandle {
        trace!(target: "stage", "Adding {:?}", timer);
        let handle = TimerHandle::new(timer);
        self.timers.push(handle.clone());
        handle
    }

    /// Deregisters a timer by identity. It never fires again, even if it
    /// still had firings pending in the current sweep.
    pub fn remove_timer(&mut self, timer: &TimerHandle) -> Result<(), StageError> {
        if self.timers.remove(timer) {
            timer.cancel();
            Ok(())
        } else {
            Err(StageError::TimerNotFound)
        }
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Advances every registered timer by the frame delta.
    ///
    /// Timers removed by an earlier callback in the same sweep are skipped;
    /// timers added during the sweep start ticking next frame.
    pub(crate) fn tick_timers(&mut self) {
        let dt = self.delta_time;

        for timer in self.timers.snapshot() {
            if self.timers.contains(&timer) {
                timer.update(self, dt);
            }
        }

        self.timers.prune_finished();
    }

    //=====================================================================
    // Rendering
    //=====================================================================

    /// Renders all objects in list order, skipping the object at `skip`.
    pub(crate) fn render_objects(&self, canvas: &mut dyn Canvas, skip: Option<usize>) {
        for object in self.objects.iter() {
            if Some(object_addr(object)) == skip {
                continue;
            }
            object.borrow_mut().render(canvas);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::core::object::{Rect, Sprite};
    use crate::core::platform_bridge::{ImageId, Rgba};

    //--- Test Helpers -----------------------------------------------------

    fn sprite_at(x: f32, order: i32) -> Rc<RefCell<Sprite>> {
        Rc::new(RefCell::new(Sprite::new(
            ImageId::new(order as u32),
            Rect::new(x, 0.0, 10.0, 10.0),
            order,
        )))
    }

    #[derive(Default)]
    struct Field {
        bounds: Rect,
        events: Vec<InputEvent>,
        destroyed: bool,
    }

    impl GameObject for Field {
        fn render_order(&self) -> i32 {
            0
        }
        fn is_destroyed(&self) -> bool {
            self.destroyed
        }
        fn render(&mut self, canvas: &mut dyn Canvas) {
            canvas.fill_rect(self.bounds, [255, 255, 255, 255]);
        }
        fn destroy(&mut self) {
            self.destroyed = true;
        }
        fn bounds(&self) -> Rect {
            self.bounds
        }
    }

    impl InputBox for Field {
        fn handle_event(&mut self, event: &InputEvent) {
            self.events.push(event.clone());
        }
    }

    #[derive(Default)]
    struct DrawLog {
        images: Vec<ImageId>,
    }

    impl Canvas for DrawLog {
        fn draw_image(&mut self, image: ImageId, _dest: Rect) {
            self.images.push(image);
        }
        fn fill_rect(&mut self, _rect: Rect, _color: Rgba) {}
    }

    //=====================================================================
    // Objects & Input Boxes
    //=====================================================================

    #[test]
    fn remove_unknown_object_fails() {
        let mut stage = Stage::new();
        let stray = sprite_at(0.0, 1);

        assert_eq!(stage.remove_object(&stray), Err(StageError::ObjectNotFound));
    }

    #[test]
    fn objects_render_in_list_order() {
        let mut stage = Stage::new();
        stage.add_object(sprite_at(0.0, 1));
        stage.add_object(sprite_at(0.0, 7));
        stage.add_object(sprite_at(0.0, 4));
        let mut log = DrawLog::default();

        stage.render_objects(&mut log, None);

        let ids: Vec<u32> = log.images.iter().map(|i| i.index()).collect();
        assert_eq!(ids, vec![7, 4, 1]);
    }

    #[test]
    fn input_box_is_also_an_object() {
        let mut stage = Stage::new();
        let field = Rc::new(RefCell::new(Field::default()));

        stage.add_input_box(field.clone());
        assert_eq!(stage.input_box_count(), 1);
        assert!(stage.contains_object(&field));

        stage.forward_to_input_boxes(&InputEvent::TextInput("hi".into()));
        assert_eq!(field.borrow().events.len(), 1);

        stage.remove_input_box(&field).unwrap();
        assert_eq!(stage.input_box_count(), 0);
        assert_eq!(stage.object_count(), 0);
        assert_eq!(stage.remove_input_box(&field), Err(StageError::InputBoxNotFound));
    }

    //=====================================================================
    // Collisions
    //=====================================================================

    #[test]
    fn collision_fires_every_overlapping_sweep() {
        let mut stage = Stage::new();
        let a = sprite_at(0.0, 0);
        let b = sprite_at(5.0, 0);
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        stage.on_collision(a.clone(), b.clone(), move |_, _, _| sink.set(sink.get() + 1));

        stage.sweep_collisions();
        stage.sweep_collisions();
        assert_eq!(hits.get(), 2);

        b.borrow_mut().move_to(50.0, 0.0);
        stage.sweep_collisions();
        assert_eq!(hits.get(), 2);
        assert_eq!(stage.collision_count(), 1, "Separated pairs stay registered");
    }

    #[test]
    fn handler_receives_pair_in_registration_order() {
        let mut stage = Stage::new();
        let a = sprite_at(0.0, 1);
        let b = sprite_at(5.0, 2);
        let seen = Rc::new(Cell::new((0, 0)));
        let sink = seen.clone();
        stage.on_collision(a, b, move |_, first, second| {
            sink.set((first.borrow().render_order(), second.borrow().render_order()))
        });

        stage.sweep_collisions();

        assert_eq!(seen.get(), (1, 2));
    }

    #[test]
    fn destroyed_pair_is_pruned_permanently() {
        let mut stage = Stage::new();
        let a = sprite_at(0.0, 0);
        let b = sprite_at(5.0, 0);
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        stage.on_collision(a.clone(), b.clone(), move |_, _, _| sink.set(sink.get() + 1));

        a.borrow_mut().destroy();
        stage.sweep_collisions();
        assert_eq!(hits.get(), 0);
        assert_eq!(stage.collision_count(), 0);

        // Revive: the pair must not come back.
        *a.borrow_mut() = Sprite::new(ImageId::new(0), Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        stage.sweep_collisions();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn dropped_object_reads_as_null() {
        let mut stage = Stage::new();
        let a = sprite_at(0.0, 0);
        let b = sprite_at(5.0, 0);
        stage.on_collision(a.clone(), b, |_, _, _| panic!("null participant must not fire"));

        stage.sweep_collisions();
        assert_eq!(stage.collision_count(), 0);
        assert!(!stage.has_collision(&a, &a));
    }

    #[test]
    fn reregistering_pair_replaces_handler() {
        let mut stage = Stage::new();
        let a = sprite_at(0.0, 0);
        let b = sprite_at(5.0, 0);
        let which = Rc::new(Cell::new(0));
        let first = which.clone();
        let second = which.clone();
        stage.on_collision(a.clone(), b.clone(), move |_, _, _| first.set(1));
        stage.on_collision(a.clone(), b.clone(), move |_, _, _| second.set(2));

        stage.sweep_collisions();

        assert_eq!(stage.collision_count(), 1);
        assert_eq!(which.get(), 2);
        assert!(stage.remove_collision(&a, &b));
        assert!(!stage.remove_collision(&a, &b));
    }

    #[test]
    fn handler_may_remove_objects_mid_sweep() {
        let mut stage = Stage::new();
        let a = sprite_at(0.0, 0);
        let b = sprite_at(5.0, 0);
        stage.add_object(a.clone());
        stage.add_object(b.clone());
        let victim = b.clone();
        stage.on_collision(a.clone(), b.clone(), move |stage, _, _| {
            victim.borrow_mut().destroy();
            stage.remove_object(&victim).unwrap();
        });

        stage.sweep_collisions();
        stage.sweep_collisions();

        assert_eq!(stage.object_count(), 1);
        assert_eq!(stage.collision_count(), 0);
    }

    #[test]
    fn pair_removed_by_earlier_handler_is_skipped() {
        let mut stage = Stage::new();
        let (a, b) = (sprite_at(0.0, 0), sprite_at(5.0, 0));
        let (c, d) = (sprite_at(100.0, 0), sprite_at(105.0, 0));
        let (target_c, target_d) = (c.clone(), d.clone());
        stage.on_collision(a, b, move |stage, _, _| {
            stage.remove_collision(&target_c, &target_d);
        });
        stage.on_collision(c.clone(), d.clone(), |_, _, _| panic!("removed pair must not fire"));

        stage.sweep_collisions();

        assert!(!stage.has_collision(&c, &d));
        assert_eq!(stage.collision_count(), 1);
    }

    #[test]
    fn pair_replaced_by_earlier_handler_uses_new_handler() {
        let mut stage = Stage::new();
        let (a, b) = (sprite_at(0.0, 0), sprite_at(5.0, 0));
        let (c, d) = (sprite_at(100.0, 0), sprite_at(105.0, 0));
        let which = Rc::new(Cell::new(0));
        let (target_c, target_d) = (c.clone(), d.clone());
        let replacement = which.clone();
        stage.on_collision(a, b, move |stage, _, _| {
            let sink = replacement.clone();
            stage.on_collision(target_c.clone(), target_d.clone(), move |_, _, _| sink.set(2));
        });
        let original = which.clone();
        stage.on_collision(c, d, move |_, _, _| original.set(1));

        stage.sweep_collisions();

        assert_eq!(which.get(), 2);
        assert_eq!(stage.collision_count(), 2);
    }

    //=====================================================================
    // Timers
    //=====================================================================

    #[test]
    fn finished_timers_leave_the_list() {
        let mut stage = Stage::new();
        let fired = Rc::new(Cell::new(0));
        let sink = fired.clone();
        stage.add_timer(1.0, move |_| sink.set(sink.get() + 1));

        stage.set_delta_time(0.6);
        stage.tick_timers();
        assert_eq!(stage.timer_count(), 1);

        stage.tick_timers();
        stage.tick_timers();
        assert_eq!(fired.get(), 1);
        assert_eq!(stage.timer_count(), 0);
    }

    #[test]
    fn timer_removed_by_earlier_callback_is_skipped() {
        let mut stage = Stage::new();
        let fired = Rc::new(Cell::new(false));
        let sink = fired.clone();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let target = slot.clone();

        stage.add_timer(0.0, move |stage| {
            if let Some(victim) = target.borrow().as_ref() {
                stage.remove_timer(victim).unwrap();
            }
        });
        let victim = stage.add_timer(0.0, move |_| sink.set(true));
        *slot.borrow_mut() = Some(victim.clone());

        stage.tick_timers();

        assert!(!fired.get());
        assert_eq!(stage.remove_timer(&victim), Err(StageError::TimerNotFound));
    }

    #[test]
    fn repeating_timer_removing_itself_stops_catch_up() {
        let mut stage = Stage::new();
        let fired = Rc::new(Cell::new(0));
        let sink = fired.clone();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let target = slot.clone();

        let handle = stage.add_timer_instance(
            Timer::new(0.5, move |stage| {
                sink.set(sink.get() + 1);
                if let Some(me) = target.borrow().as_ref() {
                    stage.remove_timer(me).unwrap();
                }
            })
            .repeating(),
        );
        *slot.borrow_mut() = Some(handle);

        stage.set_delta_time(1.6);
        stage.tick_timers();

        assert_eq!(fired.get(), 1);
        assert_eq!(stage.timer_count(), 0);
    }

    #[test]
    fn repeating_timer_fires_per_elapsed_period() {
        let mut stage = Stage::new();
        let fired = Rc::new(Cell::new(0));
        let sink = fired.clone();
        stage.add_timer_instance(Timer::new(0.5, move |_| sink.set(sink.get() + 1)).repeating());

        stage.set_delta_time(1.6);
        stage.tick_timers();
        assert_eq!(fired.get(), 3);

        stage.set_delta_time(0.4);
        stage.tick_timers();
        assert_eq!(fired.get(), 4);
    }

    #[test]
    fn timer_added_by_callback_starts_next_sweep() {
        let mut stage = Stage::new();
        let fired = Rc::new(Cell::new(0));
        let sink = fired.clone();
        stage.add_timer(0.0, move |stage| {
            let sink = sink.clone();
            stage.add_timer(0.0, move |_| sink.set(sink.get() + 1));
        });

        stage.tick_timers();
        assert_eq!(fired.get(), 0);
        assert_eq!(stage.timer_count(), 1);

        stage.tick_timers();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn timer_param_variant_registers() {
        let mut stage = Stage::new();
        let total = Rc::new(Cell::new(0));
        let sink = total.clone();
        stage.add_timer_with(0.0, 5, move |_, n: &mut i32| sink.set(*n));

        stage.tick_timers();

        assert_eq!(total.get(), 5);
    }

    #[test]
    fn quit_request_is_consumed() {
        let mut stage = Stage::new();
        stage.quit();
        assert!(stage.take_quit_request());
        assert!(!stage.take_quit_request());
    }
}
