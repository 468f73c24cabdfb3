//=========================================================================
// Aetheric Arcade Engine
//
// Main entry point and coordinator for the frame loop.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──start(update)──>  [frames]
//         │                          │
//         ├─ with_title()            ├─ Backend     (window, clock, input, drawing)
//         ├─ with_screen()           ├─ Dispatcher  (key / pointer handlers)
//         └─ with_frame_cap()        └─ Stage       (objects, collisions, timers)
// ```
//
// Frame:
// ```text
//   delta_time → drain events → held keys → collisions → timers
//     → background → update(&mut Stage) → objects → present
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::{Dispatcher, KeyCode, KeyTrigger, MouseEventKind};
use crate::core::object::{object_addr, GameObject, InputBox, ObjectRef, Sprite};
use crate::core::platform_bridge::{Backend, ImageId, PlatformError, Screen};
use crate::core::stage::{Stage, StageError, Timer, TimerHandle};
use crate::core::TickControl;

//=== Process-Wide Slot ===================================================

/// Set while an [`Engine`] exists.
static ENGINE_ACTIVE: AtomicBool = AtomicBool::new(false);

//=== EngineError =========================================================

/// Errors surfaced by the engine facade.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Another engine is alive in this process.
    #[error("only one engine may exist per process")]
    AlreadyInstantiated,

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Title**: "Aetheric Arcade"
/// - **Screen**: none (call [`Engine::create_screen`] later)
/// - **Frame cap**: none (frames run back to back)
///
/// # Examples
///
/// ```
/// use aetheric_arcade::{EngineBuilder, HeadlessBackend};
///
/// let mut engine = EngineBuilder::new(HeadlessBackend::new())
///     .with_title("Pong")
///     .with_screen(640, 480)
///     .build()
///     .unwrap();
///
/// engine.start(|stage| stage.quit()).unwrap();
/// ```
pub struct EngineBuilder<B: Backend> {
    backend: B,
    title: String,
    screen: Option<(u32, u32)>,
    frame_cap: Option<f64>,
}

impl<B: Backend> EngineBuilder<B> {
    /// Creates a new builder with default settings.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            title: String::from("Aetheric Arcade"),
            screen: None,
            frame_cap: None,
        }
    }

    /// Sets the window caption.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Creates the screen at build time.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_screen(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Screen size must be positive, got {}x{}", width, height);
        self.screen = Some((width, height));
        self
    }

    /// Limits the loop to `fps` frames per second by sleeping off the
    /// rest of each frame.
    ///
    /// # Panics
    ///
    /// Panics if `fps <= 0.0`.
    pub fn with_frame_cap(mut self, fps: f64) -> Self {
        assert!(fps > 0.0, "Frame cap must be positive, got {}", fps);
        self.frame_cap = Some(fps);
        self
    }

    /// Builds the engine instance.
    ///
    /// Fails with [`EngineError::AlreadyInstantiated`] if another engine
    /// is alive, or with a platform error if the backend cannot start.
    pub fn build(self) -> Result<Engine<B>, EngineError> {
        info!(
            target: "engine",
            "Building engine (title: {:?}, screen: {:?}, frame cap: {:?})",
            self.title, self.screen, self.frame_cap
        );

        let mut engine = Engine::new(self.backend)?;
        engine.frame_cap = self.frame_cap;
        engine.set_title(&self.title);

        if let Some((width, height)) = self.screen {
            engine.create_screen(width, height)?;
        }

        Ok(engine)
    }
}

//=== Engine ==============================================================

struct Background {
    object: ObjectRef,
    /// Set when the engine loaded the image and must release it.
    image: Option<ImageId>,
}

/// Aetheric Arcade runtime.
///
/// Owns a backend, the input handler registries and the [`Stage`]. At most
/// one engine exists per process; dropping it frees the slot.
pub struct Engine<B: Backend> {
    backend: B,
    dispatcher: Dispatcher,
    stage: Stage,
    background: Option<Background>,
    frame_cap: Option<f64>,
    last_tick: u64,
}

impl<B: Backend> Engine<B> {
    //--- Construction -----------------------------------------------------

    /// Creates the engine and initializes the backend.
    ///
    /// A second engine is rejected while the first is alive: the attempt is
    /// logged and [`EngineError::AlreadyInstantiated`] returned, leaving the
    /// first engine untouched.
    pub fn new(backend: B) -> Result<Self, EngineError> {
        if ENGINE_ACTIVE.swap(true, Ordering::AcqRel) {
            error!(target: "engine", "Can only instantiate one engine per process");
            return Err(EngineError::AlreadyInstantiated);
        }

        let mut engine = Self {
            backend,
            dispatcher: Dispatcher::new(),
            stage: Stage::new(),
            background: None,
            frame_cap: None,
            last_tick: 0,
        };

        // On failure `engine` is dropped, which releases the slot.
        engine.backend.init()?;
        info!(target: "engine", "Engine initialized");

        Ok(engine)
    }

    //--- Accessors --------------------------------------------------------

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Seconds between the two most recent frames.
    pub fn delta_time(&self) -> f64 {
        self.stage.delta_time()
    }

    //--- Screen & Window --------------------------------------------------

    /// Creates the drawable surface.
    pub fn create_screen(&mut self, width: u32, height: u32) -> Result<Screen, EngineError> {
        let screen = self.backend.create_screen(width, height)?;
        self.stage.set_screen(screen);
        info!(target: "engine", "Screen created: {}x{}", screen.width, screen.height);
        Ok(screen)
    }

    /// Sets the window caption.
    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Loads an image through the backend.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<ImageId, EngineError> {
        Ok(self.backend.load_image(path.as_ref())?)
    }

    //--- Background -------------------------------------------------------

    /// Replaces the background with the image at `path`.
    ///
    /// The previous background is destroyed and its image released before
    /// the new one is loaded. The new background covers the screen (or
    /// keeps the image's natural size if no screen exists yet).
    pub fn set_background(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        self.clear_background();

        let image = self.backend.load_image(path.as_ref())?;
        let viewport = match self.stage.screen() {
            Some(screen) => screen.viewport(),
            None => {
                let (width, height) = self.backend.image_size(image).unwrap_or((0, 0));
                Screen { width, height }.viewport()
            }
        };

        let sprite: ObjectRef = Rc::new(RefCell::new(Sprite::background(image, viewport)));
        self.background = Some(Background {
            object: sprite,
            image: Some(image),
        });
        info!(target: "engine", "Background set from {}", path.as_ref().display());

        Ok(())
    }

    /// Uses `object` as the background, destroying the previous one.
    ///
    /// The caller keeps ownership of any image the object draws.
    pub fn set_background_object(&mut self, object: ObjectRef) {
        self.clear_background();
        self.background = Some(Background { object, image: None });
        info!(target: "engine", "Background object set");
    }

    /// The current background, if any.
    pub fn background(&self) -> Option<ObjectRef> {
        self.background.as_ref().map(|bg| bg.object.clone())
    }

    fn clear_background(&mut self) {
        if let Some(previous) = self.background.take() {
            previous.object.borrow_mut().destroy();
            if let Some(image) = previous.image {
                self.backend.release_image(image);
            }
            debug!(target: "engine", "Previous background destroyed");
        }
    }

    //--- Handler Registration ---------------------------------------------

    /// Fires every frame while `key` is held.
    pub fn on_key_down<F>(&mut self, key: KeyCode, handler: F)
    where
        F: FnMut(&mut Stage) + 'static,
    {
        self.dispatcher.on_key(KeyTrigger::Held(key), handler);
    }

    /// Fires when `key` is released.
    pub fn on_key_up<F>(&mut self, key: KeyCode, handler: F)
    where
        F: FnMut(&mut Stage) + 'static,
    {
        self.dispatcher.on_key(KeyTrigger::Released(key), handler);
    }

    /// Fires once per press of `key`.
    pub fn on_key_pressed<F>(&mut self, key: KeyCode, handler: F)
    where
        F: FnMut(&mut Stage) + 'static,
    {
        self.dispatcher.on_key(KeyTrigger::Pressed(key), handler);
    }

    /// Fires with the cursor position on every mouse motion event.
    pub fn on_mouse_move<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Stage, f32, f32) + 'static,
    {
        self.dispatcher.on_pointer(MouseEventKind::Move, handler);
    }

    /// Fires with the cursor position on every mouse button press.
    pub fn on_mouse_click<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Stage, f32, f32) + 'static,
    {
        self.dispatcher.on_pointer(MouseEventKind::Click, handler);
    }

    /// Registers a pointer handler for `kind`.
    pub fn on_mouse<F>(&mut self, kind: MouseEventKind, handler: F)
    where
        F: FnMut(&mut Stage, f32, f32) + 'static,
    {
        self.dispatcher.on_pointer(kind, handler);
    }

    /// See [`Stage::on_collision`].
    pub fn on_collision<F>(&mut self, first: ObjectRef, second: ObjectRef, handler: F)
    where
        F: FnMut(&mut Stage, &ObjectRef, &ObjectRef) + 'static,
    {
        self.stage.on_collision(first, second, handler);
    }

    //--- Registries -------------------------------------------------------

    pub fn add_object(&mut self, object: ObjectRef) {
        self.stage.add_object(object);
    }

    pub fn remove_object<T>(&mut self, object: &Rc<RefCell<T>>) -> Result<(), EngineError>
    where
        T: GameObject + ?Sized,
    {
        Ok(self.stage.remove_object(object)?)
    }

    pub fn add_input_box<T>(&mut self, input_box: Rc<RefCell<T>>)
    where
        T: InputBox + 'static,
    {
        self.stage.add_input_box(input_box);
    }

    pub fn remove_input_box<T>(&mut self, input_box: &Rc<RefCell<T>>) -> Result<(), EngineError>
    where
        T: InputBox + ?Sized,
    {
        Ok(self.stage.remove_input_box(input_box)?)
    }

    pub fn add_timer<F>(&mut self, duration: f64, callback: F) -> TimerHandle
    where
        F: FnMut(&mut Stage) + 'static,
    {
        self.stage.add_timer(duration, callback)
    }

    pub fn add_timer_with<P, F>(&mut self, duration: f64, param: P, callback: F) -> TimerHandle
    where
        P: 'static,
        F: FnMut(&mut Stage, &mut P) + 'static,
    {
        self.stage.add_timer_with(duration, param, callback)
    }

    pub fn add_timer_instance(&mut self, timer: Timer) -> TimerHandle {
        self.stage.add_timer_instance(timer)
    }

    pub fn remove_timer(&mut self, timer: &TimerHandle) -> Result<(), EngineError> {
        Ok(self.stage.remove_timer(timer)?)
    }

    //--- Execution --------------------------------------------------------

    /// Runs frames until a quit event arrives or a handler calls
    /// [`Stage::quit`]. The frame that sees the quit is always finished.
    pub fn start<F>(&mut self, mut update: F) -> Result<(), EngineError>
    where
        F: FnMut(&mut Stage),
    {
        info!(target: "engine", "Starting frame loop");

        let mut frames: u64 = 0;
        loop {
            frames += 1;
            if self.frame(&mut update)? == TickControl::Exit {
                break;
            }
        }

        info!(target: "engine", "Frame loop exited after {} frames", frames);
        Ok(())
    }

    /// Runs a single frame.
    pub fn frame<F>(&mut self, update: &mut F) -> Result<TickControl, EngineError>
    where
        F: FnMut(&mut Stage) + ?Sized,
    {
        let frame_start = Instant::now();
        let mut control = TickControl::Continue;

        //--- 1. Timing ----------------------------------------------------
        let now = self.backend.ticks();
        self.stage
            .set_delta_time(now.saturating_sub(self.last_tick) as f64 / 1000.0);
        self.last_tick = now;

        //--- 2. Input events ----------------------------------------------
        let events = self.backend.poll_events();
        if !events.is_empty() {
            trace!(target: "engine", "Dispatching {} events", events.len());
        }

        for event in &events {
            let backend = &self.backend;
            if self
                .dispatcher
                .dispatch(event, &mut self.stage, || backend.mouse_position())
                == TickControl::Exit
            {
                control = TickControl::Exit;
            }
        }

        //--- 3. Held keys -------------------------------------------------
        self.dispatcher.fire_held(&mut self.stage);

        //--- 4. Collisions ------------------------------------------------
        self.stage.sweep_collisions();

        //--- 5. Timers ----------------------------------------------------
        self.stage.tick_timers();

        //--- 6. Background ------------------------------------------------
        if let Some(background) = &self.background {
            background.object.borrow_mut().render(&mut self.backend);
        }

        //--- 7. Caller logic ----------------------------------------------
        update(&mut self.stage);

        //--- 8. Objects ---------------------------------------------------
        let skip = self.background.as_ref().map(|bg| object_addr(&bg.object));
        self.stage.render_objects(&mut self.backend, skip);

        //--- 9. Present ---------------------------------------------------
        self.backend.present()?;

        if self.stage.take_quit_request() {
            control = TickControl::Exit;
        }

        //--- 10. Pacing ---------------------------------------------------
        if let Some(fps) = self.frame_cap {
            let budget = Duration::from_secs_f64(1.0 / fps);
            let elapsed = frame_start.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            }
        }

        Ok(control)
    }
}

impl<B: Backend> Drop for Engine<B> {
    fn drop(&mut self) {
        ENGINE_ACTIVE.store(false, Ordering::Release);
        debug!(target: "engine", "Engine dropped");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
