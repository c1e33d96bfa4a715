//! Animation lifecycle for the particle background
//!
//! `ParticleAnimation::start` is the mount: it builds the field, draws once
//! and, unless reduced motion is requested, asks the host scheduler for the
//! next frame. Each `on_frame` updates, draws and re-schedules. `stop` is the
//! unmount: it cancels the pending frame and turns every later call into a
//! no-op.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::rngs::SmallRng;
use tracing::{debug, trace, warn};

use super::config::FieldConfig;
use super::particle::{Field, Viewport};
use super::render::{draw_frame, draw_static, FrameStats};
use super::surface::DrawingSurface;

/// Host service that runs a callback on the next display frame
pub trait FrameScheduler {
    type Handle: Copy + PartialEq + fmt::Debug;

    /// Ask for one callback on the next frame
    fn request_frame(&mut self) -> Self::Handle;

    /// Withdraw a previously requested frame
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// How the animation reacts to frames
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionMode {
    /// Update and redraw every frame
    Animated,
    /// Reduced motion: draw once, never schedule
    Static,
}

impl MotionMode {
    pub fn from_reduced_motion(reduced: bool) -> Self {
        if reduced {
            MotionMode::Static
        } else {
            MotionMode::Animated
        }
    }
}

/// A mounted particle background
pub struct ParticleAnimation<S: DrawingSurface, F: FrameScheduler> {
    config: FieldConfig,
    field: Field,
    surface: S,
    scheduler: F,
    rng: SmallRng,
    mode: MotionMode,
    /// Frame requested and not yet delivered
    pending: Option<F::Handle>,
    stopped: bool,
    frames: u64,
    last_stats: FrameStats,
}

impl<S: DrawingSurface, F: FrameScheduler> ParticleAnimation<S, F> {
    /// Mount the background.
    ///
    /// Returns None without doing any work when the host has no drawing
    /// surface or the config does not validate.
    pub fn start(
        surface: Option<S>,
        scheduler: F,
        viewport: Viewport,
        mode: MotionMode,
        config: FieldConfig,
        mut rng: SmallRng,
    ) -> Option<Self> {
        let Some(mut surface) = surface else {
            debug!("No drawing surface, particle background disabled");
            return None;
        };
        if let Err(e) = config.validate() {
            warn!(error = %e, "Invalid field config, particle background disabled");
            return None;
        }

        surface.resize(viewport);
        let field = Field::generate(viewport, &config, &mut rng);

        let mut animation = Self {
            config,
            field,
            surface,
            scheduler,
            rng,
            mode,
            pending: None,
            stopped: false,
            frames: 0,
            last_stats: FrameStats::default(),
        };

        debug!(?mode, particles = animation.field.len(), "Particle background started");

        match mode {
            MotionMode::Animated => animation.run_frame(),
            MotionMode::Static => {
                animation.last_stats =
                    draw_static(&animation.field, &animation.config, &mut animation.surface);
            }
        }

        Some(animation)
    }

    /// Frame callback from the host scheduler
    pub fn on_frame(&mut self) {
        self.pending = None;
        if self.stopped || self.mode == MotionMode::Static {
            trace!("Frame ignored");
            return;
        }
        self.run_frame();
    }

    /// Update-then-draw, then ask for the next frame
    fn run_frame(&mut self) {
        self.field.step();
        self.last_stats = draw_frame(&self.field, &self.config, &mut self.surface);
        self.frames += 1;
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    /// Viewport changed: resize the surface and regenerate the field
    pub fn resize(&mut self, viewport: Viewport) {
        if self.stopped {
            return;
        }
        self.surface.resize(viewport);
        self.field = Field::generate(viewport, &self.config, &mut self.rng);

        debug!(
            width = viewport.width,
            height = viewport.height,
            particles = self.field.len(),
            "Particle field regenerated after resize"
        );

        if self.mode == MotionMode::Static {
            self.last_stats = draw_static(&self.field, &self.config, &mut self.surface);
        }
    }

    /// Unmount. Safe to call any number of times.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
            trace!(?handle, "Pending frame cancelled");
        }
        if !self.stopped {
            self.stopped = true;
            debug!(frames = self.frames, "Particle background stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stopped && self.mode == MotionMode::Animated
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Frames drawn by the animated loop
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }
}

impl<S: DrawingSurface, F: FrameScheduler> Drop for ParticleAnimation<S, F> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bookkeeping behind [`ManualScheduler`]
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_handle: u64,
    pending: Option<u64>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler driven by hand: the owner decides when a frame is due.
///
/// Clones share state, so the driver keeps a clone while the animation owns
/// the other. Used by the headless CLI, the native preview and tests.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    frames: Rc<RefCell<ManualFrames>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending frame, if any. The caller then runs `on_frame`.
    pub fn take_due(&self) -> Option<u64> {
        self.frames.borrow_mut().pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.frames.borrow().pending.is_some()
    }

    pub fn requested(&self) -> u64 {
        self.frames.borrow().requested
    }

    pub fn cancelled(&self) -> u64 {
        self.frames.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u64;

    fn request_frame(&mut self) -> u64 {
        let mut frames = self.frames.borrow_mut();
        frames.next_handle += 1;
        frames.requested += 1;
        let handle = frames.next_handle;
        frames.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: u64) {
        let mut frames = self.frames.borrow_mut();
        if frames.pending == Some(handle) {
            frames.pending = None;
            frames.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::{CountingSurface, Paint};
    use rand::SeedableRng;
    use std::cell::Cell;

    /// Surface sharing its counters with the test
    #[derive(Clone, Default)]
    struct SharedCounter(Rc<RefCell<CountingSurface>>);

    impl DrawingSurface for SharedCounter {
        fn resize(&mut self, viewport: Viewport) {
            self.0.borrow_mut().resize(viewport)
        }
        fn clear(&mut self, viewport: Viewport) {
            self.0.borrow_mut().clear(viewport)
        }
        fn fill_circle(&mut self, center: [f32; 2], radius: f32, paint: Paint) {
            self.0.borrow_mut().fill_circle(center, radius, paint)
        }
        fn stroke_line(&mut self, from: [f32; 2], to: [f32; 2], width: f32, paint: Paint) {
            self.0.borrow_mut().stroke_line(from, to, width, paint)
        }
    }

    fn start(
        mode: MotionMode,
    ) -> (ParticleAnimation<SharedCounter, ManualScheduler>, SharedCounter, ManualScheduler) {
        let surface = SharedCounter::default();
        let scheduler = ManualScheduler::new();
        let animation = ParticleAnimation::start(
            Some(surface.clone()),
            scheduler.clone(),
            Viewport::new(1000.0, 800.0),
            mode,
            FieldConfig::default(),
            SmallRng::seed_from_u64(3),
        )
        .expect("surface available");
        (animation, surface, scheduler)
    }

    #[test]
    fn test_no_surface_is_noop() {
        let scheduler = ManualScheduler::new();
        let animation = ParticleAnimation::<CountingSurface, _>::start(
            None,
            scheduler.clone(),
            Viewport::new(1000.0, 800.0),
            MotionMode::Animated,
            FieldConfig::default(),
            SmallRng::seed_from_u64(0),
        );
        assert!(animation.is_none());
        assert_eq!(scheduler.requested(), 0);
    }

    #[test]
    fn test_animated_start_draws_and_schedules() {
        let (animation, surface, scheduler) = start(MotionMode::Animated);
        assert_eq!(animation.field().len(), 40);
        assert_eq!(animation.frames(), 1);
        assert_eq!(surface.0.borrow().circles, 40);
        assert_eq!(surface.0.borrow().resizes, 1);
        assert!(scheduler.is_pending());
        assert!(animation.is_running());
    }

    #[test]
    fn test_frames_keep_scheduling() {
        let (mut animation, surface, scheduler) = start(MotionMode::Animated);
        for _ in 0..10 {
            assert!(scheduler.take_due().is_some());
            animation.on_frame();
        }
        assert_eq!(animation.frames(), 11);
        assert_eq!(scheduler.requested(), 11);
        assert_eq!(surface.0.borrow().clears, 11);
        assert!(scheduler.is_pending());
    }

    #[test]
    fn test_stop_prevents_further_drawing() {
        let (mut animation, surface, scheduler) = start(MotionMode::Animated);
        animation.stop();
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.cancelled(), 1);

        let calls = surface.0.borrow().draw_calls();
        // Stale ticks after teardown
        for _ in 0..5 {
            animation.on_frame();
        }
        animation.resize(Viewport::new(300.0, 300.0));
        assert_eq!(surface.0.borrow().draw_calls(), calls);
        assert_eq!(scheduler.requested(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut animation, _surface, scheduler) = start(MotionMode::Animated);
        animation.stop();
        animation.stop();
        drop(animation);
        assert_eq!(scheduler.cancelled(), 1);
    }

    #[test]
    fn test_reduced_motion_draws_once() {
        let (mut animation, surface, scheduler) = start(MotionMode::Static);
        assert_eq!(scheduler.requested(), 0);
        assert_eq!(surface.0.borrow().clears, 1);
        assert_eq!(surface.0.borrow().circles, 40);
        assert_eq!(surface.0.borrow().lines, 0);
        assert!(!animation.is_running());

        let before = animation.field().particles().to_vec();
        animation.on_frame();
        assert_eq!(animation.field().particles(), &before[..]);
        assert_eq!(surface.0.borrow().clears, 1);
    }

    #[test]
    fn test_invalid_config_declines_to_start() {
        let surface = SharedCounter::default();
        let scheduler = ManualScheduler::new();
        let animation = ParticleAnimation::start(
            Some(surface.clone()),
            scheduler.clone(),
            Viewport::new(1000.0, 800.0),
            MotionMode::Animated,
            FieldConfig {
                radius: [2.0, 1.0],
                ..FieldConfig::default()
            },
            SmallRng::seed_from_u64(4),
        );
        assert!(animation.is_none());
        assert_eq!(*surface.0.borrow(), CountingSurface::default());
        assert_eq!(scheduler.requested(), 0);
    }

    #[test]
    fn test_reduced_motion_resize_redraws_once() {
        let (mut animation, surface, scheduler) = start(MotionMode::Static);
        animation.resize(Viewport::new(500.0, 400.0));

        let counts = surface.0.borrow().clone();
        assert_eq!(counts.clears, 2);
        assert_eq!(counts.lines, 0);
        assert_eq!(counts.circles, 40 + 20);
        assert_eq!(animation.field().len(), 20);
        assert_eq!(scheduler.requested(), 0);
        assert!(!animation.has_pending_frame());
    }

    #[test]
    fn test_resize_regenerates_from_scratch() {
        let (mut animation, surface, _scheduler) = start(MotionMode::Animated);
        animation.resize(Viewport::new(500.0, 400.0));
        assert_eq!(animation.field().len(), 20);
        assert_eq!(surface.0.borrow().resizes, 2);
        assert!(animation
            .field()
            .particles()
            .iter()
            .all(|p| animation.field().viewport().contains(p.position)));

        animation.resize(Viewport::new(4000.0, 400.0));
        assert_eq!(animation.field().len(), 60);
    }

    #[test]
    fn test_dropping_cancels_pending_frame() {
        let cancelled = Rc::new(Cell::new(false));

        struct Probe(Rc<Cell<bool>>);
        impl FrameScheduler for Probe {
            type Handle = u8;
            fn request_frame(&mut self) -> u8 {
                7
            }
            fn cancel_frame(&mut self, handle: u8) {
                assert_eq!(handle, 7);
                self.0.set(true);
            }
        }

        let animation = ParticleAnimation::start(
            Some(CountingSurface::new()),
            Probe(cancelled.clone()),
            Viewport::new(200.0, 200.0),
            MotionMode::Animated,
            FieldConfig::default(),
            SmallRng::seed_from_u64(9),
        );
        drop(animation);
        assert!(cancelled.get());
    }
}
