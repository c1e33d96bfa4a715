//! Browser host for the particle background
//!
//! Binds the core animation to a `<canvas>` 2D context, `requestAnimationFrame`,
//! the window `resize` event and the reduced-motion media query.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::core::{
    DrawingSurface, FieldConfig, FrameScheduler, LatchEvent, Motion, MotionMode, Paint,
    ParticleAnimation, Preset, Reveal, RevealLatch, Rgb, Viewport,
};
use crate::time::now_seconds;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type FrameCallback = Closure<dyn FnMut(f64)>;
type WebAnimation = ParticleAnimation<CanvasSurface, RafScheduler>;

/// Canvas 2D context as a drawing surface
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Last color converted to CSS, reused while it does not change
    css_color: Option<(Rgb, String)>,
}

impl CanvasSurface {
    /// None when the canvas has no 2D context
    pub fn attach(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            ctx,
            css_color: None,
        })
    }
}

/// CSS string for `color`, reused while the color does not change
fn css_color(cache: &mut Option<(Rgb, String)>, color: Rgb) -> &str {
    if !matches!(cache, Some((cached, _)) if *cached == color) {
        *cache = Some((color, color.to_string()));
    }
    cache.as_ref().map(|(_, css)| css.as_str()).unwrap_or("#000000")
}

impl DrawingSurface for CanvasSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
    }

    fn clear(&mut self, viewport: Viewport) {
        self.ctx
            .clear_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: f32, paint: Paint) {
        let css = css_color(&mut self.css_color, paint.color);
        let ctx = &self.ctx;
        ctx.begin_path();
        if let Err(e) = ctx.arc(
            center[0] as f64,
            center[1] as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            trace!(?e, "arc rejected");
            return;
        }
        ctx.set_fill_style_str(css);
        ctx.set_global_alpha(paint.alpha as f64);
        ctx.fill();
    }

    fn stroke_line(&mut self, from: [f32; 2], to: [f32; 2], width: f32, paint: Paint) {
        let css = css_color(&mut self.css_color, paint.color);
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.set_stroke_style_str(css);
        ctx.set_global_alpha(paint.alpha as f64);
        ctx.set_line_width(width as f64);
        ctx.move_to(from[0] as f64, from[1] as f64);
        ctx.line_to(to[0] as f64, to[1] as f64);
        ctx.stroke();
    }
}

/// `requestAnimationFrame` with a single shared callback
pub struct RafScheduler {
    window: Window,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> i32 {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return 0;
        };
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .unwrap_or_else(|e| {
                warn!(?e, "requestAnimationFrame failed");
                0
            })
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            debug!(?e, handle, "cancelAnimationFrame failed");
        }
    }
}

/// Live resources of a mounted background
struct Mounted {
    window: Window,
    animation: Rc<RefCell<Option<WebAnimation>>>,
    frame_callback: Rc<RefCell<Option<FrameCallback>>>,
    resize_listener: Closure<dyn FnMut()>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Err(e) = self
            .window
            .remove_event_listener_with_callback("resize", self.resize_listener.as_ref().unchecked_ref())
        {
            warn!(?e, "Failed to detach resize listener");
        }
        // Dropping the animation cancels its pending frame
        self.animation.borrow_mut().take();
        self.frame_callback.borrow_mut().take();
        debug!("Particle background unmounted");
    }
}

/// JavaScript handle to a mounted background
#[wasm_bindgen]
pub struct BackgroundHandle {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl BackgroundHandle {
    /// Cancel the animation and detach listeners. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.mounted.take();
    }

    /// False when mounting was declined or after `stop`
    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.mounted.is_some()
    }
}

/// Mount the default (ambient) background on the canvas with id `canvas_id`
#[wasm_bindgen]
pub fn mount_background(canvas_id: &str) -> BackgroundHandle {
    mount(canvas_id, FieldConfig::default())
}

/// Mount with a named preset (`classic` or `ambient`)
#[wasm_bindgen]
pub fn mount_background_preset(canvas_id: &str, preset: &str) -> BackgroundHandle {
    let preset = Preset::from_name(preset).unwrap_or_else(|| {
        warn!(preset, "Unknown preset, using default");
        Preset::default()
    });
    mount(canvas_id, preset.config())
}

/// Mount with a JSON config; invalid configs fall back to the default
#[wasm_bindgen]
pub fn mount_background_with_config(canvas_id: &str, config_json: &str) -> BackgroundHandle {
    let config = FieldConfig::from_json(config_json).unwrap_or_else(|e| {
        warn!(error = %e, "Rejected field config, using default");
        FieldConfig::default()
    });
    mount(canvas_id, config)
}

fn mount(canvas_id: &str, config: FieldConfig) -> BackgroundHandle {
    let mounted = try_mount(canvas_id, config);
    if mounted.is_none() {
        debug!(canvas_id, "Particle background not mounted");
    }
    BackgroundHandle { mounted }
}

fn try_mount(canvas_id: &str, config: FieldConfig) -> Option<Mounted> {
    let window = web_sys::window()?;
    let canvas = window
        .document()?
        .get_element_by_id(canvas_id)?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;

    let surface = CanvasSurface::attach(canvas.clone())?;

    let viewport = viewport_of(&window);
    let mode = MotionMode::from_reduced_motion(prefers_reduced_motion(&window));
    let animation: Rc<RefCell<Option<WebAnimation>>> = Rc::new(RefCell::new(None));

    // The frame callback must exist before start() requests the first frame
    let frame_callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(&animation);
    *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        if let Some(slot) = weak.upgrade() {
            if let Some(animation) = slot.borrow_mut().as_mut() {
                animation.on_frame();
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let scheduler = RafScheduler {
        window: window.clone(),
        callback: frame_callback.clone(),
    };
    let started = ParticleAnimation::start(
        Some(surface),
        scheduler,
        viewport,
        mode,
        config,
        SmallRng::from_entropy(),
    )?;
    // Only a running background restyles the page's canvas
    mark_decorative(&canvas);
    *animation.borrow_mut() = Some(started);

    let weak = Rc::downgrade(&animation);
    let resize_window = window.clone();
    let resize_listener = Closure::wrap(Box::new(move || {
        let viewport = viewport_of(&resize_window);
        if let Some(slot) = weak.upgrade() {
            if let Some(animation) = slot.borrow_mut().as_mut() {
                animation.resize(viewport);
            }
        }
    }) as Box<dyn FnMut()>);

    let mounted = Mounted {
        window,
        animation,
        frame_callback,
        resize_listener,
    };
    // On failure `mounted` drops here and tears everything down
    mounted
        .window
        .add_event_listener_with_callback("resize", mounted.resize_listener.as_ref().unchecked_ref())
        .map_err(|e| warn!(?e, "Failed to attach resize listener"))
        .ok()?;

    info!(
        canvas_id,
        ?mode,
        width = viewport.width,
        height = viewport.height,
        "Particle background mounted"
    );
    Some(mounted)
}

fn viewport_of(window: &Window) -> Viewport {
    let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(
        dimension(window.inner_width()) as f32,
        dimension(window.inner_height()) as f32,
    )
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

/// Full-viewport layer under the page, hidden from assistive technology
fn mark_decorative(canvas: &HtmlCanvasElement) {
    if let Err(e) = canvas.set_attribute("aria-hidden", "true") {
        debug!(?e, "Failed to set aria-hidden");
    }
    let style = canvas.style();
    for (property, value) in [
        ("position", "fixed"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("pointer-events", "none"),
        ("z-index", "-1"),
    ] {
        if let Err(e) = style.set_property(property, value) {
            debug!(?e, property, "Failed to set canvas style");
        }
    }
}

/// Scroll reveal for one page section, driven from JavaScript.
///
/// Feed it the section's bounding rect on scroll; once `observe` returns
/// true the caller unsubscribes and reads `style()` each frame.
#[wasm_bindgen]
pub struct SectionReveal {
    latch: RevealLatch,
    reveal: Reveal,
    revealed_at: Option<f64>,
}

#[wasm_bindgen]
impl SectionReveal {
    /// `motion`: fade_in_up, fade_in, scale_in, slide_in_left or slide_in_right
    #[wasm_bindgen(constructor)]
    pub fn new(motion: &str, delay: f32) -> SectionReveal {
        let motion = serde_json::from_value::<Motion>(serde_json::Value::String(motion.to_owned()))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Unknown motion, using fade_in_up");
                Motion::FadeInUp
            });
        SectionReveal {
            latch: RevealLatch::default(),
            reveal: Reveal::new(motion).with_delay(delay),
            revealed_at: None,
        }
    }

    /// True exactly once, when the section first enters the viewport
    pub fn observe(&mut self, top: f32, bottom: f32, viewport_height: f32) -> bool {
        match self.latch.observe(top, bottom, viewport_height) {
            LatchEvent::Revealed => {
                self.revealed_at = Some(now_seconds());
                true
            }
            LatchEvent::Hidden | LatchEvent::AlreadyVisible => false,
        }
    }

    /// Current style as JSON: `{"opacity":..,"offset":[x,y],"scale":..}`
    pub fn style(&self) -> String {
        let style = match self.revealed_at {
            Some(at) => self.reveal.style_at((now_seconds() - at) as f32),
            None => self.reveal.motion.hidden(),
        };
        serde_json::to_string(&style).unwrap_or_default()
    }
}
