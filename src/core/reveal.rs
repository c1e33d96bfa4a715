//! Scroll-triggered entrance motions for page sections
//!
//! A section starts hidden, its `RevealLatch` watches it against the viewport
//! and flips once on first intersection. From then on the section's `Reveal`
//! interpolates from the motion's hidden style to fully visible.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Margin applied to the viewport before intersecting, in px. Negative
/// shrinks the viewport so a section must be 50px inside to count.
pub const DEFAULT_MARGIN: f32 = -50.0;

/// Visual state of a revealed element
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub opacity: f32,
    /// Translation in px
    pub offset: [f32; 2],
    pub scale: f32,
}

impl Style {
    pub const VISIBLE: Style = Style {
        opacity: 1.0,
        offset: [0.0, 0.0],
        scale: 1.0,
    };

    fn lerp(from: Style, to: Style, t: f32) -> Style {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Style {
            opacity: mix(from.opacity, to.opacity),
            offset: [mix(from.offset[0], to.offset[0]), mix(from.offset[1], to.offset[1])],
            scale: mix(from.scale, to.scale),
        }
    }
}

/// Entrance presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    FadeInUp,
    FadeIn,
    ScaleIn,
    SlideInLeft,
    SlideInRight,
}

impl Motion {
    /// Style before the element is revealed
    pub fn hidden(self) -> Style {
        let base = Style {
            opacity: 0.0,
            ..Style::VISIBLE
        };
        match self {
            Motion::FadeInUp => Style {
                offset: [0.0, 20.0],
                ..base
            },
            Motion::FadeIn => base,
            Motion::ScaleIn => Style { scale: 0.95, ..base },
            Motion::SlideInLeft => Style {
                offset: [-30.0, 0.0],
                ..base
            },
            Motion::SlideInRight => Style {
                offset: [30.0, 0.0],
                ..base
            },
        }
    }

    /// Transition length in seconds
    pub fn duration(self) -> f32 {
        match self {
            Motion::ScaleIn => 0.4,
            _ => 0.5,
        }
    }
}

/// `cubic-bezier(0, 0, 0.58, 1)`, the CSS ease-out curve
pub fn ease_out(t: f32) -> f32 {
    const X2: f32 = 0.58;

    let t = t.clamp(0.0, 1.0);
    let bezier_x = |s: f32| 3.0 * (1.0 - s) * s * s * X2 + s * s * s;

    // x(s) is monotonic on [0, 1]; bisect for the curve parameter
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..24 {
        let mid = (lo + hi) * 0.5;
        if bezier_x(mid) < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let s = (lo + hi) * 0.5;
    (3.0 * (1.0 - s) * s * s + s * s * s).clamp(0.0, 1.0)
}

/// One element's entrance: motion plus start delay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reveal {
    pub motion: Motion,
    /// Seconds between becoming visible and starting the motion
    pub delay: f32,
}

impl Reveal {
    pub fn new(motion: Motion) -> Self {
        Self { motion, delay: 0.0 }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Style `elapsed` seconds after the latch fired
    pub fn style_at(&self, elapsed: f32) -> Style {
        let t = (elapsed - self.delay) / self.motion.duration();
        if !(t > 0.0) {
            return self.motion.hidden();
        }
        if t >= 1.0 {
            return Style::VISIBLE;
        }
        Style::lerp(self.motion.hidden(), Style::VISIBLE, ease_out(t))
    }

    pub fn is_finished(&self, elapsed: f32) -> bool {
        elapsed >= self.delay + self.motion.duration()
    }
}

/// Child delays for a staggered group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    /// Delay before the first child
    pub delay_children: f32,
    /// Extra delay per child index
    pub stagger_children: f32,
}

impl Default for Stagger {
    fn default() -> Self {
        Self {
            delay_children: 0.1,
            stagger_children: 0.1,
        }
    }
}

impl Stagger {
    pub fn delay_for(&self, index: usize) -> f32 {
        self.delay_children + index as f32 * self.stagger_children
    }

    /// Reveal for child `index`, staggered children fade in upward
    pub fn child(&self, index: usize) -> Reveal {
        Reveal::new(Motion::FadeInUp).with_delay(self.delay_for(index))
    }
}

/// Result of feeding one observation to a [`RevealLatch`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatchEvent {
    /// Not yet in view
    Hidden,
    /// Just became visible; the observer should unsubscribe now
    Revealed,
    /// Already latched earlier; observation ignored
    AlreadyVisible,
}

/// One-shot visibility flag
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealLatch {
    margin: f32,
    visible: bool,
}

impl Default for RevealLatch {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl RevealLatch {
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Observe an element spanning `top..bottom` (viewport coordinates)
    pub fn observe(&mut self, top: f32, bottom: f32, viewport_height: f32) -> LatchEvent {
        if self.visible {
            return LatchEvent::AlreadyVisible;
        }

        let view_top = -self.margin;
        let view_bottom = viewport_height + self.margin;
        if bottom > view_top && top < view_bottom {
            self.visible = true;
            debug!(top, bottom, viewport_height, "Section revealed");
            LatchEvent::Revealed
        } else {
            LatchEvent::Hidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_fires_once() {
        let mut latch = RevealLatch::default();
        assert_eq!(latch.observe(900.0, 1200.0, 800.0), LatchEvent::Hidden);
        // Inside the viewport but within the 50px margin
        assert_eq!(latch.observe(760.0, 1060.0, 800.0), LatchEvent::Hidden);
        assert!(!latch.is_visible());

        assert_eq!(latch.observe(700.0, 1000.0, 800.0), LatchEvent::Revealed);
        assert!(latch.is_visible());

        // Scrolling away never hides it again
        assert_eq!(latch.observe(2000.0, 2300.0, 800.0), LatchEvent::AlreadyVisible);
        assert!(latch.is_visible());
    }

    #[test]
    fn test_latch_above_viewport() {
        let mut latch = RevealLatch::new(0.0);
        assert_eq!(latch.observe(-300.0, -1.0, 800.0), LatchEvent::Hidden);
        assert_eq!(latch.observe(-300.0, 1.0, 800.0), LatchEvent::Revealed);
    }

    #[test]
    fn test_ease_out_endpoints() {
        assert!(ease_out(0.0).abs() < 1e-6);
        assert!((ease_out(1.0) - 1.0).abs() < 1e-4);
        assert!(ease_out(0.5) > 0.5);
        let mut prev = 0.0;
        for i in 1..=20 {
            let v = ease_out(i as f32 / 20.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_reveal_interpolates() {
        let reveal = Reveal::new(Motion::FadeInUp).with_delay(0.2);
        assert_eq!(reveal.style_at(0.0), Motion::FadeInUp.hidden());
        assert_eq!(reveal.style_at(0.2), Motion::FadeInUp.hidden());
        assert_eq!(reveal.style_at(0.8), Style::VISIBLE);
        assert!(reveal.is_finished(0.8));
        assert!(!reveal.is_finished(0.5));

        let mid = reveal.style_at(0.45);
        assert!(mid.opacity > 0.0 && mid.opacity < 1.0);
        assert!(mid.offset[1] > 0.0 && mid.offset[1] < 20.0);
    }

    #[test]
    fn test_motion_presets() {
        assert_eq!(Motion::ScaleIn.hidden().scale, 0.95);
        assert_eq!(Motion::ScaleIn.duration(), 0.4);
        assert_eq!(Motion::SlideInLeft.hidden().offset, [-30.0, 0.0]);
        assert_eq!(Motion::SlideInRight.hidden().offset, [30.0, 0.0]);
        assert_eq!(Motion::FadeIn.hidden().offset, [0.0, 0.0]);
    }

    #[test]
    fn test_stagger_delays() {
        let stagger = Stagger::default();
        assert!((stagger.delay_for(0) - 0.1).abs() < 1e-6);
        assert!((stagger.delay_for(3) - 0.4).abs() < 1e-6);
        assert_eq!(stagger.child(2).motion, Motion::FadeInUp);
    }
}
