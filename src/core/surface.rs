//! Drawing surface abstraction
//!
//! The renderer only needs four primitives from its host: resize, clear,
//! filled circle and stroked line. The browser canvas, the egui preview and
//! the headless counting surface all implement this trait.

use std::fmt;

use super::particle::Viewport;

/// 24-bit sRGB color, serialized as `#rrggbb`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color plus alpha for a single primitive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub color: Rgb,
    /// Opacity in [0, 1]
    pub alpha: f32,
}

impl Paint {
    pub fn new(color: Rgb, alpha: f32) -> Self {
        Self { color, alpha }
    }
}

/// 2D drawing context sized to the viewport
pub trait DrawingSurface {
    /// Match the backing store to a new viewport size
    fn resize(&mut self, viewport: Viewport);

    /// Erase the whole surface
    fn clear(&mut self, viewport: Viewport);

    fn fill_circle(&mut self, center: [f32; 2], radius: f32, paint: Paint);

    fn stroke_line(&mut self, from: [f32; 2], to: [f32; 2], width: f32, paint: Paint);
}

/// Surface that draws nothing and only counts primitive calls.
///
/// Backs the headless CLI and works as a call-count probe in tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountingSurface {
    pub resizes: u64,
    pub clears: u64,
    pub circles: u64,
    pub lines: u64,
}

impl CountingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total draw calls (circles + lines)
    pub fn draw_calls(&self) -> u64 {
        self.circles + self.lines
    }
}

impl DrawingSurface for CountingSurface {
    fn resize(&mut self, _viewport: Viewport) {
        self.resizes += 1;
    }

    fn clear(&mut self, _viewport: Viewport) {
        self.clears += 1;
    }

    fn fill_circle(&mut self, _center: [f32; 2], _radius: f32, _paint: Paint) {
        self.circles += 1;
    }

    fn stroke_line(&mut self, _from: [f32; 2], _to: [f32; 2], _width: f32, _paint: Paint) {
        self.lines += 1;
    }
}
