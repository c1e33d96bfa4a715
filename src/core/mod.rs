//! Platform-agnostic core - shared between the browser background, CLI and preview

pub mod animation;
pub mod config;
pub mod particle;
pub mod render;
pub mod reveal;
pub mod surface;

pub use animation::{FrameScheduler, ManualScheduler, MotionMode, ParticleAnimation};
pub use config::{ConfigError, FieldConfig, Preset};
pub use particle::{Field, Particle, Viewport};
pub use render::{draw_frame, draw_static, link_opacity, FrameStats};
pub use reveal::{LatchEvent, Motion, Reveal, RevealLatch, Stagger, Style};
pub use surface::{CountingSurface, DrawingSurface, Paint, Rgb};
