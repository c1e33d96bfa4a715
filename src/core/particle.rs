//! Particle field state
//!
//! - Particle: point with fixed velocity, radius and opacity
//! - Field: the particle set for one viewport size, regenerated on resize

use rand::Rng;
use tracing::{debug, trace, warn};

use super::config::FieldConfig;

/// Drawable area in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        // NaN and negative sizes collapse to an empty viewport
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn contains(&self, position: [f32; 2]) -> bool {
        (0.0..self.width).contains(&position[0]) && (0.0..self.height).contains(&position[1])
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: [f32; 2],
    velocity: [f32; 2],
    radius: f32,
    opacity: f32,
}

impl Particle {
    pub fn new(position: [f32; 2], velocity: [f32; 2], radius: f32, opacity: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            opacity,
        }
    }

    /// Sample a particle uniformly within the viewport and config ranges
    pub fn random<R: Rng + ?Sized>(viewport: Viewport, config: &FieldConfig, rng: &mut R) -> Self {
        let speed = config.max_speed;
        Self {
            position: [
                sample_extent(rng, viewport.width),
                sample_extent(rng, viewport.height),
            ],
            velocity: [rng.gen_range(-speed..=speed), rng.gen_range(-speed..=speed)],
            radius: rng.gen_range(config.radius[0]..=config.radius[1]),
            opacity: rng.gen_range(config.opacity[0]..=config.opacity[1]),
        }
    }

    #[inline]
    pub fn velocity(&self) -> [f32; 2] {
        self.velocity
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Advance one frame and wrap toroidally into the viewport
    #[inline]
    pub fn step(&mut self, viewport: Viewport) {
        self.position[0] = wrap(self.position[0] + self.velocity[0], viewport.width);
        self.position[1] = wrap(self.position[1] + self.velocity[1], viewport.height);
    }
}

fn sample_extent<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

/// Wrap a coordinate into [0, extent), carrying any overshoot
#[inline]
pub fn wrap(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negative inputs up to exactly `extent`
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// The particle set for one viewport size
#[derive(Clone, Debug)]
pub struct Field {
    particles: Vec<Particle>,
    viewport: Viewport,
}

impl Field {
    /// Number of particles for a viewport: min(max, floor(width / divisor))
    pub fn particle_count(viewport: Viewport, config: &FieldConfig) -> usize {
        let by_width = (viewport.width / config.density_divisor).floor();
        if by_width.is_finite() && by_width > 0.0 {
            (by_width as usize).min(config.max_particles)
        } else {
            0
        }
    }

    /// Generate a fresh field for the viewport.
    ///
    /// An invalid config yields an empty field.
    pub fn generate<R: Rng + ?Sized>(viewport: Viewport, config: &FieldConfig, rng: &mut R) -> Self {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Invalid field config, generating no particles");
            return Self {
                particles: Vec::new(),
                viewport,
            };
        }
        let count = Self::particle_count(viewport, config);
        let particles = (0..count)
            .map(|_| Particle::random(viewport, config, rng))
            .collect();

        debug!(
            count,
            width = viewport.width,
            height = viewport.height,
            "Particle field generated"
        );

        Self { particles, viewport }
    }

    /// Build a field from explicit particles, wrapping them into the viewport
    pub fn from_particles(viewport: Viewport, particles: Vec<Particle>) -> Self {
        let particles = particles
            .into_iter()
            .map(|mut p| {
                p.position = [
                    wrap(p.position[0], viewport.width),
                    wrap(p.position[1], viewport.height),
                ];
                p
            })
            .collect();
        Self { particles, viewport }
    }

    /// Advance every particle by its velocity
    pub fn step(&mut self) {
        let viewport = self.viewport;
        for particle in &mut self.particles {
            particle.step(viewport);
        }
        trace!(count = self.particles.len(), "Field stepped");
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
