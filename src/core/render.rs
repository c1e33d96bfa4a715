//! Draw pass for a particle field
//!
//! Circles first, then a faded line for every pair closer than the
//! connection distance. The pair pass is O(N²); N is capped by the config.

use tracing::trace;

use super::config::FieldConfig;
use super::particle::Field;
use super::surface::{DrawingSurface, Paint};

/// Primitive counts of one draw pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub links: usize,
}

/// Opacity of the line joining two particles `distance` apart.
///
/// None when the pair is at or beyond the threshold.
#[inline]
pub fn link_opacity(distance: f32, threshold: f32, base: f32) -> Option<f32> {
    if !(distance < threshold) {
        return None;
    }
    Some(((1.0 - distance / threshold) * base).max(0.0))
}

/// Fill every particle at its radius and opacity
pub fn draw_particles<S: DrawingSurface + ?Sized>(
    field: &Field,
    config: &FieldConfig,
    surface: &mut S,
) -> usize {
    for p in field.particles() {
        surface.fill_circle(p.position, p.radius(), Paint::new(config.color, p.opacity()));
    }
    field.len()
}

/// Join every unordered pair closer than the connection distance
pub fn draw_links<S: DrawingSurface + ?Sized>(
    field: &Field,
    config: &FieldConfig,
    surface: &mut S,
) -> usize {
    let particles = field.particles();
    let threshold = config.connection_distance;
    let mut links = 0;

    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let dx = a.position[0] - b.position[0];
            let dy = a.position[1] - b.position[1];
            // Cheap reject before the sqrt
            if dx.abs() >= threshold || dy.abs() >= threshold {
                continue;
            }
            let distance = (dx * dx + dy * dy).sqrt();
            if let Some(alpha) = link_opacity(distance, threshold, config.link_opacity) {
                surface.stroke_line(
                    a.position,
                    b.position,
                    config.link_width,
                    Paint::new(config.color, alpha),
                );
                links += 1;
            }
        }
    }
    links
}

/// Full animated pass: clear, particles, links
pub fn draw_frame<S: DrawingSurface + ?Sized>(
    field: &Field,
    config: &FieldConfig,
    surface: &mut S,
) -> FrameStats {
    surface.clear(field.viewport());
    let stats = FrameStats {
        particles: draw_particles(field, config, surface),
        links: draw_links(field, config, surface),
    };
    trace!(particles = stats.particles, links = stats.links, "Frame drawn");
    stats
}

/// Static pass for reduced motion: clear and particles only
pub fn draw_static<S: DrawingSurface + ?Sized>(
    field: &Field,
    config: &FieldConfig,
    surface: &mut S,
) -> FrameStats {
    surface.clear(field.viewport());
    FrameStats {
        particles: draw_particles(field, config, surface),
        links: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::{Particle, Viewport};
    use crate::core::surface::{CountingSurface, Rgb};

    /// Records every line's alpha
    #[derive(Default)]
    struct LineProbe {
        alphas: Vec<f32>,
        circles: usize,
    }

    impl DrawingSurface for LineProbe {
        fn resize(&mut self, _viewport: Viewport) {}
        fn clear(&mut self, _viewport: Viewport) {}
        fn fill_circle(&mut self, _center: [f32; 2], _radius: f32, _paint: Paint) {
            self.circles += 1;
        }
        fn stroke_line(&mut self, _from: [f32; 2], _to: [f32; 2], _width: f32, paint: Paint) {
            self.alphas.push(paint.alpha);
        }
    }

    fn still(x: f32, y: f32) -> Particle {
        Particle::new([x, y], [0.0, 0.0], 1.0, 0.5)
    }

    fn config() -> FieldConfig {
        FieldConfig {
            connection_distance: 100.0,
            link_opacity: 0.5,
            color: Rgb::new(1, 2, 3),
            ..FieldConfig::default()
        }
    }

    #[test]
    fn test_link_opacity() {
        assert_eq!(link_opacity(0.0, 100.0, 0.5), Some(0.5));
        assert_eq!(link_opacity(50.0, 100.0, 0.5), Some(0.25));
        assert_eq!(link_opacity(100.0, 100.0, 0.5), None);
        assert_eq!(link_opacity(150.0, 100.0, 0.5), None);
        assert_eq!(link_opacity(f32::NAN, 100.0, 0.5), None);
    }

    #[test]
    fn test_line_alpha_scales_with_distance() {
        let viewport = Viewport::new(500.0, 500.0);
        // 3-4-5 triangle: distance 50 between the first two
        let field = Field::from_particles(
            viewport,
            vec![still(10.0, 10.0), still(40.0, 50.0), still(400.0, 400.0)],
        );
        let mut probe = LineProbe::default();
        let stats = draw_frame(&field, &config(), &mut probe);

        assert_eq!(stats, FrameStats { particles: 3, links: 1 });
        assert_eq!(probe.circles, 3);
        assert_eq!(probe.alphas.len(), 1);
        assert!((probe.alphas[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_no_line_at_threshold() {
        let viewport = Viewport::new(500.0, 500.0);
        let field = Field::from_particles(viewport, vec![still(0.0, 0.0), still(100.0, 0.0)]);
        let mut surface = CountingSurface::new();
        let stats = draw_frame(&field, &config(), &mut surface);
        assert_eq!(stats.links, 0);
        assert_eq!(surface.lines, 0);
        assert_eq!(surface.clears, 1);
    }

    #[test]
    fn test_each_pair_once() {
        let viewport = Viewport::new(500.0, 500.0);
        let field = Field::from_particles(
            viewport,
            vec![still(0.0, 0.0), still(1.0, 0.0), still(2.0, 0.0), still(3.0, 0.0)],
        );
        let mut surface = CountingSurface::new();
        draw_frame(&field, &config(), &mut surface);
        assert_eq!(surface.lines, 6);
        assert_eq!(surface.circles, 4);
    }

    #[test]
    fn test_static_pass_skips_links() {
        let viewport = Viewport::new(500.0, 500.0);
        let field = Field::from_particles(viewport, vec![still(0.0, 0.0), still(1.0, 0.0)]);
        let mut surface = CountingSurface::new();
        let stats = draw_static(&field, &config(), &mut surface);
        assert_eq!(stats, FrameStats { particles: 2, links: 0 });
        assert_eq!(surface.lines, 0);
    }
}
