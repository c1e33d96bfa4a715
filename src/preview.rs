//! Native preview window
//!
//! The animation draws into a `ShapeBuffer` display list; each egui frame
//! replays it onto the central panel's painter.

use eframe::egui;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use crate::core::{
    DrawingSurface, FieldConfig, ManualScheduler, MotionMode, Paint, ParticleAnimation, Preset,
    Viewport,
};
use crate::theme::{background, color32, colors, site_visuals};
use crate::time::FpsCounter;

fn rgba(paint: Paint) -> egui::Color32 {
    let alpha = (paint.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(paint.color.r, paint.color.g, paint.color.b, alpha)
}

/// Shapes of the most recent draw pass, in field coordinates
#[derive(Default)]
pub struct ShapeBuffer {
    shapes: Vec<egui::Shape>,
}

impl ShapeBuffer {
    pub fn shapes(&self) -> &[egui::Shape] {
        &self.shapes
    }
}

impl DrawingSurface for ShapeBuffer {
    fn resize(&mut self, _viewport: Viewport) {
        // egui sizes the panel itself
    }

    fn clear(&mut self, _viewport: Viewport) {
        self.shapes.clear();
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: f32, paint: Paint) {
        self.shapes.push(egui::Shape::circle_filled(
            egui::pos2(center[0], center[1]),
            radius,
            rgba(paint),
        ));
    }

    fn stroke_line(&mut self, from: [f32; 2], to: [f32; 2], width: f32, paint: Paint) {
        self.shapes.push(egui::Shape::line_segment(
            [egui::pos2(from[0], from[1]), egui::pos2(to[0], to[1])],
            egui::Stroke::new(width, rgba(paint)),
        ));
    }
}

pub struct PreviewApp {
    animation: Option<ParticleAnimation<ShapeBuffer, ManualScheduler>>,
    scheduler: ManualScheduler,
    config: FieldConfig,
    preset: Preset,
    mode: MotionMode,
    viewport: Viewport,
    fps: FpsCounter,
}

impl PreviewApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: FieldConfig,
        preset: Preset,
        reduced_motion: bool,
    ) -> Self {
        cc.egui_ctx.set_visuals(site_visuals(preset));
        Self {
            animation: None,
            scheduler: ManualScheduler::new(),
            config,
            preset,
            mode: MotionMode::from_reduced_motion(reduced_motion),
            viewport: Viewport::default(),
            fps: FpsCounter::new(),
        }
    }

    /// Mount on first frame, regenerate when the panel size changes
    fn sync_viewport(&mut self, viewport: Viewport) {
        match &mut self.animation {
            None => {
                self.animation = ParticleAnimation::start(
                    Some(ShapeBuffer::default()),
                    self.scheduler.clone(),
                    viewport,
                    self.mode,
                    self.config,
                    SmallRng::from_entropy(),
                );
                info!(preset = self.preset.label(), mode = ?self.mode, "Preview started");
            }
            Some(animation) if viewport != self.viewport => animation.resize(viewport),
            Some(_) => {}
        }
        self.viewport = viewport;
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(color32(background(self.preset))))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.sync_viewport(Viewport::new(rect.width(), rect.height()));

                let Some(animation) = self.animation.as_mut() else {
                    return;
                };

                if self.scheduler.take_due().is_some() {
                    animation.on_frame();
                    self.fps.tick();
                    ctx.request_repaint();
                }

                let origin = rect.min.to_vec2();
                ui.painter().extend(animation.surface().shapes().iter().cloned().map(|mut shape| {
                    shape.translate(origin);
                    shape
                }));

                let stats = animation.last_stats();
                ui.label(
                    egui::RichText::new(format!(
                        "{:.0} fps / {} particles / {} lines",
                        self.fps.fps(),
                        stats.particles,
                        stats.links
                    ))
                    .color(color32(colors::TEXT_SECONDARY))
                    .monospace()
                    .size(11.0),
                );
            });
    }
}
