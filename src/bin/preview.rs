//! Native window showing the particle field
//!
//! Run with: cargo run --features preview --bin field-preview

use particle_field::core::{FieldConfig, Preset};
use particle_field::preview::PreviewApp;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let preset = match std::env::var("FIELD_PRESET") {
        Ok(name) => Preset::from_name(&name).ok_or_else(|| format!("unknown preset '{}'", name))?,
        Err(_) => Preset::default(),
    };
    let config = match std::env::var("FIELD_CONFIG") {
        Ok(path) => FieldConfig::from_json(&std::fs::read_to_string(&path)?)?,
        Err(_) => preset.config(),
    };
    let reduced_motion = std::env::var("FIELD_REDUCED_MOTION").is_ok_and(|v| v == "1");

    info!(preset = preset.label(), reduced_motion, "Opening preview window");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Particle field"),
        ..Default::default()
    };
    eframe::run_native(
        "particle-field",
        options,
        Box::new(move |cc| Ok(Box::new(PreviewApp::new(cc, config, preset, reduced_motion)))),
    )?;
    Ok(())
}
