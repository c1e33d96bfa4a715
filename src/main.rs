//! Headless driver for the particle field
//!
//! Runs the animation against a counting surface at a fixed frame rate and
//! logs per-second statistics.
//!
//! Run with: cargo run --features cli --bin field-cli

#[cfg(not(target_arch = "wasm32"))]
use std::error::Error;

#[cfg(not(target_arch = "wasm32"))]
use particle_field::core::{FieldConfig, Preset, Viewport};

/// Run parameters, read from `FIELD_*` environment variables
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
struct Settings {
    viewport: Viewport,
    frames: u64,
    fps: u32,
    config: FieldConfig,
    reduced_motion: bool,
    resize: Option<Viewport>,
    seed: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Settings {
    fn from_env() -> Result<Self, Box<dyn Error>> {
        let config = match std::env::var("FIELD_CONFIG") {
            Ok(path) => FieldConfig::from_json(&std::fs::read_to_string(&path)?)?,
            Err(_) => match std::env::var("FIELD_PRESET") {
                Ok(name) => Preset::from_name(&name)
                    .ok_or_else(|| format!("unknown preset '{}'", name))?
                    .config(),
                Err(_) => FieldConfig::default(),
            },
        };

        let resize = match std::env::var("FIELD_RESIZE") {
            Ok(spec) => Some(parse_size(&spec)?),
            Err(_) => None,
        };

        let fps = env_or("FIELD_FPS", 60u32)?;
        if fps == 0 {
            return Err("FIELD_FPS must be positive".into());
        }

        Ok(Self {
            viewport: Viewport::new(env_or("FIELD_WIDTH", 1280.0)?, env_or("FIELD_HEIGHT", 800.0)?),
            frames: env_or("FIELD_FRAMES", 600)?,
            fps,
            config,
            reduced_motion: std::env::var("FIELD_REDUCED_MOTION").is_ok_and(|v| v == "1"),
            resize,
            seed: std::env::var("FIELD_SEED").ok().map(|s| s.parse()).transpose()?,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn env_or<T>(key: &str, default: T) -> Result<T, Box<dyn Error>>
where
    T: std::str::FromStr,
    T::Err: Error + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{}: {}", key, e).into()),
        Err(_) => Ok(default),
    }
}

/// `WIDTHxHEIGHT`, e.g. `800x600`
#[cfg(not(target_arch = "wasm32"))]
fn parse_size(spec: &str) -> Result<Viewport, Box<dyn Error>> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", spec))?;
    Ok(Viewport::new(w.trim().parse()?, h.trim().parse()?))
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    use particle_field::core::{CountingSurface, ManualScheduler, MotionMode, ParticleAnimation};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tokio::time::MissedTickBehavior;
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let settings = Settings::from_env()?;
    info!(?settings, "Starting headless particle field");

    let rng = match settings.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let scheduler = ManualScheduler::new();
    let Some(mut animation) = ParticleAnimation::start(
        Some(CountingSurface::new()),
        scheduler.clone(),
        settings.viewport,
        MotionMode::from_reduced_motion(settings.reduced_motion),
        settings.config,
        rng,
    ) else {
        warn!("Particle field declined to start");
        return Ok(());
    };

    if !animation.is_running() {
        info!(
            particles = animation.last_stats().particles,
            "Reduced motion: single static pass, no frames scheduled"
        );
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / settings.fps as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut links_this_second = 0usize;
    let resize_at = settings.frames / 2;

    while animation.frames() < settings.frames {
        tokio::select! {
            _ = ticker.tick() => {
                if animation.frames() == resize_at {
                    if let Some(viewport) = settings.resize {
                        animation.resize(viewport);
                    }
                }
                if scheduler.take_due().is_none() {
                    break;
                }
                animation.on_frame();
                links_this_second += animation.last_stats().links;

                if animation.frames() % settings.fps as u64 == 0 {
                    info!(
                        frame = animation.frames(),
                        particles = animation.field().len(),
                        "links/frame" = format!("{:.1}", links_this_second as f64 / settings.fps as f64),
                        "stats"
                    );
                    links_this_second = 0;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                break;
            }
        }
    }

    animation.stop();
    let surface = animation.surface();
    info!(
        frames = animation.frames(),
        clears = surface.clears,
        circles = surface.circles,
        lines = surface.lines,
        cancelled = scheduler.cancelled(),
        "Done"
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
