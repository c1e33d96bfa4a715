//! Particle field - animated decorative background for the portfolio site
//!
//! A bounded set of drifting points, wrapped toroidally at the viewport
//! edges, with faded lines joining near pairs. The core is platform-agnostic:
//! - browser: `wasm` feature, canvas 2D + requestAnimationFrame
//! - headless CLI: `cli` feature, `field-cli`
//! - native window: `preview` feature, `field-preview`

pub mod core;
pub mod theme;
pub mod time;

#[cfg(feature = "preview")]
pub mod preview;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod web;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use web::{
    mount_background, mount_background_preset, mount_background_with_config, BackgroundHandle,
    SectionReveal,
};

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    tracing::info!("particle-field loaded");
}
