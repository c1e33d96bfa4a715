//! Dark navy palette of the portfolio site

use crate::core::{Preset, Rgb};

/// Site palette
pub mod colors {
    use super::Rgb;

    // === Backgrounds ===
    pub const NAVY: Rgb = Rgb::new(0x0a, 0x19, 0x2f);       // #0a192f - classic page background
    pub const NAVY_LIGHT: Rgb = Rgb::new(0x11, 0x22, 0x40); // #112240 - raised panels
    pub const DARK_950: Rgb = Rgb::new(0x05, 0x07, 0x0d);   // #05070d - current page background

    // === Accents (particle colors) ===
    pub const TEAL: Rgb = Rgb::new(0x64, 0xff, 0xda);       // #64ffda
    pub const CYBER_CYAN: Rgb = Rgb::new(0x00, 0xf0, 0xff); // #00f0ff

    // === Text ===
    pub const TEXT_PRIMARY: Rgb = Rgb::new(0xcc, 0xd6, 0xf6);   // #ccd6f6
    pub const TEXT_SECONDARY: Rgb = Rgb::new(0x88, 0x92, 0xb0); // #8892b0
}

/// Page background the preset was designed against
pub fn background(preset: Preset) -> Rgb {
    match preset {
        Preset::Classic => colors::NAVY,
        Preset::Ambient => colors::DARK_950,
    }
}

#[cfg(feature = "preview")]
pub fn color32(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// egui Visuals matching the site: navy panels, light slate text
#[cfg(feature = "preview")]
pub fn site_visuals(preset: Preset) -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();
    let bg = color32(background(preset));

    visuals.panel_fill = bg;
    visuals.window_fill = bg;
    visuals.extreme_bg_color = bg;
    visuals.faint_bg_color = color32(NAVY_LIGHT);

    visuals.override_text_color = Some(color32(TEXT_PRIMARY));
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, color32(TEXT_SECONDARY));

    // Flat, no shadows
    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
