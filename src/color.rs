use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

/// Fill for map entries without data.
pub const NO_DATA: Color32 = Color32::from_rgb(0xd0, 0xd0, 0xd0);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Sequential scale for emission intensities
// ---------------------------------------------------------------------------

/// Light-to-dark red for `t` in `[0, 1]` (clamped), mixed in linear RGB.
pub fn reds(t: f64) -> Color32 {
    let light: LinSrgb = Srgb::new(1.0_f32, 0.96, 0.94).into_linear();
    let dark: LinSrgb = Srgb::new(0.40_f32, 0.0, 0.05).into_linear();
    let mixed = light.mix(dark, t.clamp(0.0, 1.0) as f32);
    to_color32(Srgb::from_linear(mixed))
}

// ---------------------------------------------------------------------------
// Country → colour
// ---------------------------------------------------------------------------

/// Stable colours for every country of the loaded table, so a country keeps
/// its colour across charts and selection changes.
#[derive(Debug, Clone, Default)]
pub struct CountryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CountryColors {
    pub fn new(countries: &[String]) -> Self {
        let mapping = countries
            .iter()
            .cloned()
            .zip(generate_palette(countries.len()))
            .collect();
        Self { mapping }
    }

    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reds_darkens_with_intensity() {
        let lo = reds(0.0);
        let hi = reds(1.0);
        assert!(lo.g() > hi.g());
        assert_eq!(reds(-3.0), lo);
        assert_eq!(reds(7.0), hi);
    }

    #[test]
    fn unknown_country_gets_fallback() {
        let colors = CountryColors::new(&["China".to_string(), "India".to_string()]);
        assert_ne!(colors.color_for("China"), colors.color_for("India"));
        assert_eq!(colors.color_for("Atlantis"), Color32::LIGHT_BLUE);
    }
}
