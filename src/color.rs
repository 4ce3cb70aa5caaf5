use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// ColorBrewer "Set2" qualitative palette, cycled for the donut chart.
pub const SET2: [Color32; 8] = [
    Color32::from_rgb(0x66, 0xc2, 0xa5),
    Color32::from_rgb(0xfc, 0x8d, 0x62),
    Color32::from_rgb(0x8d, 0xa0, 0xcb),
    Color32::from_rgb(0xe7, 0x8a, 0xc3),
    Color32::from_rgb(0xa6, 0xd8, 0x54),
    Color32::from_rgb(0xff, 0xd9, 0x2f),
    Color32::from_rgb(0xe5, 0xc4, 0x94),
    Color32::from_rgb(0xb3, 0xb3, 0xb3),
];

pub fn set2(i: usize) -> Color32 {
    SET2[i % SET2.len()]
}

// ---------------------------------------------------------------------------
// Color mapping: group key → Color32
// ---------------------------------------------------------------------------

/// Maps the keys of a grouped chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the group keys, in the given order.
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let palette = generate_palette(keys.len());
        let mapping = keys
            .into_iter()
            .zip(palette)
            .map(|(k, c)| (k.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given key.
    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping
            .get(key)
            .copied()
            .unwrap_or(self.default_color)
    }
}
