use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Category, Sentiment};

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

/// Sentiment colours shared by the pie and timeline charts.
pub fn sentiment_color(sentiment: Sentiment) -> Color32 {
    match sentiment {
        Sentiment::Positive => Color32::from_rgb(0x22, 0xc5, 0x5e),
        Sentiment::Neutral => Color32::from_rgb(0xfb, 0xbf, 0x24),
        Sentiment::Negative => Color32::from_rgb(0xef, 0x44, 0x44),
    }
}

/// Maps each review category to a distinct colour.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<Category, Color32>,
    default_color: Color32,
}

impl Default for CategoryColors {
    fn default() -> Self {
        let palette = generate_palette(Category::ALL.len());
        let mapping: BTreeMap<Category, Color32> =
            Category::ALL.into_iter().zip(palette).collect();
        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }
}

impl CategoryColors {
    pub fn color_for(&self, category: Category) -> Color32 {
        self.mapping
            .get(&category)
            .copied()
            .unwrap_or(self.default_color)
    }
}
