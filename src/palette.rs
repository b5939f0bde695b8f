//! Color palettes and label tables
//!
//! Every per-entity or per-effect color choice is drawn from a [`Palette`]
//! through the world's seeded RNG, so a given seed always paints the same scene.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Theme;

pub type Color = [f32; 4];

/// Build a color from 8-bit channels and a float alpha
pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

pub const TRANSPARENT: Color = [0.0, 0.0, 0.0, 0.0];

/// Named palettes matching the built-in scene presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PalettePreset {
    /// White and silver stars on black
    #[default]
    Starlight,
    /// Amber neural network over navy nebulae
    Gold,
    /// Gotham rain: steel blue drops, purple/green labels
    Gotham,
    /// Candle light and warm sparks
    Candlelight,
    /// Bat-signal yellow ripples and dark projectiles
    Batcave,
    /// Cyan flow lines
    Aurora,
}

impl PalettePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PalettePreset::Starlight => "starlight",
            PalettePreset::Gold => "gold",
            PalettePreset::Gotham => "gotham",
            PalettePreset::Candlelight => "candlelight",
            PalettePreset::Batcave => "batcave",
            PalettePreset::Aurora => "aurora",
        }
    }
}

/// Full color table used by the draw pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Color,
    /// Entity colors, picked uniformly per entity
    pub entities: Vec<Color>,
    pub connection: Color,
    /// Ripple ring color
    pub accent: Color,
    /// Burst projectile body color
    pub burst: Color,
    /// Pointer trail color
    pub trail: Color,
    /// Nebula orb core colors
    pub nebula: Vec<Color>,
    /// Lightning flash color (alpha is scaled by flash intensity)
    pub flash: Color,
    /// Floating label colors
    pub label_colors: Vec<Color>,
    /// Floating label texts spawned on click
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Palette {
    /// Build a named palette for the given theme
    pub fn preset(preset: PalettePreset, theme: Theme) -> Self {
        let palette = match preset {
            PalettePreset::Starlight => Palette {
                background: rgba(0, 0, 0, 1.0),
                entities: vec![
                    rgba(255, 255, 255, 0.9),
                    rgba(255, 255, 255, 0.6),
                    rgba(200, 200, 220, 0.4),
                    rgba(255, 255, 255, 0.2),
                ],
                connection: rgba(255, 255, 255, 0.15),
                accent: rgba(255, 255, 255, 0.8),
                burst: rgba(220, 220, 240, 1.0),
                trail: rgba(255, 255, 255, 0.5),
                nebula: vec![rgba(60, 60, 90, 0.05)],
                flash: rgba(200, 210, 255, 0.5),
                label_colors: vec![rgba(255, 255, 255, 1.0)],
                labels: Vec::new(),
            },
            PalettePreset::Gold => Palette {
                background: rgba(5, 8, 16, 1.0),
                entities: vec![rgba(255, 195, 0, 0.4)],
                connection: rgba(255, 214, 10, 0.07),
                accent: rgba(255, 195, 0, 0.9),
                burst: rgba(255, 214, 10, 1.0),
                trail: rgba(255, 195, 0, 0.4),
                nebula: vec![rgba(255, 195, 0, 0.03), rgba(0, 29, 61, 0.04)],
                flash: rgba(255, 230, 160, 0.4),
                label_colors: vec![rgba(255, 214, 10, 1.0)],
                labels: Vec::new(),
            },
            PalettePreset::Gotham => Palette {
                background: rgba(2, 4, 8, 1.0),
                entities: vec![rgba(120, 140, 160, 0.6), rgba(220, 240, 255, 0.8)],
                connection: rgba(120, 140, 160, 0.05),
                accent: rgba(255, 255, 200, 0.6),
                burst: rgba(51, 51, 51, 1.0),
                trail: rgba(80, 100, 120, 0.3),
                nebula: vec![rgba(80, 100, 120, 0.06)],
                flash: rgba(180, 200, 255, 0.6),
                label_colors: vec![rgba(114, 9, 183, 1.0), rgba(45, 198, 83, 1.0)],
                labels: vec![
                    "HA HA".to_string(),
                    "HEE HEE".to_string(),
                    "JOKER".to_string(),
                    "WHY SO SERIOUS?".to_string(),
                ],
            },
            PalettePreset::Candlelight => Palette {
                background: rgba(5, 5, 16, 1.0),
                entities: vec![
                    rgba(229, 231, 235, 1.0),
                    rgba(249, 250, 251, 1.0),
                    rgba(209, 213, 219, 1.0),
                ],
                connection: rgba(255, 215, 0, 0.05),
                accent: rgba(255, 215, 0, 0.8),
                burst: rgba(255, 120, 0, 1.0),
                trail: rgba(255, 215, 0, 0.9),
                nebula: vec![rgba(10, 10, 30, 0.2)],
                flash: rgba(255, 240, 200, 0.4),
                label_colors: vec![rgba(255, 215, 0, 1.0)],
                labels: Vec::new(),
            },
            PalettePreset::Batcave => Palette {
                background: rgba(0, 0, 0, 0.0),
                entities: vec![rgba(20, 20, 30, 0.4)],
                connection: rgba(255, 195, 0, 0.1),
                accent: rgba(255, 195, 0, 1.0),
                burst: rgba(51, 51, 51, 1.0),
                trail: rgba(20, 20, 30, 0.4),
                nebula: Vec::new(),
                flash: rgba(255, 195, 0, 0.3),
                label_colors: vec![rgba(255, 195, 0, 1.0)],
                labels: Vec::new(),
            },
            PalettePreset::Aurora => Palette {
                background: rgba(2, 2, 5, 1.0),
                entities: vec![rgba(0, 212, 255, 0.5), rgba(114, 9, 183, 0.4)],
                connection: rgba(0, 212, 255, 0.1),
                accent: rgba(0, 212, 255, 0.8),
                burst: rgba(0, 212, 255, 1.0),
                trail: rgba(0, 212, 255, 0.3),
                nebula: vec![rgba(0, 212, 255, 0.05), rgba(114, 9, 183, 0.05)],
                flash: rgba(0, 212, 255, 0.3),
                label_colors: vec![rgba(0, 212, 255, 1.0)],
                labels: Vec::new(),
            },
        };

        palette.themed(theme)
    }

    /// Apply a theme. Only colors change; nothing else in the scene does.
    pub fn themed(mut self, theme: Theme) -> Self {
        if theme == Theme::Light {
            self.background = rgba(240, 240, 245, 1.0);
            for color in self.entities.iter_mut() {
                *color = darken(*color);
            }
            self.connection = darken(self.connection);
            self.trail = darken(self.trail);
            self.nebula = self.nebula.iter().map(|c| darken(*c)).collect();
        }
        self
    }

    pub fn pick_entity<R: Rng>(&self, rng: &mut R) -> Color {
        pick(&self.entities, rng).unwrap_or(self.accent)
    }

    pub fn pick_nebula<R: Rng>(&self, rng: &mut R) -> Color {
        pick(&self.nebula, rng).unwrap_or(TRANSPARENT)
    }

    pub fn pick_label_color<R: Rng>(&self, rng: &mut R) -> Color {
        pick(&self.label_colors, rng).unwrap_or(self.accent)
    }

    /// A random label text, if the palette has any
    pub fn pick_label<R: Rng>(&self, rng: &mut R) -> Option<String> {
        pick(&self.labels, rng)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::preset(PalettePreset::default(), Theme::default())
    }
}

fn pick<T: Clone, R: Rng>(items: &[T], rng: &mut R) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.random_range(0..items.len())].clone())
    }
}

/// Darken a color for use on a light background
fn darken(color: Color) -> Color {
    [color[0] * 0.3, color[1] * 0.3, color[2] * 0.35, color[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rgba_scaling() {
        let c = rgba(255, 0, 51, 0.5);
        assert_eq!(c, [1.0, 0.0, 0.2, 0.5]);
    }

    #[test]
    fn test_theme_changes_colors_only() {
        let dark = Palette::preset(PalettePreset::Gotham, Theme::Dark);
        let light = Palette::preset(PalettePreset::Gotham, Theme::Light);
        assert_ne!(dark.background, light.background);
        assert_eq!(dark.entities.len(), light.entities.len());
        assert_eq!(dark.labels, light.labels);
    }

    #[test]
    fn test_picks_are_seeded() {
        let palette = Palette::preset(PalettePreset::Starlight, Theme::Dark);
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(palette.pick_entity(&mut a), palette.pick_entity(&mut b));
        }
    }

    #[test]
    fn test_empty_label_table() {
        let palette = Palette::preset(PalettePreset::Starlight, Theme::Dark);
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(palette.pick_label(&mut rng).is_none());
    }
}
