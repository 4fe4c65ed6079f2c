use serde::{Deserialize, Serialize};

/// Static table row for a palette. Every color is a CSS color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteSpec {
    pub name: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub highlight: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub shadow: &'static str,
}

/// Owned palette handed out with every analysis and panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub name: String,
    pub background: String,
    pub surface: String,
    pub highlight: String,
    pub border: String,
    pub accent: String,
    pub text: String,
    pub shadow: String,
    pub gradient_dark: String,
    pub gradient_light: String,
}

impl Palette {
    pub fn from_spec(spec: &PaletteSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            background: spec.background.to_string(),
            surface: spec.surface.to_string(),
            highlight: spec.highlight.to_string(),
            border: spec.border.to_string(),
            accent: spec.accent.to_string(),
            text: spec.text.to_string(),
            shadow: spec.shadow.to_string(),
            gradient_dark: format!(
                "linear-gradient(135deg, {} 0%, {} 100%)",
                spec.shadow, spec.background
            ),
            gradient_light: format!(
                "linear-gradient(135deg, {} 0%, {} 100%)",
                spec.highlight, spec.surface
            ),
        }
    }

    /// Parses `background` as `#rrggbb`. Other CSS forms yield `None`.
    pub fn background_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_rgb(&self.background)
    }
}

impl From<&PaletteSpec> for Palette {
    fn from(spec: &PaletteSpec) -> Self {
        Self::from_spec(spec)
    }
}

/// Parses `#rrggbb` into channels.
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
