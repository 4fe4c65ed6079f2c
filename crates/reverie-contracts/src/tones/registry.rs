use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::analysis::{Palette, PaletteSpec};

pub const DEFAULT_TONE: &str = "dreamlike";

pub const DEFAULT_PALETTE: PaletteSpec = PaletteSpec {
    name: "Moonlit Ink",
    background: "#141a2e",
    surface: "#1f2742",
    highlight: "#e0e6ff",
    border: "#3c4a7a",
    accent: "#9fa8ff",
    text: "#eef1ff",
    shadow: "#070a14",
};

#[derive(Debug, Clone, Copy)]
struct ToneProfileRow {
    tone: &'static str,
    keywords: &'static [&'static str],
    palette: PaletteSpec,
}

const BUILTIN_PROFILES: &[ToneProfileRow] = &[
    ToneProfileRow {
        tone: "wonder",
        keywords: &[
            "glow", "sparkle", "floating", "magic", "stars", "rainbow", "shimmer", "wonder",
            "luminous", "aurora",
        ],
        palette: PaletteSpec {
            name: "Neon Reverie",
            background: "#1b1035",
            surface: "#2a1b54",
            highlight: "#ffd6ff",
            border: "#7b5cff",
            accent: "#00f0ff",
            text: "#f8f4ff",
            shadow: "#0b0618",
        },
    },
    ToneProfileRow {
        tone: "serene",
        keywords: &[
            "calm", "peace", "gentle", "quiet", "meadow", "breeze", "soft", "drift", "lake",
            "warm",
        ],
        palette: PaletteSpec {
            name: "Dawn Mist",
            background: "#e8f1f2",
            surface: "#f7fbfc",
            highlight: "#ffffff",
            border: "#a9c6cf",
            accent: "#7fb8a4",
            text: "#23404a",
            shadow: "#9bb3ba",
        },
    },
    ToneProfileRow {
        tone: "nightmare",
        keywords: &[
            "dark", "chase", "scream", "blood", "monster", "shadow", "trapped", "falling", "fear",
            "storm",
        ],
        palette: PaletteSpec {
            name: "Blood Moon",
            background: "#120608",
            surface: "#2b0d12",
            highlight: "#ff4d4d",
            border: "#5c1a22",
            accent: "#b3001b",
            text: "#f2e6e6",
            shadow: "#000000",
        },
    },
    ToneProfileRow {
        tone: "adventure",
        keywords: &[
            "journey", "quest", "explore", "battle", "treasure", "map", "climb", "race", "sail",
            "discover",
        ],
        palette: PaletteSpec {
            name: "Sunforge",
            background: "#2e1a05",
            surface: "#4a2c0a",
            highlight: "#ffe08a",
            border: "#c27a1a",
            accent: "#ff9f1c",
            text: "#fff6e5",
            shadow: "#140b02",
        },
    },
];

/// A tone with its lowercase trigger words and palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneProfile {
    pub tone: String,
    pub keywords: Vec<String>,
    pub palette: Palette,
}

impl ToneProfile {
    pub fn new(tone: &str, keywords: &[&str], palette: Palette) -> Self {
        Self {
            tone: tone.to_string(),
            keywords: keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            palette,
        }
    }

    /// Number of trigger words contained in `lowered` (substring match).
    pub fn score(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| lowered.contains(keyword.as_str()))
            .count()
    }
}

/// Tone profiles in declaration order plus the zero-score fallback.
#[derive(Debug, Clone)]
pub struct ToneRegistry {
    profiles: IndexMap<String, ToneProfile>,
    default_tone: String,
    default_palette: Palette,
}

impl ToneRegistry {
    /// `None` yields the built-in table. Profiles without keywords are dropped.
    pub fn new(profiles: Option<IndexMap<String, ToneProfile>>) -> Self {
        let profiles = profiles
            .unwrap_or_else(builtin_profiles)
            .into_iter()
            .filter(|(_, profile)| !profile.keywords.is_empty())
            .collect();
        Self {
            profiles,
            default_tone: DEFAULT_TONE.to_string(),
            default_palette: Palette::from_spec(&DEFAULT_PALETTE),
        }
    }

    /// Shared read-only built-in registry, built on first use.
    pub fn builtin() -> &'static ToneRegistry {
        static BUILTIN: OnceLock<ToneRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| ToneRegistry::new(None))
    }

    pub fn get(&self, tone: &str) -> Option<&ToneProfile> {
        self.profiles.get(tone)
    }

    pub fn list(&self) -> impl Iterator<Item = &ToneProfile> {
        self.profiles.values()
    }

    pub fn tones(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn default_tone(&self) -> &str {
        &self.default_tone
    }

    pub fn default_palette(&self) -> &Palette {
        &self.default_palette
    }

    /// Palette for `tone`, or the default palette for unknown tones.
    pub fn palette_for(&self, tone: &str) -> &Palette {
        self.get(tone)
            .map(|profile| &profile.palette)
            .unwrap_or(&self.default_palette)
    }
}

fn builtin_profiles() -> IndexMap<String, ToneProfile> {
    BUILTIN_PROFILES
        .iter()
        .map(|row| {
            (
                row.tone.to_string(),
                ToneProfile::new(row.tone, row.keywords, Palette::from_spec(&row.palette)),
            )
        })
        .collect()
}
