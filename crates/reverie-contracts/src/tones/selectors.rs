use std::sync::OnceLock;

use crate::analysis::Palette;

use super::registry::{ToneProfile, ToneRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneSelection {
    pub tone: String,
    pub palette: Palette,
    pub score: usize,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ToneSelector {
    pub registry: ToneRegistry,
}

impl ToneSelector {
    pub fn new(registry: Option<ToneRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_else(|| ToneRegistry::new(None)),
        }
    }

    pub fn builtin() -> &'static ToneSelector {
        static BUILTIN: OnceLock<ToneSelector> = OnceLock::new();
        BUILTIN.get_or_init(|| ToneSelector::new(Some(ToneRegistry::builtin().clone())))
    }

    /// Picks the profile with the strictly highest keyword score; the first
    /// declared profile wins a tie. A best score of zero selects the default.
    pub fn select(&self, text: &str) -> ToneSelection {
        let lowered = text.to_lowercase();
        let mut best: Option<(usize, &ToneProfile)> = None;
        for profile in self.registry.list() {
            let score = profile.score(&lowered);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, profile));
            }
        }

        match best {
            Some((score, profile)) if score > 0 => ToneSelection {
                tone: profile.tone.clone(),
                palette: profile.palette.clone(),
                score,
                fallback_reason: None,
            },
            _ => ToneSelection {
                tone: self.registry.default_tone().to_string(),
                palette: self.registry.default_palette().clone(),
                score: 0,
                fallback_reason: Some("No tone keywords matched; using default.".to_string()),
            },
        }
    }

    pub fn classify(&self, text: &str) -> (String, Palette) {
        let selection = self.select(text);
        (selection.tone, selection.palette)
    }
}

/// Classifies `text` against the built-in tone table.
pub fn classify(text: &str) -> (String, Palette) {
    ToneSelector::builtin().classify(text)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{classify, ToneSelector};
    use crate::analysis::{Palette, PaletteSpec};
    use crate::tones::{ToneProfile, ToneRegistry, DEFAULT_TONE};

    fn palette(name: &'static str) -> Palette {
        Palette::from_spec(&PaletteSpec {
            name,
            background: "#000000",
            surface: "#111111",
            highlight: "#eeeeee",
            border: "#222222",
            accent: "#ff0000",
            text: "#ffffff",
            shadow: "#000000",
        })
    }

    fn selector(rows: Vec<(&str, Vec<&str>)>) -> ToneSelector {
        let mut profiles = IndexMap::new();
        for (tone, keywords) in rows {
            profiles.insert(
                tone.to_string(),
                ToneProfile::new(tone, &keywords, palette("p")),
            );
        }
        ToneSelector::new(Some(ToneRegistry::new(Some(profiles))))
    }

    #[test]
    fn empty_and_unrelated_text_fall_back_to_default() {
        for text in ["", "xyzzy unrelated words"] {
            let selection = ToneSelector::builtin().select(text);
            assert_eq!(selection.tone, DEFAULT_TONE);
            assert_eq!(selection.palette.name, "Moonlit Ink");
            assert_eq!(selection.score, 0);
            assert!(selection.fallback_reason.is_some());
        }
    }

    #[test]
    fn highest_score_wins() {
        let (tone, palette) = classify("A dark monster chased me through the storm.");
        assert_eq!(tone, "nightmare");
        assert_eq!(palette.name, "Blood Moon");
    }

    #[test]
    fn tie_keeps_first_declared_profile() {
        let selector = selector(vec![("first", vec!["moon"]), ("second", vec!["tide"])]);
        let selection = selector.select("moon over the tide");
        assert_eq!(selection.tone, "first");
        assert_eq!(selection.score, 1);
        assert_eq!(selection.fallback_reason, None);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let selector = selector(vec![("weather", vec!["storm"])]);
        assert_eq!(selector.select("STORMING skies").tone, "weather");
    }

    #[test]
    fn classify_is_deterministic() {
        let text = "Floating lanterns glow above a calm lake.";
        assert_eq!(classify(text), classify(text));
    }
}
