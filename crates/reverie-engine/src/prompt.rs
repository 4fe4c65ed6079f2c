use reverie_contracts::analysis::Palette;

const PROMPT_KEYWORD_LIMIT: usize = 4;

const TONE_DESCRIPTORS: &[(&str, &str)] = &[
    ("wonder", "vibrant neon glow, cinematic depth of field"),
    ("serene", "soft pastel light, gentle atmospheric haze"),
    ("nightmare", "stark chiaroscuro, looming shadows, unsettling angles"),
    ("adventure", "dynamic action lines, sweeping vistas, dramatic perspective"),
];

/// Visual descriptor for a tone; unknown tones borrow the `wonder` look.
pub fn tone_descriptor(tone: &str) -> &'static str {
    TONE_DESCRIPTORS
        .iter()
        .find(|(name, _)| *name == tone)
        .or_else(|| TONE_DESCRIPTORS.first())
        .map(|(_, descriptor)| *descriptor)
        .unwrap_or_default()
}

/// Renders the image-generation instruction for one scene.
///
/// The scene text goes in byte-for-byte. The template's period after it is
/// only added when the scene does not already end in `.`, `!` or `?`. An
/// empty keyword list leaves the keyword slot out.
pub fn synthesize(scene_text: &str, tone: &str, palette: &Palette, keywords: &[String]) -> String {
    let mut prompt = scene_text.to_string();
    if !prompt.ends_with(['.', '!', '?']) {
        prompt.push('.');
    }
    let keyword_slot = keywords
        .iter()
        .take(PROMPT_KEYWORD_LIMIT)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(", ");
    prompt.push_str(&format!(
        " {}. {} palette, bold ink outlines, halftone shading",
        tone_descriptor(tone),
        palette.name
    ));
    if !keyword_slot.is_empty() {
        prompt.push_str(", ");
        prompt.push_str(&keyword_slot);
    }
    prompt.push_str(". comic book panel, widescreen.");
    prompt
}

#[cfg(test)]
mod tests {
    use reverie_contracts::analysis::Palette;
    use reverie_contracts::tones::{ToneRegistry, DEFAULT_PALETTE};

    use super::{synthesize, tone_descriptor};

    fn keywords(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn every_builtin_tone_has_a_descriptor() {
        for tone in ToneRegistry::builtin().tones() {
            assert!(!tone_descriptor(&tone).is_empty());
        }
        assert_eq!(tone_descriptor("nightmare"), "stark chiaroscuro, looming shadows, unsettling angles");
    }

    #[test]
    fn unknown_tone_uses_wonder_descriptor() {
        assert_eq!(tone_descriptor("dreamlike"), tone_descriptor("wonder"));
    }

    #[test]
    fn prompt_follows_template() {
        let palette = Palette::from_spec(&DEFAULT_PALETTE);
        let prompt = synthesize(
            "A fox in a velvet suit greeted me.",
            "wonder",
            &palette,
            &keywords(&["velvet", "suit", "greeted", "flying", "crystal"]),
        );
        assert_eq!(
            prompt,
            "A fox in a velvet suit greeted me. vibrant neon glow, cinematic depth of field. \
             Moonlit Ink palette, bold ink outlines, halftone shading, velvet, suit, greeted, flying. \
             comic book panel, widescreen."
        );
    }

    #[test]
    fn prompt_without_keywords_skips_slot() {
        let palette = Palette::from_spec(&DEFAULT_PALETTE);
        let prompt = synthesize("Run!", "nightmare", &palette, &[]);
        assert_eq!(
            prompt,
            "Run! stark chiaroscuro, looming shadows, unsettling angles. \
             Moonlit Ink palette, bold ink outlines, halftone shading. comic book panel, widescreen."
        );
    }

    #[test]
    fn scene_text_is_kept_verbatim() {
        let palette = Palette::from_spec(&DEFAULT_PALETTE);
        let prompt = synthesize("I ran!", "wonder", &palette, &keywords(&["fox"]));
        assert!(prompt.starts_with("I ran! vibrant neon glow"), "{prompt}");
        assert!(prompt.contains("halftone shading, fox. comic book panel"));

        let questioning = synthesize("Was it real?!", "wonder", &palette, &[]);
        assert!(questioning.starts_with("Was it real?! vibrant"), "{questioning}");
    }

    #[test]
    fn unterminated_scene_gets_template_period() {
        let palette = Palette::from_spec(&DEFAULT_PALETTE);
        let prompt = synthesize("a river that never ended", "serene", &palette, &[]);
        assert!(
            prompt.starts_with("a river that never ended. soft pastel light"),
            "{prompt}"
        );
    }
}
