use std::sync::OnceLock;

use regex::Regex;
use reverie_contracts::analysis::{DreamPanel, PanelLayout};
use reverie_contracts::tones::classify;
use uuid::Uuid;

use crate::extract::{extract_focus, extract_keywords, SCENE_KEYWORD_LIMIT};
use crate::prompt::synthesize;

pub const CAPTION_MAX_CHARS: usize = 140;
const TITLE_FALLBACK_WORDS: usize = 3;

fn gerund_regex() -> &'static Regex {
    static GERUND_RE: OnceLock<Regex> = OnceLock::new();
    GERUND_RE
        .get_or_init(|| Regex::new(r"\b[A-Za-z]{3,}ing\b").expect("gerund regex should compile"))
}

/// Builds panel `index` from one scene. `prompt_keywords` are the
/// dream-wide keywords fed to the prompt; the panel's own `keywords` are
/// extracted from the scene.
pub fn build_panel(index: usize, scene: &str, prompt_keywords: &[String]) -> DreamPanel {
    let (mood, palette) = classify(scene);
    let prompt = synthesize(scene, &mood, &palette, prompt_keywords);
    DreamPanel {
        id: Uuid::new_v4().to_string(),
        title: panel_title(index, scene),
        caption: caption(scene),
        narration: scene.to_string(),
        prompt,
        mood,
        keywords: extract_keywords(scene, SCENE_KEYWORD_LIMIT),
        layout: PanelLayout::for_index(index),
        palette,
        focus: extract_focus(scene),
    }
}

/// First gerund in the scene, else its first three words, else `Scene N`.
pub fn panel_title(index: usize, scene: &str) -> String {
    if let Some(gerund) = gerund_regex().find(scene) {
        return capitalize(gerund.as_str());
    }
    let lead = leading_words(scene, TITLE_FALLBACK_WORDS);
    if lead.is_empty() {
        return format!("Scene {}", index + 1);
    }
    capitalize(&lead.join(" "))
}

pub fn caption(scene: &str) -> String {
    if scene.chars().count() <= CAPTION_MAX_CHARS {
        return scene.to_string();
    }
    let cut: String = scene.chars().take(CAPTION_MAX_CHARS).collect();
    format!("{}…", cut.trim_end())
}

/// Up to `count` whitespace-separated words with surrounding punctuation
/// stripped.
pub(crate) fn leading_words(text: &str, count: usize) -> Vec<&str> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|ch: char| !ch.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .take(count)
        .collect()
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
