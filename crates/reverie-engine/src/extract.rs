//! Keyword, character, setting and focus extraction.

use std::collections::HashSet;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

pub const GLOBAL_KEYWORD_LIMIT: usize = 6;
pub const SCENE_KEYWORD_LIMIT: usize = 4;
pub const CHARACTER_LIMIT: usize = 5;
pub const SETTING_LIMIT: usize = 4;
pub const FOCUS_LIMIT: usize = 3;

const STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "again", "against", "all", "almost", "along", "also",
    "and", "another", "any", "anyone", "anything", "are", "around", "back", "because", "been",
    "before", "behind", "being", "below", "beside", "between", "both", "but", "came", "can",
    "could", "did", "does", "down", "dream", "dreamed", "dreamt", "during", "each", "even",
    "every", "everyone", "everything", "felt", "finally", "for", "from", "had", "has", "have",
    "her", "here", "hers", "him", "his", "how", "into", "its", "just", "later", "like", "maybe",
    "more", "most", "much", "must", "myself", "near", "never", "next", "nothing", "now", "off",
    "once", "only", "onto", "other", "our", "out", "over", "really", "seemed", "she", "should",
    "some", "someone", "something", "somehow", "soon", "still", "such", "suddenly", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "under", "until", "upon", "very", "was", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
];

const SETTING_VOCABULARY: &[&str] = &[
    "forest", "ocean", "city", "castle", "house", "school", "desert", "mountain", "river",
    "garden", "beach", "cave", "island", "library", "train", "bridge", "village", "temple",
    "space", "sky",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

fn is_stop_word(word: &str) -> bool {
    stop_words().contains(word.to_lowercase().as_str())
}

fn character_regex() -> &'static Regex {
    static CHARACTER_RE: OnceLock<Regex> = OnceLock::new();
    CHARACTER_RE
        .get_or_init(|| Regex::new(r"\b[A-Z][a-z]+\b").expect("character regex should compile"))
}

fn focus_regex() -> &'static Regex {
    static FOCUS_RE: OnceLock<Regex> = OnceLock::new();
    FOCUS_RE.get_or_init(|| Regex::new(r"[a-zA-Z]{4,}").expect("focus regex should compile"))
}

/// Most frequent words longer than three characters, stop words removed.
/// Equal counts keep first-seen order.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .collect();

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 3 || is_stop_word(word) {
            continue;
        }
        *counts.entry(word).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|left, right| right.1.cmp(&left.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Capitalized words of three or more letters that are not stop words,
/// deduplicated in first-seen order.
pub fn extract_characters(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for token in character_regex().find_iter(text) {
        let name = token.as_str();
        if name.len() <= 2 || is_stop_word(name) {
            continue;
        }
        if found.iter().any(|existing| existing == name) {
            continue;
        }
        found.push(name.to_string());
        if found.len() == CHARACTER_LIMIT {
            break;
        }
    }
    found
}

/// Setting nouns contained in the text, in vocabulary order.
pub fn extract_settings(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    SETTING_VOCABULARY
        .iter()
        .filter(|setting| lowered.contains(*setting))
        .take(SETTING_LIMIT)
        .map(|setting| (*setting).to_string())
        .collect()
}

/// First three words of four or more letters, comma-joined.
pub fn extract_focus(text: &str) -> String {
    focus_regex()
        .find_iter(text)
        .take(FOCUS_LIMIT)
        .map(|word| word.as_str())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{
        extract_characters, extract_focus, extract_keywords, extract_settings, GLOBAL_KEYWORD_LIMIT,
    };

    #[test]
    fn keywords_rank_by_frequency() {
        let keywords = extract_keywords(
            "The lantern swayed. The lantern sang! Owls watched the lantern and the owls blinked.",
            GLOBAL_KEYWORD_LIMIT,
        );
        assert_eq!(keywords[0], "lantern");
        assert_eq!(keywords[1], "owls");
    }

    #[test]
    fn keyword_ties_keep_first_seen_order() {
        let keywords = extract_keywords("zephyr marble anchor marble zephyr anchor", 3);
        assert_eq!(keywords, vec!["zephyr", "marble", "anchor"]);
    }

    #[test]
    fn keywords_drop_short_and_stop_words() {
        let keywords = extract_keywords("The cat was there with them, suddenly!", 6);
        assert!(keywords.is_empty(), "{keywords:?}");
    }

    #[test]
    fn keywords_strip_punctuation_and_respect_limit() {
        let keywords = extract_keywords("Crystal-city, velvet; suit: greeted (foxes) quickly", 4);
        assert_eq!(keywords, vec!["crystalcity", "velvet", "suit", "greeted"]);
    }

    #[test]
    fn characters_are_capitalized_non_stop_words() {
        let characters = extract_characters("When Mara met Theo, Mara laughed. Then Ed left. I ran.");
        assert_eq!(characters, vec!["Mara", "Theo"]);
    }

    #[test]
    fn characters_are_capped_at_five() {
        let characters = extract_characters("Ann Bea Cal Dot Eve Fay Gus");
        assert_eq!(characters, vec!["Ann", "Bea", "Cal", "Dot", "Eve"]);
    }

    #[test]
    fn single_letter_pronoun_is_not_a_character() {
        assert!(extract_characters("I was flying over a crystal city.").is_empty());
    }

    #[test]
    fn settings_follow_vocabulary_order() {
        let settings = extract_settings("A river ran past the Castle into a forest by the ocean and a cave.");
        assert_eq!(settings, vec!["forest", "ocean", "castle", "river"]);
    }

    #[test]
    fn focus_takes_first_three_long_words() {
        assert_eq!(
            extract_focus("I was flying over a crystal city."),
            "flying, over, crystal"
        );
        assert_eq!(extract_focus("a b c"), "");
    }
}
