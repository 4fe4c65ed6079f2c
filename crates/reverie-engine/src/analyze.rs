use reverie_contracts::analysis::{AnalyzeOptions, DreamAnalysis};
use reverie_contracts::tones::classify;

use crate::extract::{extract_characters, extract_keywords, extract_settings, GLOBAL_KEYWORD_LIMIT};
use crate::panels::{build_panel, capitalize, leading_words};
use crate::text::{fit_scenes, normalize, segment};

pub const FALLBACK_STORY_TITLE: &str = "Dream Sequence";
const SYNOPSIS_SCENES: usize = 3;

/// Counts gathered on the way through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisTrace {
    pub input_chars: usize,
    pub normalized_chars: usize,
    pub sentences: usize,
    pub scenes: usize,
}

/// Turns a raw dream narrative into a titled, panelized analysis. Never
/// fails: empty or signal-free text yields fallback values.
pub fn analyze(text: &str, options: &AnalyzeOptions) -> DreamAnalysis {
    analyze_traced(text, options).0
}

pub fn analyze_traced(text: &str, options: &AnalyzeOptions) -> (DreamAnalysis, AnalysisTrace) {
    let normalized = normalize(text);
    let sentences = segment(&normalized);
    let sentence_count = sentences.len();

    let mut scenes = fit_scenes(sentences, options);
    if scenes.is_empty() && !normalized.is_empty() {
        scenes.push(normalized.clone());
    }

    let combined = scenes.join(" ");
    let keywords = extract_keywords(&combined, GLOBAL_KEYWORD_LIMIT);
    let panels = scenes
        .iter()
        .enumerate()
        .map(|(index, scene)| build_panel(index, scene, &keywords))
        .collect();

    let (tone, palette) = classify(&combined);
    let characters = extract_characters(text);
    let settings = extract_settings(&combined);
    let story_title = story_title(&characters, &tone, &scenes);
    let synopsis = scenes
        .iter()
        .take(SYNOPSIS_SCENES)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(" ");

    let trace = AnalysisTrace {
        input_chars: text.chars().count(),
        normalized_chars: normalized.chars().count(),
        sentences: sentence_count,
        scenes: scenes.len(),
    };
    let analysis = DreamAnalysis {
        story_title,
        synopsis,
        tone,
        keywords,
        characters,
        settings,
        palette,
        panels,
    };
    (analysis, trace)
}

fn story_title(characters: &[String], tone: &str, scenes: &[String]) -> String {
    if let Some(lead) = characters.first() {
        let noun = if tone == "nightmare" { "Midnight" } else { "Dream" };
        return format!("{lead}'s {noun}");
    }
    let opening = scenes
        .first()
        .map(|scene| leading_words(scene, 2))
        .unwrap_or_default();
    if opening.is_empty() {
        return FALLBACK_STORY_TITLE.to_string();
    }
    opening
        .into_iter()
        .map(capitalize)
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use reverie_contracts::analysis::{AnalyzeOptions, LAYOUT_CYCLE};
    use reverie_contracts::tones::DEFAULT_TONE;

    use super::{analyze, analyze_traced, FALLBACK_STORY_TITLE};

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "no punctuation just a drifting thought",
        "I was flying over a crystal city. A fox in a velvet suit greeted me.",
        "Mara ran. The storm chased her. Dark water rose! She screamed? Theo pulled her out. \
         They climbed the mountain. Treasure glittered. Stars spun. Calm returned. The end.",
        "?!...",
        "One. Two. Three. Four. Five. Six. Seven. Eight. Nine. Ten. Eleven. Twelve. Thirteen.",
    ];

    #[test]
    fn empty_input_yields_populated_fallbacks() {
        let analysis = analyze("", &AnalyzeOptions::default());
        assert!(analysis.panels.is_empty());
        assert_eq!(analysis.story_title, FALLBACK_STORY_TITLE);
        assert_eq!(analysis.synopsis, "");
        assert!(analysis.keywords.is_empty());
        assert!(analysis.characters.is_empty());
        assert!(analysis.settings.is_empty());
        assert_eq!(analysis.tone, DEFAULT_TONE);
        assert_eq!(analysis.palette.name, "Moonlit Ink");
    }

    #[test]
    fn crystal_city_regression() {
        let analysis = analyze(
            "I was flying over a crystal city. A fox in a velvet suit greeted me.",
            &AnalyzeOptions::new(true, 4),
        );
        assert_eq!(analysis.panels.len(), 2);
        assert_eq!(analysis.tone, DEFAULT_TONE);
        assert!(analysis.characters.is_empty());
        assert_eq!(analysis.settings, vec!["city"]);
        assert_eq!(analysis.story_title, "I Was");
        assert_eq!(
            analysis.synopsis,
            "I was flying over a crystal city. A fox in a velvet suit greeted me."
        );
        assert_eq!(analysis.panels[0].title, "Flying");
        assert_eq!(analysis.panels[1].narration, "A fox in a velvet suit greeted me.");
    }

    #[test]
    fn named_character_titles_the_story() {
        let analysis = analyze(
            "Mara walked through a glowing forest. Stars fell like magic.",
            &AnalyzeOptions::default(),
        );
        assert_eq!(analysis.characters, vec!["Mara", "Stars"]);
        assert_eq!(analysis.tone, "wonder");
        assert_eq!(analysis.story_title, "Mara's Dream");
        assert_eq!(analysis.settings, vec!["forest"]);
    }

    #[test]
    fn nightmare_story_title_uses_midnight() {
        let analysis = analyze(
            "Theo was trapped in a dark house. A monster screamed in the shadow.",
            &AnalyzeOptions::default(),
        );
        assert_eq!(analysis.tone, "nightmare");
        assert_eq!(analysis.story_title, "Theo's Midnight");
    }

    #[test]
    fn characters_come_from_raw_text() {
        let analysis = analyze("Nadia", &AnalyzeOptions::new(false, 1));
        assert_eq!(analysis.characters, vec!["Nadia"]);
        assert_eq!(analysis.panels.len(), 1);
    }

    #[test]
    fn characters_use_raw_text_while_keywords_and_settings_use_kept_scenes() {
        let analysis = analyze(
            "Alpha rode. Bravo sailed the ocean. Mara laughed.",
            &AnalyzeOptions::new(false, 1),
        );
        assert_eq!(analysis.panels.len(), 1);
        assert_eq!(analysis.panels[0].narration, "Alpha rode.");
        assert_eq!(analysis.characters, vec!["Alpha", "Bravo", "Mara"]);
        assert!(analysis.settings.is_empty());
        assert!(!analysis.keywords.iter().any(|keyword| keyword == "ocean"));
        assert_eq!(analysis.keywords, vec!["alpha", "rode"]);
        assert_eq!(analysis.tone, DEFAULT_TONE);
    }

    #[test]
    fn ten_short_sentences_merge_into_three_scenes() {
        let text = "Alpha. Bravo. Charlie. Delta. Echo. Foxtrot. Golf. Hotel. India. Juliet.";
        let (analysis, trace) = analyze_traced(text, &AnalyzeOptions::new(true, 3));
        assert_eq!(trace.sentences, 10);
        assert_eq!(analysis.panels.len(), 3);
        assert_eq!(analysis.panels[0].narration, "Alpha. Bravo. Charlie. Delta.");
        assert_eq!(analysis.panels[2].narration, "India. Juliet.");
    }

    #[test]
    fn truncation_keeps_leading_sentences() {
        let text = "Alpha. Bravo. Charlie. Delta.";
        let analysis = analyze(text, &AnalyzeOptions::new(false, 2));
        let narrations: Vec<&str> = analysis
            .panels
            .iter()
            .map(|panel| panel.narration.as_str())
            .collect();
        assert_eq!(narrations, vec!["Alpha.", "Bravo."]);
    }

    #[test]
    fn punctuation_only_input_becomes_single_scene() {
        let analysis = analyze("?!...", &AnalyzeOptions::default());
        assert_eq!(analysis.panels.len(), 1);
        assert_eq!(analysis.panels[0].narration, "?!...");
        assert_eq!(analysis.panels[0].title, "Scene 1");
        assert_eq!(analysis.story_title, FALLBACK_STORY_TITLE);
    }

    #[test]
    fn panel_count_never_exceeds_max_panels() {
        for sample in SAMPLES {
            for max_panels in 1..8 {
                for merge_short in [true, false] {
                    let options = AnalyzeOptions::new(merge_short, max_panels);
                    let analysis = analyze(sample, &options);
                    assert!(analysis.panels.len() <= max_panels, "{sample:?} {options:?}");
                }
            }
        }
    }

    #[test]
    fn non_empty_input_yields_panels_with_prompts() {
        for sample in SAMPLES.iter().filter(|sample| !sample.trim().is_empty()) {
            let analysis = analyze(sample, &AnalyzeOptions::default());
            assert!(!analysis.panels.is_empty(), "{sample:?}");
            assert!(analysis.panels.iter().all(|panel| !panel.prompt.is_empty()));
        }
    }

    #[test]
    fn layouts_cycle_by_position() {
        let text = "One. Two. Three. Four. Five. Six.";
        let analysis = analyze(text, &AnalyzeOptions::new(true, 6));
        assert_eq!(analysis.panels.len(), 6);
        for (index, panel) in analysis.panels.iter().enumerate() {
            assert_eq!(panel.layout, LAYOUT_CYCLE[index % 4]);
        }
    }

    #[test]
    fn synopsis_joins_first_three_scenes() {
        let analysis = analyze("One. Two. Three. Four.", &AnalyzeOptions::new(true, 6));
        assert_eq!(analysis.synopsis, "One. Two. Three.");
    }

    #[test]
    fn analysis_serializes_with_wire_names() -> anyhow::Result<()> {
        let analysis = analyze("Mara sailed the ocean.", &AnalyzeOptions::default());
        let value = serde_json::to_value(&analysis)?;
        assert_eq!(value["storyTitle"], serde_json::json!("Mara's Dream"));
        assert_eq!(value["panels"][0]["layout"], serde_json::json!("full"));
        assert!(value["palette"].get("gradientDark").is_some());
        Ok(())
    }
}
