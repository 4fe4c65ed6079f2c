use serde::{Deserialize, Serialize};

use super::palette::Palette;

/// Positional arrangement of a panel on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelLayout {
    Full,
    SplitLeft,
    SplitRight,
    Tall,
}

/// Layout assigned to panel `i` is `LAYOUT_CYCLE[i % 4]`.
pub const LAYOUT_CYCLE: [PanelLayout; 4] = [
    PanelLayout::Full,
    PanelLayout::SplitLeft,
    PanelLayout::SplitRight,
    PanelLayout::Tall,
];

impl PanelLayout {
    pub fn for_index(index: usize) -> Self {
        LAYOUT_CYCLE[index % LAYOUT_CYCLE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelLayout::Full => "full",
            PanelLayout::SplitLeft => "split-left",
            PanelLayout::SplitRight => "split-right",
            PanelLayout::Tall => "tall",
        }
    }
}

impl std::fmt::Display for PanelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One visual scene of the comic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamPanel {
    pub id: String,
    pub title: String,
    /// Scene text capped at 140 characters, `…` appended when cut.
    pub caption: String,
    /// Full scene text.
    pub narration: String,
    /// Instruction string for the external image generator.
    pub prompt: String,
    /// Tone classified from this scene alone; may differ from the dream's tone.
    pub mood: String,
    pub keywords: Vec<String>,
    pub layout: PanelLayout,
    pub palette: Palette,
    pub focus: String,
}

/// Result of analyzing one dream narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamAnalysis {
    pub story_title: String,
    pub synopsis: String,
    pub tone: String,
    pub keywords: Vec<String>,
    pub characters: Vec<String>,
    pub settings: Vec<String>,
    pub palette: Palette,
    pub panels: Vec<DreamPanel>,
}

impl DreamAnalysis {
    pub fn prompts(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|panel| panel.prompt.as_str())
    }
}
