use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::{AnalyzeOptions, DreamPanel, PanelLayout};

pub const RECEIPT_SCHEMA_VERSION: u64 = 1;

/// What the image collaborator is handed for one panel, kept on disk so a
/// render can be traced back to its prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptReceipt {
    pub schema_version: u64,
    pub analysis_index: u64,
    /// SHA-256 hex of the raw narrative.
    pub input_fingerprint: String,
    pub options: AnalyzeOptions,
    pub panel_index: u64,
    pub panel_id: String,
    pub mood: String,
    pub layout: PanelLayout,
    pub palette_name: String,
    pub prompt: String,
    #[serde(default)]
    pub artifacts: Map<String, Value>,
}

impl PromptReceipt {
    pub fn for_panel(
        analysis_index: u64,
        input_fingerprint: &str,
        options: AnalyzeOptions,
        panel_index: usize,
        panel: &DreamPanel,
    ) -> Self {
        Self {
            schema_version: RECEIPT_SCHEMA_VERSION,
            analysis_index,
            input_fingerprint: input_fingerprint.to_string(),
            options,
            panel_index: panel_index as u64,
            panel_id: panel.id.clone(),
            mood: panel.mood.clone(),
            layout: panel.layout,
            palette_name: panel.palette.name.clone(),
            prompt: panel.prompt.clone(),
            artifacts: Map::new(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "receipt-{:03}-{:02}.json",
            self.analysis_index, self.panel_index
        )
    }
}

pub fn write_receipt(path: &Path, receipt: &PromptReceipt) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(receipt)?)
        .with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

pub fn read_receipt(path: &Path) -> anyhow::Result<PromptReceipt> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}
