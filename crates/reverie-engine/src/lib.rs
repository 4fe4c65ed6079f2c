//! Dream analysis and panelization.
//!
//! [`analyze`] is the pure pipeline: normalize, segment, fit scenes to the
//! panel budget, classify tone, extract keywords/characters/settings and
//! assemble one [`DreamPanel`] per scene. [`DreamEngine`] wraps it for a run
//! directory, logging events and writing analyses, prompt receipts, dry-run
//! renders and a summary.

pub mod analyze;
pub mod extract;
pub mod panels;
pub mod prompt;
pub mod render;
pub mod text;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use reverie_contracts::analysis::{AnalyzeOptions, DreamAnalysis};
use reverie_contracts::events::{now_utc_iso, EventWriter};
use reverie_contracts::renderers::{RenderRequest, RenderedPanel, RendererRegistry};
use reverie_contracts::runs::receipts::{write_receipt, PromptReceipt};
use reverie_contracts::runs::summary::{write_summary, AnalysisDigest, RunSummary};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

pub use analyze::{analyze, analyze_traced, AnalysisTrace, FALLBACK_STORY_TITLE};
pub use render::{default_renderer_registry, DryrunRenderer, DRYRUN_RENDERER};
pub use reverie_contracts::analysis::DreamPanel;
pub use reverie_contracts::tones::classify;
pub use text::{combine, normalize, segment};

#[derive(Debug, Clone)]
struct AnalysisRecord {
    index: u64,
    analysis: DreamAnalysis,
    receipts: Vec<(PathBuf, PromptReceipt)>,
}

pub struct DreamEngine {
    run_dir: PathBuf,
    run_id: String,
    events: EventWriter,
    options: AnalyzeOptions,
    summary_path: PathBuf,
    started_at: String,
    renderers: RendererRegistry,
    renderer: String,
    digests: Vec<AnalysisDigest>,
    last: Option<AnalysisRecord>,
    total_panels: u64,
    total_renders: u64,
}

impl DreamEngine {
    pub fn new(
        run_dir: impl Into<PathBuf>,
        events_path: impl Into<PathBuf>,
        options: AnalyzeOptions,
    ) -> Result<Self> {
        let run_dir = run_dir.into();
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("failed creating {}", run_dir.display()))?;
        let run_id = run_dir
            .file_name()
            .and_then(|value| value.to_str())
            .filter(|value| !value.is_empty())
            .unwrap_or("reverie-run")
            .to_string();
        let events = EventWriter::new(events_path.into(), run_id.clone());
        let summary_path = run_dir.join("summary.json");

        events.emit_json(
            "run_started",
            json!({
                "out_dir": run_dir.to_string_lossy().to_string(),
                "options": options,
            }),
        )?;

        Ok(Self {
            run_dir,
            run_id,
            events,
            options,
            summary_path,
            started_at: now_utc_iso(),
            renderers: default_renderer_registry(),
            renderer: DRYRUN_RENDERER.to_string(),
            digests: Vec::new(),
            last: None,
            total_panels: 0,
            total_renders: 0,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn options(&self) -> AnalyzeOptions {
        self.options
    }

    pub fn set_options(&mut self, options: AnalyzeOptions) {
        self.options = options;
    }

    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    pub fn set_renderer(&mut self, name: &str) -> Result<()> {
        if self.renderers.get(name).is_none() {
            bail!(
                "unknown renderer '{name}'; available: {}",
                self.renderers.names().join(", ")
            );
        }
        self.renderer = name.to_string();
        Ok(())
    }

    pub fn last_analysis(&self) -> Option<&DreamAnalysis> {
        self.last.as_ref().map(|record| &record.analysis)
    }

    /// Analyzes `text` with the engine's options, logging each stage and
    /// writing `analysis-NNN.json` plus one prompt receipt per panel.
    pub fn analyze(&mut self, text: &str) -> Result<DreamAnalysis> {
        let index = self.digests.len() as u64;
        let fingerprint = input_fingerprint(text);
        let options = self.options;

        self.events.emit_json(
            "analysis_started",
            json!({
                "analysis_index": index,
                "chars": text.chars().count(),
                "input_fingerprint": fingerprint,
                "options": options,
            }),
        )?;

        let (analysis, trace) = analyze_traced(text, &options);
        self.events.emit_json(
            "scenes_segmented",
            json!({
                "analysis_index": index,
                "input_chars": trace.input_chars,
                "normalized_chars": trace.normalized_chars,
                "sentences": trace.sentences,
                "scenes": trace.scenes,
            }),
        )?;

        let receipts_dir = self.run_dir.join("receipts");
        let mut receipts = Vec::with_capacity(analysis.panels.len());
        for (panel_index, panel) in analysis.panels.iter().enumerate() {
            let receipt = PromptReceipt::for_panel(index, &fingerprint, options, panel_index, panel);
            let receipt_path = receipts_dir.join(receipt.file_name());
            write_receipt(&receipt_path, &receipt)?;
            self.events.emit_json(
                "panel_built",
                json!({
                    "analysis_index": index,
                    "panel_index": panel_index,
                    "panel_id": panel.id,
                    "title": panel.title,
                    "mood": panel.mood,
                    "layout": panel.layout,
                    "prompt": panel.prompt,
                    "receipt_path": receipt_path.to_string_lossy().to_string(),
                }),
            )?;
            receipts.push((receipt_path, receipt));
        }

        let analysis_path = self.run_dir.join(format!("analysis-{index:03}.json"));
        write_json(&analysis_path, &analysis)?;
        self.events.emit_json(
            "analysis_finished",
            json!({
                "analysis_index": index,
                "story_title": analysis.story_title,
                "tone": analysis.tone,
                "panels": analysis.panels.len(),
                "analysis_path": analysis_path.to_string_lossy().to_string(),
            }),
        )?;

        self.total_panels += analysis.panels.len() as u64;
        self.digests.push(AnalysisDigest {
            analysis_index: index,
            story_title: analysis.story_title.clone(),
            tone: analysis.tone.clone(),
            panels: analysis.panels.len() as u64,
        });
        self.last = Some(AnalysisRecord {
            index,
            analysis: analysis.clone(),
            receipts,
        });
        Ok(analysis)
    }

    /// Hands every panel of the latest analysis to the active renderer and
    /// records the artifacts on the panel receipts.
    pub fn render_panels(&mut self) -> Result<Vec<RenderedPanel>> {
        let renderer = self
            .renderers
            .get(&self.renderer)
            .ok_or_else(|| anyhow!("renderer '{}' is not registered", self.renderer))?;
        let Some(record) = self.last.as_mut() else {
            bail!("nothing to render; analyze a dream first");
        };

        let out_dir = self.run_dir.join("panels");
        let mut rendered = Vec::with_capacity(record.analysis.panels.len());
        for (panel_index, panel) in record.analysis.panels.iter().enumerate() {
            let request = RenderRequest::for_panel(&out_dir, panel_index, panel);
            let result = renderer.render(&request)?;

            if let Some((receipt_path, receipt)) = record.receipts.get_mut(panel_index) {
                receipt.artifacts = artifact_map(renderer.name(), &result);
                write_receipt(receipt_path, receipt)?;
            }
            self.events.emit_json(
                "panel_rendered",
                json!({
                    "analysis_index": record.index,
                    "panel_index": panel_index,
                    "panel_id": panel.id,
                    "renderer": renderer.name(),
                    "image_path": result.image_path.to_string_lossy().to_string(),
                    "width": result.width,
                    "height": result.height,
                    "warnings": result.warnings,
                }),
            )?;
            self.total_renders += 1;
            rendered.push(result);
        }
        Ok(rendered)
    }

    /// Writes the latest analysis as pretty JSON to `path`.
    pub fn export_last(&self, path: &Path) -> Result<()> {
        let Some(analysis) = self.last_analysis() else {
            bail!("nothing to export; analyze a dream first");
        };
        write_json(path, analysis)?;
        self.events.emit_json(
            "analysis_exported",
            json!({ "path": path.to_string_lossy().to_string() }),
        )?;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        let summary = RunSummary {
            run_id: self.run_id.clone(),
            started_at: self.started_at.clone(),
            finished_at: now_utc_iso(),
            total_analyses: self.digests.len() as u64,
            total_panels: self.total_panels,
            total_renders: self.total_renders,
            analyses: self.digests.clone(),
        };
        let mut extra = Map::new();
        extra.insert("options".to_string(), serde_json::to_value(self.options)?);
        extra.insert("renderer".to_string(), Value::String(self.renderer.clone()));
        write_summary(&self.summary_path, &summary, Some(&extra))?;
        self.events.emit_json(
            "run_finished",
            json!({
                "summary_path": self.summary_path.to_string_lossy().to_string(),
            }),
        )?;
        Ok(())
    }
}

/// SHA-256 hex of the raw narrative.
pub fn input_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn artifact_map(renderer: &str, rendered: &RenderedPanel) -> Map<String, Value> {
    let mut artifacts = Map::new();
    artifacts.insert("renderer".to_string(), Value::String(renderer.to_string()));
    artifacts.insert(
        "image_path".to_string(),
        Value::String(rendered.image_path.to_string_lossy().to_string()),
    );
    artifacts.insert("width".to_string(), json!(rendered.width));
    artifacts.insert("height".to_string(), json!(rendered.height));
    artifacts.insert(
        "renderer_request".to_string(),
        Value::Object(rendered.renderer_request.clone()),
    );
    artifacts
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}
