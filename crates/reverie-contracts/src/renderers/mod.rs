//! Seam for the external image generator. Panels leave the engine as a
//! prompt plus a mood and palette; whatever turns them into pixels lives
//! behind [`PanelRenderer`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::analysis::{DreamPanel, Palette, PanelLayout};

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub out_dir: PathBuf,
    pub panel_index: usize,
    pub panel_id: String,
    pub prompt: String,
    pub mood: String,
    pub layout: PanelLayout,
    pub palette: Palette,
}

impl RenderRequest {
    pub fn for_panel(out_dir: impl Into<PathBuf>, panel_index: usize, panel: &DreamPanel) -> Self {
        Self {
            out_dir: out_dir.into(),
            panel_index,
            panel_id: panel.id.clone(),
            prompt: panel.prompt.clone(),
            mood: panel.mood.clone(),
            layout: panel.layout,
            palette: panel.palette.clone(),
        }
    }

    /// Pixel size for the layout slot: wide panels, a tall portrait slot.
    pub fn dimensions(&self) -> (u32, u32) {
        match self.layout {
            PanelLayout::Full => (1024, 576),
            PanelLayout::SplitLeft | PanelLayout::SplitRight => (512, 576),
            PanelLayout::Tall => (512, 896),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPanel {
    pub image_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub renderer_request: Map<String, Value>,
    pub warnings: Vec<String>,
}

pub trait PanelRenderer: Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, request: &RenderRequest) -> anyhow::Result<RenderedPanel>;
}

#[derive(Default)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn PanelRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: PanelRenderer + 'static>(&mut self, renderer: R) {
        self.renderers
            .insert(renderer.name().to_string(), Box::new(renderer));
    }

    pub fn get(&self, name: &str) -> Option<&dyn PanelRenderer> {
        self.renderers.get(name).map(|renderer| renderer.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.renderers.keys().cloned().collect()
    }
}
