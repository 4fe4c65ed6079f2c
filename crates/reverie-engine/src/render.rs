use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use reverie_contracts::analysis::parse_hex_rgb;
use reverie_contracts::renderers::{PanelRenderer, RenderRequest, RenderedPanel, RendererRegistry};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

pub const DRYRUN_RENDERER: &str = "dryrun";

const FALLBACK_RGB: (u8, u8, u8) = (20, 26, 46);
const BORDER_PX: u32 = 8;

/// Stand-in for the image generator: writes a PNG swatch in the panel's
/// palette, tinted by the prompt hash, framed in the border color.
pub struct DryrunRenderer;

impl PanelRenderer for DryrunRenderer {
    fn name(&self) -> &str {
        DRYRUN_RENDERER
    }

    fn render(&self, request: &RenderRequest) -> Result<RenderedPanel> {
        let (width, height) = request.dimensions();
        let digest = prompt_digest(&request.prompt);
        let image_path = request.out_dir.join(format!(
            "panel-{:02}-{}.png",
            request.panel_index,
            hex::encode(&digest[..4])
        ));

        let mut warnings = Vec::new();
        let background = parse_hex_rgb(&request.palette.background).unwrap_or_else(|| {
            warnings.push(format!(
                "background '{}' is not #rrggbb; using fallback fill",
                request.palette.background
            ));
            FALLBACK_RGB
        });
        let fill = tint(background, &digest);
        let border = parse_hex_rgb(&request.palette.border).unwrap_or(background);
        write_swatch(&image_path, width, height, fill, border)?;

        Ok(RenderedPanel {
            image_path,
            width,
            height,
            renderer_request: map_object(json!({
                "renderer": DRYRUN_RENDERER,
                "prompt": request.prompt,
                "mood": request.mood,
                "layout": request.layout,
                "palette": request.palette.name,
                "size": format!("{width}x{height}"),
            })),
            warnings,
        })
    }
}

pub fn default_renderer_registry() -> RendererRegistry {
    let mut registry = RendererRegistry::new();
    registry.register(DryrunRenderer);
    registry
}

fn prompt_digest(prompt: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Nudges each channel a quarter of the way toward the digest byte.
fn tint(base: (u8, u8, u8), digest: &[u8; 32]) -> (u8, u8, u8) {
    let mix = |channel: u8, noise: u8| ((u16::from(channel) * 3 + u16::from(noise)) / 4) as u8;
    (
        mix(base.0, digest[0]),
        mix(base.1, digest[1]),
        mix(base.2, digest[2]),
    )
}

fn write_swatch(
    path: &Path,
    width: u32,
    height: u32,
    fill: (u8, u8, u8),
    border: (u8, u8, u8),
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    let image = RgbImage::from_fn(width, height, |x, y| {
        let on_edge =
            x < BORDER_PX || y < BORDER_PX || x + BORDER_PX >= width || y + BORDER_PX >= height;
        let (r, g, b) = if on_edge { border } else { fill };
        Rgb([r, g, b])
    });
    image
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(())
}

fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
