mod model;
mod options;
mod palette;

pub use model::{DreamAnalysis, DreamPanel, PanelLayout, LAYOUT_CYCLE};
pub use options::{parse_flag, AnalyzeOptions, DEFAULT_MAX_PANELS, MAX_PANELS_ENV, MERGE_SHORT_ENV};
pub use palette::{parse_hex_rgb, Palette, PaletteSpec};
