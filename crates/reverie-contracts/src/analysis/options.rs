use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PANELS: usize = 6;
pub const MAX_PANELS_ENV: &str = "REVERIE_MAX_PANELS";
pub const MERGE_SHORT_ENV: &str = "REVERIE_MERGE_SHORT";

/// Knobs for a single analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Merge neighbouring sentences when there are more than `max_panels`;
    /// otherwise the extra sentences are dropped.
    #[serde(default = "default_merge_short")]
    pub merge_short: bool,
    #[serde(default = "default_max_panels")]
    pub max_panels: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            merge_short: default_merge_short(),
            max_panels: default_max_panels(),
        }
    }
}

impl AnalyzeOptions {
    pub fn new(merge_short: bool, max_panels: usize) -> Self {
        Self {
            merge_short,
            max_panels,
        }
    }

    /// Defaults overlaid with `REVERIE_MAX_PANELS` / `REVERIE_MERGE_SHORT`.
    /// Blank or unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::default().overlay(non_empty_env(MAX_PANELS_ENV), non_empty_env(MERGE_SHORT_ENV))
    }

    fn overlay(mut self, max_panels: Option<String>, merge_short: Option<String>) -> Self {
        if let Some(value) = max_panels.and_then(|raw| raw.parse::<usize>().ok()) {
            self.max_panels = value;
        }
        if let Some(value) = merge_short.as_deref().and_then(parse_flag) {
            self.merge_short = value;
        }
        self
    }

    /// Panel target actually used by the pipeline (never below 1).
    pub fn panel_target(&self) -> usize {
        self.max_panels.max(1)
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_merge_short() -> bool {
    true
}

fn default_max_panels() -> usize {
    DEFAULT_MAX_PANELS
}
