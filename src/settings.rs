use crate::draw::history::{CanvasSize, Editor, DEFAULT_CANVAS_SIZE};
use crate::draw::settings::GeometrySettings;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger runs at debug level and honours `RUST_LOG`.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Append log output to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_canvas_size")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_size")]
    pub canvas_height: u32,
    #[serde(default)]
    pub geometry: GeometrySettings,
}

fn default_canvas_size() -> u32 {
    DEFAULT_CANVAS_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            canvas_width: default_canvas_size(),
            canvas_height: default_canvas_size(),
            geometry: GeometrySettings::default(),
        }
    }
}

impl Settings {
    /// Missing or empty files yield the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("parse settings file {path}"))?;
        settings.geometry.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write settings file {path}"))?;
        Ok(())
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }

    /// An empty editor configured from these settings.
    pub fn new_editor(&self) -> Editor {
        Editor::new(self.canvas(), self.geometry)
    }
}
