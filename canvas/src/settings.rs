//! Global display settings kept by the record store.
//!
//! These only feed the settings form; nothing in the editor's geometry
//! depends on them.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Serialize};

/// Layout of the highlight box projected next to a located book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub box_width: u32,
    pub box_height: u32,
    pub font_scale: f64,
    pub font_thickness: u32,
    pub max_lines: u32,
    pub line_spacing: u32,
    pub padding: u32,
    pub background_opacity: f64,
    pub white_block_opacity: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            box_width: 600,
            box_height: 180,
            font_scale: 1.5,
            font_thickness: 3,
            max_lines: 3,
            line_spacing: 8,
            padding: 15,
            background_opacity: 0.6,
            white_block_opacity: 0.6,
        }
    }
}

/// Sparse settings update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_thickness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_block_opacity: Option<f64>,
}

impl DisplaySettings {
    /// Apply the fields present in `partial`.
    pub fn apply_partial(&mut self, partial: &PartialSettings) {
        if let Some(v) = partial.box_width {
            self.box_width = v;
        }
        if let Some(v) = partial.box_height {
            self.box_height = v;
        }
        if let Some(v) = partial.font_scale {
            self.font_scale = v;
        }
        if let Some(v) = partial.font_thickness {
            self.font_thickness = v;
        }
        if let Some(v) = partial.max_lines {
            self.max_lines = v;
        }
        if let Some(v) = partial.line_spacing {
            self.line_spacing = v;
        }
        if let Some(v) = partial.padding {
            self.padding = v;
        }
        if let Some(v) = partial.background_opacity {
            self.background_opacity = v;
        }
        if let Some(v) = partial.white_block_opacity {
            self.white_block_opacity = v;
        }
    }
}
