//! Appearance of the embedded keyword layer.

use crate::model::Color;

/// How the invisible keyword layer is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct InvisibleStyle {
    /// Standard Type1 font used for the layer; never embedded
    pub base_font: String,

    /// Font size in points
    pub font_size: f32,

    /// Fill color; should match the page background
    pub fill: Color,

    /// Text origin in user space
    pub anchor: (f32, f32),

    /// Compress the appended stream with FlateDecode
    pub compress: bool,
}

impl InvisibleStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_font(mut self, font: impl Into<String>) -> Self {
        self.base_font = font.into();
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = color;
        self
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = (x, y);
        self
    }

    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl Default for InvisibleStyle {
    fn default() -> Self {
        Self {
            base_font: "Helvetica".to_string(),
            font_size: 0.1,
            fill: Color::WHITE,
            anchor: (1.0, 1.0),
            compress: false,
        }
    }
}
