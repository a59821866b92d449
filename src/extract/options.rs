//! Text extraction options.

use crate::model::Color;

/// Default CIE76 distance under which a fill color counts as background.
pub const DEFAULT_TOLERANCE: f32 = 3.0;

/// Default effective font size (points) below which text is unreadable.
pub const DEFAULT_MIN_FONT_SIZE: f32 = 0.5;

/// Options for text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Drop runs a reader cannot see
    pub exclude_invisible: bool,

    /// Perceptual distance (ΔE76) treated as "same as background"
    pub tolerance: f32,

    /// Page background color
    pub background: Color,

    /// Runs with a smaller effective font size are invisible
    pub min_font_size: f32,

    /// Separate runs on different baselines with newlines
    pub preserve_lines: bool,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only text a human reader would see.
    pub fn visible_only() -> Self {
        Self::default().excluding_invisible(true)
    }

    pub fn excluding_invisible(mut self, exclude: bool) -> Self {
        self.exclude_invisible = exclude;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.min_font_size = size.max(0.0);
        self
    }

    pub fn preserving_lines(mut self, preserve: bool) -> Self {
        self.preserve_lines = preserve;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            exclude_invisible: false,
            tolerance: DEFAULT_TOLERANCE,
            background: Color::WHITE,
            min_font_size: DEFAULT_MIN_FONT_SIZE,
            preserve_lines: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert!(!options.exclude_invisible);
        assert_eq!(options.tolerance, 3.0);
        assert_eq!(options.background, Color::WHITE);
        assert_eq!(options.min_font_size, 0.5);
        assert!(!options.preserve_lines);
    }

    #[test]
    fn test_builder_clamps_negative_values() {
        let options = ExtractOptions::visible_only()
            .with_tolerance(-1.0)
            .with_min_font_size(-2.0)
            .preserving_lines(true);
        assert!(options.exclude_invisible);
        assert_eq!(options.tolerance, 0.0);
        assert_eq!(options.min_font_size, 0.0);
        assert!(options.preserve_lines);
    }
}
