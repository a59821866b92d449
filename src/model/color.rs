//! Device colors and perceptual distance.

use serde::{Deserialize, Serialize};

/// A fill color in one of the device color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", content = "components", rename_all = "lowercase")]
pub enum Color {
    Gray(f32),
    Rgb(f32, f32, f32),
    Cmyk(f32, f32, f32, f32),
}

impl Color {
    pub const WHITE: Color = Color::Gray(1.0);
    pub const BLACK: Color = Color::Gray(0.0);

    /// Build a color from operand components: 1 gray, 3 RGB, 4 CMYK.
    pub fn from_components(components: &[f32]) -> Option<Color> {
        let c = |v: f32| v.clamp(0.0, 1.0);
        match *components {
            [g] => Some(Color::Gray(c(g))),
            [r, g, b] => Some(Color::Rgb(c(r), c(g), c(b))),
            [cy, m, y, k] => Some(Color::Cmyk(c(cy), c(m), c(y), c(k))),
            _ => None,
        }
    }

    /// Parse `#rrggbb` (or `rrggbb`).
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::Rgb(
            channel(0)? as f32 / 255.0,
            channel(2)? as f32 / 255.0,
            channel(4)? as f32 / 255.0,
        ))
    }

    pub fn components(&self) -> Vec<f32> {
        match *self {
            Color::Gray(g) => vec![g],
            Color::Rgb(r, g, b) => vec![r, g, b],
            Color::Cmyk(c, m, y, k) => vec![c, m, y, k],
        }
    }

    /// Content stream operator that sets this as the fill color.
    pub fn fill_operator(&self) -> &'static str {
        match self {
            Color::Gray(_) => "g",
            Color::Rgb(..) => "rg",
            Color::Cmyk(..) => "k",
        }
    }

    /// Naive device conversion to sRGB components in [0, 1].
    pub fn to_rgb(&self) -> [f32; 3] {
        match *self {
            Color::Gray(g) => [g, g, g],
            Color::Rgb(r, g, b) => [r, g, b],
            Color::Cmyk(c, m, y, k) => [(1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)],
        }
    }

    /// CIE L*a*b* under D65.
    pub fn to_lab(&self) -> [f32; 3] {
        let [r, g, b] = self.to_rgb().map(srgb_to_linear);

        let x = (0.4124 * r + 0.3576 * g + 0.1805 * b) / 0.95047;
        let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
        let z = (0.0193 * r + 0.1192 * g + 0.9505 * b) / 1.08883;

        let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
        [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
    }

    /// CIE76 color difference.
    pub fn delta_e(&self, other: &Color) -> f32 {
        let a = self.to_lab();
        let b = other.to_lab();
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_equivalents_have_no_distance() {
        let rgb_white = Color::Rgb(1.0, 1.0, 1.0);
        let cmyk_white = Color::Cmyk(0.0, 0.0, 0.0, 0.0);
        assert!(Color::WHITE.delta_e(&rgb_white) < 0.01);
        assert!(Color::WHITE.delta_e(&cmyk_white) < 0.01);
    }

    #[test]
    fn test_lab_of_white_and_black() {
        let white = Color::WHITE.to_lab();
        assert!((white[0] - 100.0).abs() < 0.1);
        let black = Color::BLACK.to_lab();
        assert!(black[0].abs() < 0.1);
        assert!(Color::WHITE.delta_e(&Color::BLACK) > 99.0);
    }

    #[test]
    fn test_near_white_is_within_small_tolerance() {
        assert!(Color::WHITE.delta_e(&Color::Gray(0.995)) < 3.0);
        assert!(Color::WHITE.delta_e(&Color::Gray(0.9)) > 3.0);
    }

    #[test]
    fn test_from_components_and_hex() {
        assert_eq!(Color::from_components(&[0.5]), Some(Color::Gray(0.5)));
        assert_eq!(
            Color::from_components(&[2.0, 0.0, 0.0]),
            Some(Color::Rgb(1.0, 0.0, 0.0))
        );
        assert_eq!(Color::from_components(&[0.1, 0.2]), None);
        assert_eq!(Color::from_hex("#ffffff"), Some(Color::Rgb(1.0, 1.0, 1.0)));
        assert_eq!(Color::from_hex("zzz"), None);
        assert_eq!(Color::Cmyk(0.0, 0.0, 0.0, 1.0).fill_operator(), "k");
    }
}
