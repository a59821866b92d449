//! Page-level types.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// A resolved view of one page: geometry plus its content stream ids.
///
/// This is a snapshot taken from the [`super::Document`] object table;
/// mutating it does not change the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page object id
    pub id: ObjectId,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Effective `/MediaBox` as `[llx, lly, urx, ury]`
    pub media_box: [f32; 4],

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Content streams in drawing order
    pub content_refs: Vec<ObjectId>,
}

impl Page {
    /// Create a page view from its media box.
    pub fn new(number: u32, id: ObjectId, media_box: [f32; 4]) -> Self {
        Self {
            number,
            id,
            width: (media_box[2] - media_box[0]).abs(),
            height: (media_box[3] - media_box[1]).abs(),
            media_box,
            rotation: 0,
            content_refs: Vec::new(),
        }
    }

    /// Whether the page is wider than it is tall, after rotation.
    pub fn is_landscape(&self) -> bool {
        if self.rotation % 180 == 90 {
            self.height > self.width
        } else {
            self.width > self.height
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 8.5 x 11 inches
    #[default]
    Letter,
    /// 210 x 297 mm
    A4,
    /// 8.5 x 14 inches
    Legal,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0), // 8.5 * 72, 11 * 72
            PageSize::A4 => (595.0, 842.0),     // 210mm * 2.834, 297mm * 2.834
            PageSize::Legal => (612.0, 1008.0),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            "legal" => Ok(PageSize::Legal),
            other => Err(format!("unknown page size: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_dimensions_from_media_box() {
        let page = Page::new(1, (3, 0), [10.0, 20.0, 622.0, 812.0]);
        assert_eq!(page.width, 612.0);
        assert_eq!(page.height, 792.0);
        assert!(!page.is_landscape());
    }

    #[test]
    fn test_rotated_page_is_landscape() {
        let mut page = Page::new(1, (3, 0), [0.0, 0.0, 612.0, 792.0]);
        page.rotation = 90;
        assert!(page.is_landscape());
    }

    #[test]
    fn test_page_size_parse() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!(PageSize::Letter.dimensions(), (612.0, 792.0));
        assert!("tabloid".parse::<PageSize>().is_err());
    }
}
