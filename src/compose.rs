//! Lays out plain text lines on fresh pages.
//!
//! Layout is deliberately simple: one standard font, fixed leading, a top-left
//! origin inside the margins and a page break whenever the next line would
//! fall into the bottom margin. Lines are not wrapped.

use crate::error::Result;
use crate::extract::encoding::encode_win_ansi;
use crate::model::value::name_object;
use crate::model::{Color, Content, Dictionary, Document, Object, Operation, PageSize, Stream};

/// Font resource name used for visible text.
const BODY_FONT: &str = "F1";

/// Layout settings for [`DocumentComposer`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    pub page_size: PageSize,
    pub base_font: String,
    pub font_size: f32,
    /// Baseline-to-baseline distance
    pub leading: f32,
    pub margin: f32,
    pub fill: Color,
    pub compress: bool,
}

impl ComposeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the font size and leading. Values that are not positive and
    /// finite are ignored.
    pub fn with_font_size(mut self, size: f32, leading: f32) -> Self {
        if is_positive(size) {
            self.font_size = size;
        }
        if is_positive(leading) {
            self.leading = leading;
        }
        self.leading = self.leading.max(self.font_size);
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin.max(0.0);
        self
    }

    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Lines that fit between the top and bottom margins.
    pub fn lines_per_page(&self) -> usize {
        let (_, height) = self.page_size.dimensions();
        if !is_positive(self.leading) {
            return 1;
        }
        let usable = height - 2.0 * self.margin - self.font_size;
        let extra = (usable / self.leading).floor();
        if extra.is_nan() || extra < 0.0 {
            return 1;
        }
        // Float to int casts saturate; the sum must too.
        (extra as usize).saturating_add(1)
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            base_font: "Helvetica".to_string(),
            font_size: 11.0,
            leading: 14.0,
            margin: 72.0,
            fill: Color::BLACK,
            compress: false,
        }
    }
}

/// Builds a new document from lines of visible text.
#[derive(Debug, Clone, Default)]
pub struct DocumentComposer {
    options: ComposeOptions,
    lines: Vec<String>,
}

impl DocumentComposer {
    pub fn new(options: ComposeOptions) -> Self {
        Self {
            options,
            lines: Vec::new(),
        }
    }

    pub fn add_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// Add every line of `text`.
    pub fn add_text(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.add_line(line.trim_end());
        }
        self
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Build the document. With no lines, a single blank page.
    pub fn compose(&self) -> Result<Document> {
        let mut doc = Document::new();
        let (width, height) = self.options.page_size.dimensions();

        let mut font = Dictionary::new();
        font.set("Type", name_object("Font"));
        font.set("Subtype", name_object("Type1"));
        font.set("BaseFont", name_object(&self.options.base_font));
        font.set("Encoding", name_object("WinAnsiEncoding"));
        let font_id = doc.add_object(font);

        let mut info = Dictionary::new();
        info.set("Producer", Object::string_literal(concat!("atspdf ", env!("CARGO_PKG_VERSION"))));
        let info_id = doc.add_object(info);
        doc.trailer_mut().set("Info", info_id);

        let per_page = self.options.lines_per_page();
        let chunks: Vec<&[String]> = if self.lines.is_empty() {
            vec![&self.lines[..]]
        } else {
            self.lines.chunks(per_page).collect()
        };

        for chunk in chunks {
            let page_id = doc.add_page(width, height)?;

            let mut fonts = Dictionary::new();
            fonts.set(BODY_FONT, font_id);
            let mut resources = Dictionary::new();
            resources.set("Font", fonts);
            doc.get_dictionary_mut(page_id)?.set("Resources", resources);

            if chunk.is_empty() {
                continue;
            }
            let content = self.page_operations(chunk, height).encode()?;
            let mut stream = Stream::new(Dictionary::new(), content);
            if self.options.compress {
                stream.compress()?;
            }
            let stream_id = doc.add_stream(stream);
            doc.append_content(page_id, stream_id)?;
        }

        log::debug!(
            "composed {} line(s) on {} page(s)",
            self.lines.len(),
            doc.page_count()?
        );
        Ok(doc)
    }

    fn page_operations(&self, lines: &[String], page_height: f32) -> Content {
        let o = &self.options;
        let top = page_height - o.margin - o.font_size;
        let fill: Vec<Object> = o.fill.components().into_iter().map(Object::Real).collect();

        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![name_object(BODY_FONT), Object::Real(o.font_size)]),
            Operation::new(o.fill.fill_operator(), fill),
            Operation::new("TL", vec![Object::Real(o.leading)]),
            Operation::new("Td", vec![Object::Real(o.margin), Object::Real(top)]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                ops.push(Operation::new("T*", vec![]));
            }
            if !line.trim().is_empty() {
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_win_ansi(line))],
                ));
            }
        }
        ops.push(Operation::new("ET", vec![]));
        Content { operations: ops }
    }
}
