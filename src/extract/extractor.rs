//! Content stream interpretation for text extraction.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use crate::error::Result;
use crate::model::value::{array, dict_of, entry, integer, name, number, string_bytes};
use crate::model::{Color, Content, Dictionary, Document, Object, ObjectId, Operation};
use crate::parser::filters::decode_stream;

use super::font::FontDecoder;
use super::options::ExtractOptions;

/// Nesting limit for form XObjects drawn from form XObjects.
const MAX_FORM_DEPTH: usize = 8;

/// `TJ` adjustment (thousandths of an em) that reads as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Baseline difference (user space units) that starts a new line.
const LINE_TOLERANCE: f32 = 0.5;

/// One text-show operation as it would be painted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    /// Origin in device space
    pub x: f32,
    pub y: f32,
    /// Font size after the text and transformation matrices
    pub font_size: f32,
    /// Fill color, or `None` when it is set in a color space that has no
    /// device equivalent (separations, indexed, ICC profiles, patterns)
    pub fill: Option<Color>,
    pub render_mode: i64,
}

impl TextRun {
    /// Whether a reader could see this run under `options`.
    pub fn is_invisible(&self, options: &ExtractOptions) -> bool {
        matches!(self.render_mode, 3 | 7)
            || self.font_size < options.min_font_size
            || self
                .fill
                .is_some_and(|fill| fill.delta_e(&options.background) <= options.tolerance)
    }
}

/// Text runs of one page, in content stream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageText {
    /// 1-based page number
    pub number: u32,
    pub runs: Vec<TextRun>,
}

impl PageText {
    /// Runs that survive the invisibility filter of `options`.
    pub fn kept_runs<'a>(&'a self, options: &'a ExtractOptions) -> impl Iterator<Item = &'a TextRun> {
        self.runs
            .iter()
            .filter(move |run| !(options.exclude_invisible && run.is_invisible(options)))
    }

    /// Plain text of the page.
    pub fn text(&self, options: &ExtractOptions) -> String {
        let mut out = String::new();
        let mut last_y: Option<f32> = None;
        for run in self.kept_runs(options) {
            let text = run.text.trim();
            if text.is_empty() {
                continue;
            }
            if let Some(y) = last_y {
                let new_line = options.preserve_lines && (run.y - y).abs() > LINE_TOLERANCE;
                out.push(if new_line { '\n' } else { ' ' });
            }
            out.push_str(text);
            last_y = Some(run.y);
        }
        out
    }
}

/// Join page texts with a paragraph break.
pub fn join_pages(pages: &[PageText], options: &ExtractOptions) -> String {
    pages
        .iter()
        .map(|page| page.text(options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extracts text from a document.
pub struct TextExtractor<'a> {
    doc: &'a Document,
    options: ExtractOptions,
}

impl<'a> TextExtractor<'a> {
    pub fn new(doc: &'a Document, options: ExtractOptions) -> Self {
        Self { doc, options }
    }

    /// The document's text under the configured options.
    pub fn extract(&self) -> Result<String> {
        Ok(join_pages(&self.extract_pages()?, &self.options))
    }

    /// Runs of every page, in page order. Nothing is filtered here.
    pub fn extract_pages(&self) -> Result<Vec<PageText>> {
        self.doc
            .page_ids()?
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                Ok(PageText {
                    number: i as u32 + 1,
                    runs: self.page_runs(id)?,
                })
            })
            .collect()
    }

    /// Runs painted by one page.
    pub fn page_runs(&self, page_id: ObjectId) -> Result<Vec<TextRun>> {
        let content = self.doc.page_content(page_id)?;
        let resources = self.doc.effective_resources(page_id)?;

        let mut interpreter = Interpreter::new(self.doc);
        interpreter.run(&content, &resources, 0)?;
        Ok(interpreter.runs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(values: &[f32]) -> Option<Matrix> {
        match *values {
            [a, b, c, d, e, f] => Some(Matrix { a, b, c, d, e, f }),
            _ => None,
        }
    }

    fn translation(tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Family of the nonstroking color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    /// Components are not device colors; only "painted" is known.
    Other,
}

impl ColorSpace {
    fn from_family(family: &[u8]) -> ColorSpace {
        match family {
            b"DeviceGray" | b"G" | b"CalGray" => ColorSpace::Gray,
            b"DeviceRGB" | b"RGB" | b"CalRGB" => ColorSpace::Rgb,
            b"DeviceCMYK" | b"CMYK" => ColorSpace::Cmyk,
            _ => ColorSpace::Other,
        }
    }

    /// Initial color after `cs` selects this space.
    fn initial_color(self) -> Option<Color> {
        match self {
            ColorSpace::Gray => Some(Color::BLACK),
            ColorSpace::Rgb => Some(Color::Rgb(0.0, 0.0, 0.0)),
            ColorSpace::Cmyk => Some(Color::Cmyk(0.0, 0.0, 0.0, 1.0)),
            ColorSpace::Other => None,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: Option<Color>,
    fill_space: ColorSpace,
    font: Option<Rc<FontDecoder>>,
    font_size: f32,
    render_mode: i64,
    leading: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: Some(Color::BLACK),
            fill_space: ColorSpace::Gray,
            font: None,
            font_size: 0.0,
            render_mode: 0,
            leading: 0.0,
        }
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    runs: Vec<TextRun>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            runs: Vec::new(),
        }
    }

    fn run(&mut self, content: &[u8], resources: &Dictionary, depth: usize) -> Result<()> {
        let content = Content::decode(content)?;
        let mut fonts: HashMap<Vec<u8>, Rc<FontDecoder>> = HashMap::new();

        for op in &content.operations {
            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.stack.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&numbers(op)) {
                        self.state.ctm = m.multiply(&self.state.ctm);
                    }
                }
                "g" | "rg" | "k" => {
                    if let Some(color) = Color::from_components(&numbers(op)) {
                        self.state.fill = Some(color);
                        self.state.fill_space = match color {
                            Color::Gray(_) => ColorSpace::Gray,
                            Color::Rgb(..) => ColorSpace::Rgb,
                            Color::Cmyk(..) => ColorSpace::Cmyk,
                        };
                    }
                }
                "sc" | "scn" => {
                    self.state.fill = match self.state.fill_space {
                        ColorSpace::Other => None,
                        _ => Color::from_components(&numbers(op)).or(self.state.fill),
                    };
                }
                "cs" => {
                    let space = op
                        .operands
                        .first()
                        .and_then(name)
                        .map(|n| self.color_space(resources, n))
                        .unwrap_or(ColorSpace::Other);
                    self.state.fill_space = space;
                    self.state.fill = space.initial_color();
                }
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&numbers(op)) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "Td" => self.move_line(op),
                "TD" => {
                    self.state.leading = -operand(op, 1);
                    self.move_line(op);
                }
                "T*" => self.next_line(),
                "TL" => self.state.leading = operand(op, 0),
                "Tr" => self.state.render_mode = op.operands.first().and_then(integer).unwrap_or(0),
                "Tf" => {
                    let font_name = op.operands.first().and_then(name);
                    self.state.font = Some(match font_name {
                        Some(font_name) => self.font(&mut fonts, resources, font_name),
                        None => Rc::new(FontDecoder::fallback()),
                    });
                    self.state.font_size = operand(op, 1);
                }
                "Tj" => {
                    if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                        let text = self.decode(bytes);
                        self.show(text);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                        let text = self.decode(bytes);
                        self.show(text);
                    }
                }
                "\"" => {
                    self.next_line();
                    if let Some(bytes) = op.operands.get(2).and_then(string_bytes) {
                        let text = self.decode(bytes);
                        self.show(text);
                    }
                }
                "TJ" => {
                    if let Some(items) = op.operands.first().and_then(array) {
                        let text = self.decode_array(items);
                        self.show(text);
                    }
                }
                "Do" => {
                    if let Some(xobject) = op.operands.first().and_then(name) {
                        self.draw_form(resources, xobject, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn move_line(&mut self, op: &Operation) {
        let tx = operand(op, 0);
        let ty = operand(op, 1);
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.line_matrix = Matrix::translation(0.0, -self.state.leading).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// Family of the color space `space_name` names, directly or through
    /// the `/ColorSpace` resources.
    fn color_space(&self, resources: &Dictionary, space_name: &[u8]) -> ColorSpace {
        let family = ColorSpace::from_family(space_name);
        if family != ColorSpace::Other {
            return family;
        }
        let defined = self
            .doc
            .resolve_entry(resources, b"ColorSpace")
            .and_then(dict_of)
            .and_then(|spaces| self.doc.resolve_entry(spaces, space_name));
        match defined {
            Some(Object::Name(family)) => ColorSpace::from_family(family),
            Some(Object::Array(items)) => {
                // Only a bare device family keeps device components; Indexed,
                // Separation, DeviceN, ICCBased and Pattern do not.
                match items.first().and_then(name) {
                    Some(family) if items.len() == 1 => ColorSpace::from_family(family),
                    _ => ColorSpace::Other,
                }
            }
            _ => ColorSpace::Other,
        }
    }

    fn font(
        &self,
        cache: &mut HashMap<Vec<u8>, Rc<FontDecoder>>,
        resources: &Dictionary,
        name: &[u8],
    ) -> Rc<FontDecoder> {
        if let Some(decoder) = cache.get(name) {
            return Rc::clone(decoder);
        }
        let dict = self
            .doc
            .resolve_entry(resources, b"Font")
            .and_then(dict_of)
            .and_then(|fonts| self.doc.resolve_entry(fonts, name))
            .and_then(dict_of);

        let decoder = Rc::new(match dict {
            Some(dict) => FontDecoder::from_dict(self.doc, dict),
            None => {
                log::debug!("font /{} not in resources", String::from_utf8_lossy(name));
                FontDecoder::fallback()
            }
        });
        cache.insert(name.to_vec(), Rc::clone(&decoder));
        decoder
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match &self.state.font {
            Some(font) => font.decode(bytes),
            None => FontDecoder::fallback().decode(bytes),
        }
    }

    fn decode_array(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -number(item).unwrap_or(0.0);
                    let wants_space = adjustment > TJ_SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                    if wants_space {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        combined
    }

    fn show(&mut self, text: String) {
        let trm = self.text_matrix.multiply(&self.state.ctm);
        self.runs.push(TextRun {
            text,
            x: trm.e,
            y: trm.f,
            font_size: self.state.font_size.abs() * trm.scale(),
            fill: self.state.fill,
            render_mode: self.state.render_mode,
        });
    }

    fn draw_form(&mut self, resources: &Dictionary, name: &[u8], depth: usize) -> Result<()> {
        let stream = self
            .doc
            .resolve_entry(resources, b"XObject")
            .and_then(dict_of)
            .and_then(|xobjects| self.doc.resolve_entry(xobjects, name));
        let Some(Object::Stream(stream)) = stream else {
            return Ok(());
        };
        if entry(&stream.dict, b"Subtype").and_then(crate::model::value::name) != Some(&b"Form"[..]) {
            return Ok(());
        }
        if depth >= MAX_FORM_DEPTH {
            log::debug!("form nesting deeper than {}, skipped", MAX_FORM_DEPTH);
            return Ok(());
        }

        let content = decode_stream(stream)?;
        let form_resources = self
            .doc
            .resolve_entry(&stream.dict, b"Resources")
            .and_then(dict_of)
            .cloned()
            .unwrap_or_else(|| resources.clone());
        let matrix = entry(&stream.dict, b"Matrix")
            .and_then(array)
            .and_then(|items| {
                let values: Vec<f32> = items.iter().filter_map(number).collect();
                Matrix::from_operands(&values)
            })
            .unwrap_or(Matrix::IDENTITY);

        let saved = self.state.clone();
        let (saved_tm, saved_tlm) = (self.text_matrix, self.line_matrix);
        let saved_depth = self.stack.len();

        self.state.ctm = matrix.multiply(&self.state.ctm);
        let result = self.run(&content, &form_resources, depth + 1);

        self.stack.truncate(saved_depth);
        self.state = saved;
        self.text_matrix = saved_tm;
        self.line_matrix = saved_tlm;
        result
    }
}

/// Numeric operands of `op`, skipping names and strings.
fn numbers(op: &Operation) -> Vec<f32> {
    op.operands.iter().filter_map(number).collect()
}

fn operand(op: &Operation, index: usize) -> f32 {
    op.operands.get(index).and_then(number).unwrap_or(0.0)
}

/// Chinese and Japanese don't use spaces between words; Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::{dict_of_mut, name_object};
    use crate::model::Stream;

    fn doc_with_content(content: &[u8]) -> (Document, ObjectId) {
        let mut doc = Document::new();
        let page = doc.add_page(612.0, 792.0).unwrap();
        let mut font = Dictionary::new();
        font.set("Type", name_object("Font"));
        font.set("Subtype", name_object("Type1"));
        font.set("BaseFont", name_object("Helvetica"));
        font.set("Encoding", name_object("WinAnsiEncoding"));
        let font_id = doc.add_object(font);
        let mut fonts = Dictionary::new();
        fonts.set("F1", font_id);
        let mut resources = Dictionary::new();
        resources.set("Font", fonts);
        doc.get_dictionary_mut(page).unwrap().set("Resources", resources);

        let stream = doc.add_stream(Stream::new(Dictionary::new(), content.to_vec()));
        doc.append_content(page, stream).unwrap();
        (doc, page)
    }

    fn text(content: &[u8], options: ExtractOptions) -> String {
        let (doc, _) = doc_with_content(content);
        TextExtractor::new(&doc, options).extract().unwrap()
    }

    #[test]
    fn test_runs_joined_with_space() {
        let content = b"BT /F1 12 Tf 72 700 Td (Hello) Tj 0 -14 Td (World) Tj ET";
        assert_eq!(text(content, ExtractOptions::default()), "Hello World");
        assert_eq!(
            text(content, ExtractOptions::default().preserving_lines(true)),
            "Hello\nWorld"
        );
    }

    #[test]
    fn test_same_baseline_stays_on_one_line() {
        let content = b"BT /F1 12 Tf 72 700 Td (Senior) Tj 40 0 Td (Engineer) Tj ET";
        assert_eq!(
            text(content, ExtractOptions::default().preserving_lines(true)),
            "Senior Engineer"
        );
    }

    #[test]
    fn test_tj_kerning_inserts_space() {
        let content = b"BT /F1 12 Tf 72 700 Td [(Data) -250 (Science) -40 (s)] TJ ET";
        assert_eq!(text(content, ExtractOptions::default()), "Data Sciences");
    }

    #[test]
    fn test_quote_operators_advance_line() {
        let content = b"BT /F1 12 Tf 14 TL 72 700 Td (One) Tj (Two) ' 0 0 (Three) \" ET";
        assert_eq!(
            text(content, ExtractOptions::default().preserving_lines(true)),
            "One\nTwo\nThree"
        );
    }

    #[test]
    fn test_invisible_runs_excluded() {
        let content = b"BT /F1 12 Tf 0 g 72 700 Td (Visible) Tj ET \
                        q BT /F1 0.1 Tf 1 g 1 1 Td (Tiny) Tj ET Q \
                        BT /F1 12 Tf 1 1 1 rg 72 600 Td (White) Tj ET \
                        BT /F1 12 Tf 0 g 3 Tr 72 500 Td (Hidden) Tj ET";
        assert_eq!(
            text(content, ExtractOptions::default()),
            "Visible Tiny White Hidden"
        );
        assert_eq!(text(content, ExtractOptions::visible_only()), "Visible");
    }

    #[test]
    fn test_near_white_within_tolerance() {
        let content = b"BT /F1 12 Tf 0.995 g 72 700 Td (Faint) Tj ET";
        assert_eq!(text(content, ExtractOptions::visible_only()), "");
        assert_eq!(
            text(content, ExtractOptions::visible_only().with_tolerance(0.0)),
            "Faint"
        );
    }

    #[test]
    fn test_q_restores_fill() {
        let content = b"0 g q 1 g Q BT /F1 12 Tf 72 700 Td (Dark) Tj ET";
        assert_eq!(text(content, ExtractOptions::visible_only()), "Dark");
    }

    #[test]
    fn test_ctm_scales_font_size() {
        let (doc, page) = doc_with_content(b"q 0.02 0 0 0.02 0 0 cm BT /F1 12 Tf (Scaled) Tj ET Q");
        let runs = TextExtractor::new(&doc, ExtractOptions::default())
            .page_runs(page)
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert!((runs[0].font_size - 0.24).abs() < 1e-4);
        assert!(runs[0].is_invisible(&ExtractOptions::default()));
    }

    #[test]
    fn test_form_xobject_text() {
        let (mut doc, page) = doc_with_content(b"q /X1 Do Q");
        let mut form_dict = Dictionary::new();
        form_dict.set("Type", name_object("XObject"));
        form_dict.set("Subtype", name_object("Form"));
        let form = doc.add_stream(Stream::new(
            form_dict,
            b"BT /F1 10 Tf 10 10 Td (Inside) Tj ET".to_vec(),
        ));
        let mut xobjects = Dictionary::new();
        xobjects.set("X1", form);
        let resources = doc.get_dictionary_mut(page).unwrap().get_mut(b"Resources").unwrap();
        dict_of_mut(resources).unwrap().set("XObject", xobjects);

        assert_eq!(text_of(&doc), "Inside");
    }

    #[test]
    fn test_self_referencing_form_terminates() {
        let (mut doc, page) = doc_with_content(b"/Loop Do");
        let mut form_dict = Dictionary::new();
        form_dict.set("Subtype", name_object("Form"));
        let form = doc.add_stream(Stream::new(
            form_dict,
            b"BT /F1 10 Tf (x) Tj ET /Loop Do".to_vec(),
        ));
        let mut xobjects = Dictionary::new();
        xobjects.set("Loop", form);
        let resources = doc.get_dictionary_mut(page).unwrap().get_mut(b"Resources").unwrap();
        dict_of_mut(resources).unwrap().set("XObject", xobjects);

        let runs = TextExtractor::new(&doc, ExtractOptions::default())
            .page_runs(page)
            .unwrap();
        assert_eq!(runs.len(), MAX_FORM_DEPTH);
    }

    #[test]
    fn test_unknown_font_falls_back_to_raw_codes() {
        assert_eq!(
            text(b"BT /F9 12 Tf 72 700 Td (caf\\351) Tj ET", ExtractOptions::default()),
            "café"
        );
    }

    #[test]
    fn test_empty_document_is_empty_string() {
        let doc = Document::new();
        assert_eq!(
            TextExtractor::new(&doc, ExtractOptions::default()).extract().unwrap(),
            ""
        );
    }

    #[test]
    fn test_pages_joined_with_paragraph_break() {
        let (mut doc, _) = doc_with_content(b"BT /F1 12 Tf 72 700 Td (First) Tj ET");
        let second = doc.add_page(612.0, 792.0).unwrap();
        let resources = doc.effective_resources(doc.page_ids().unwrap()[0]).unwrap();
        doc.get_dictionary_mut(second).unwrap().set("Resources", resources);
        let stream = doc.add_stream(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf 72 700 Td (Second) Tj ET".to_vec(),
        ));
        doc.append_content(second, stream).unwrap();

        assert_eq!(text_of(&doc), "First\n\nSecond");
    }

    fn with_color_space(content: &[u8], name: &str, space: Object) -> Document {
        let (mut doc, page) = doc_with_content(content);
        let mut spaces = Dictionary::new();
        spaces.set(name, space);
        let resources = doc.get_dictionary_mut(page).unwrap().get_mut(b"Resources").unwrap();
        dict_of_mut(resources).unwrap().set("ColorSpace", spaces);
        doc
    }

    #[test]
    fn test_separation_full_tint_is_visible() {
        let separation = Object::Array(vec![
            name_object("Separation"),
            name_object("Spot"),
            name_object("DeviceCMYK"),
            Object::Null,
        ]);
        let doc = with_color_space(
            b"BT /F1 12 Tf /CS0 cs 1 scn 72 700 Td (Spot) Tj ET",
            "CS0",
            separation,
        );
        let page = doc.page_ids().unwrap()[0];
        let runs = TextExtractor::new(&doc, ExtractOptions::visible_only())
            .page_runs(page)
            .unwrap();
        assert_eq!(runs[0].fill, None);
        assert_eq!(
            TextExtractor::new(&doc, ExtractOptions::visible_only()).extract().unwrap(),
            "Spot"
        );
    }

    #[test]
    fn test_indexed_color_is_not_read_as_gray() {
        let indexed = Object::Array(vec![
            name_object("Indexed"),
            name_object("DeviceRGB"),
            Object::Integer(1),
            Object::string_literal(vec![0u8, 0, 0, 255, 255, 255]),
        ]);
        let doc = with_color_space(
            b"BT /F1 12 Tf /CS1 cs 1 sc 72 700 Td (Indexed) Tj ET",
            "CS1",
            indexed,
        );
        assert_eq!(
            TextExtractor::new(&doc, ExtractOptions::visible_only()).extract().unwrap(),
            "Indexed"
        );
    }

    #[test]
    fn test_device_space_sc_still_tracks_white() {
        let content = b"BT /F1 12 Tf /DeviceRGB cs 1 1 1 sc 72 700 Td (Hidden) Tj ET \
                        BT /F1 12 Tf /DeviceGray cs 0 sc 72 600 Td (Shown) Tj ET";
        assert_eq!(text(content, ExtractOptions::visible_only()), "Shown");
    }

    #[test]
    fn test_named_device_space_resource() {
        let doc = with_color_space(
            b"BT /F1 12 Tf /CS2 cs 1 sc 72 700 Td (White) Tj ET",
            "CS2",
            name_object("DeviceGray"),
        );
        assert_eq!(
            TextExtractor::new(&doc, ExtractOptions::visible_only()).extract().unwrap(),
            ""
        );
    }

    fn text_of(doc: &Document) -> String {
        TextExtractor::new(doc, ExtractOptions::default()).extract().unwrap()
    }
}
