//! Page content extraction using lopdf
//!
//! Turns each PDF page into the two things the field detectors consume:
//! text lines in reading order and tables as grids of optional cells.

use crate::acroform;
use crate::tables::Table;
use crate::FormError;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Baseline distance under which two items sit on the same line
const LINE_Y_TOLERANCE: f32 = 3.0;
/// Left-edge distance under which two items share a table column
const COLUMN_X_TOLERANCE: f32 = 10.0;
/// Minimum number of columns (items in the first row) for a table
const MIN_TABLE_COLUMNS: usize = 3;
/// Minimum number of consecutive aligned lines for a table
const MIN_TABLE_ROWS: usize = 3;

/// Text content of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page: u32,
    /// Lines in reading order, table rows excluded
    pub lines: Vec<String>,
    pub tables: Vec<Table>,
}

impl PageContent {
    /// Build a page from plain text, one line per `\n`
    pub fn from_text(page: u32, text: &str) -> Self {
        Self {
            page,
            lines: text.lines().map(str::to_string).collect(),
            tables: Vec::new(),
        }
    }

    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }
}

/// Split plain text into pages on form feeds (`\x0c`).
///
/// A form feed ends a page, so one trailing `\x0c` (as `pdftotext` writes
/// after every page) does not open another page.
pub fn pages_from_text(text: &str) -> Vec<PageContent> {
    let text = text.strip_suffix('\x0c').unwrap_or(text);
    text.split('\x0c')
        .enumerate()
        .map(|(i, page_text)| PageContent::from_text(i as u32 + 1, page_text))
        .collect()
}

/// A text item with position information
#[derive(Debug, Clone)]
pub struct TextItem {
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Y position on page (PDF coordinates, origin at bottom-left)
    pub y: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

/// A line of text (grouped text items)
#[derive(Debug, Clone)]
pub struct TextLine {
    pub items: Vec<TextItem>,
    pub y: f32,
    pub page: u32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract page contents from a PDF file
pub fn extract_pages<P: AsRef<Path>>(path: P) -> Result<Vec<PageContent>, FormError> {
    let doc = Document::load(path)?;
    extract_pages_from_doc(&doc)
}

/// Extract page contents from a PDF memory buffer
pub fn extract_pages_mem(buffer: &[u8]) -> Result<Vec<PageContent>, FormError> {
    let doc = Document::load_mem(buffer)?;
    extract_pages_from_doc(&doc)
}

fn extract_pages_from_doc(doc: &Document) -> Result<Vec<PageContent>, FormError> {
    if doc.is_encrypted() {
        return Err(FormError::Encrypted);
    }

    let native = acroform::native_form_fields(doc);
    if !native.is_empty() {
        log::warn!(
            "PDF already has {} fillable fields; inferred fields may duplicate them",
            native.len()
        );
        log::debug!("Fillable fields: {:?}", native);
    }

    let pages = doc.get_pages();
    let mut contents = Vec::with_capacity(pages.len());

    for (&page_num, &page_id) in pages.iter() {
        let items = extract_page_text_items(doc, page_id, page_num)?;
        if items.is_empty() {
            log::warn!(
                "Page {} has no extractable text (scanned or image-only?)",
                page_num
            );
        }

        let lines = group_into_lines(items);
        let (lines, tables) = split_tables(lines);
        log::debug!(
            "Page {}: {} lines, {} tables",
            page_num,
            lines.len(),
            tables.len()
        );

        contents.push(PageContent {
            page: page_num,
            lines,
            tables,
        });
    }

    Ok(contents)
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Walk a page's content stream and collect positioned text
fn extract_page_text_items(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
) -> Result<Vec<TextItem>, FormError> {
    use lopdf::content::Content;

    let mut items = Vec::new();

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| FormError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| FormError::Parse(e.to_string()))?;

    let mut ctm = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();

    let mut current_font = String::new();
    // TL; starts at zero and persists across text objects
    let mut leading: f32 = 0.0;
    let mut text_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut line_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut in_text_block = false;

    for op in &content.operations {
        // Text shown by this operator, if any
        let mut shown: Option<String> = None;

        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let m = [
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    ];
                    ctm = multiply_matrices(&m, &ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                line_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        current_font = String::from_utf8_lossy(name).to_string();
                    }
                }
            }
            "TL" => {
                if let Some(value) = op.operands.first().and_then(get_number) {
                    leading = value;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                    line_matrix = next_line(&line_matrix, tx, ty);
                    text_matrix = line_matrix;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        text_matrix[i] =
                            get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
                    }
                    line_matrix = text_matrix;
                }
            }
            "T*" => {
                line_matrix = next_line(&line_matrix, 0.0, -leading);
                text_matrix = line_matrix;
            }
            "Tj" if in_text_block => {
                shown = op
                    .operands
                    .first()
                    .and_then(|obj| decode_operand(obj, doc, &fonts, &current_font));
            }
            "TJ" if in_text_block => {
                if let Some(Ok(array)) = op.operands.first().map(Object::as_array) {
                    let combined: String = array
                        .iter()
                        .filter_map(|obj| decode_operand(obj, doc, &fonts, &current_font))
                        .collect();
                    shown = Some(combined);
                }
            }
            // `'` shows its only operand, `"` its third (after word and char spacing)
            "'" | "\"" if in_text_block => {
                line_matrix = next_line(&line_matrix, 0.0, -leading);
                text_matrix = line_matrix;
                shown = op
                    .operands
                    .last()
                    .and_then(|obj| decode_operand(obj, doc, &fonts, &current_font));
            }
            _ => {}
        }

        if let Some(text) = shown.filter(|t| !t.trim().is_empty()) {
            let combined = multiply_matrices(&text_matrix, &ctm);
            items.push(TextItem {
                text,
                x: combined[4],
                y: combined[5],
                page: page_num,
            });
        }
    }

    Ok(items)
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Start of the next line: `[1 0 0 1 tx ty] × Tlm`, so the offset is in
/// text space and scales with the line matrix
fn next_line(line_matrix: &[f32; 6], tx: f32, ty: f32) -> [f32; 6] {
    multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], line_matrix)
}

/// Decode a string operand through the font encoding, falling back to
/// UTF-16BE (with BOM) and then Latin-1
fn decode_operand(
    obj: &Object,
    doc: &Document,
    fonts: &std::collections::BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    current_font: &str,
) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    Some(decode_string_bytes(bytes))
}

/// UTF-16BE when the bytes carry a BOM, Latin-1 otherwise
pub(crate) fn decode_string_bytes(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = body
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Group items into lines, page by page.
///
/// Stream order is kept (it is usually reading order); only consecutive
/// items sharing a baseline are merged, then ordered left to right.
pub fn group_into_lines(items: Vec<TextItem>) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();

    for item in items {
        match lines.last_mut() {
            Some(last) if last.page == item.page && (last.y - item.y).abs() < LINE_Y_TOLERANCE => {
                last.items.push(item);
            }
            _ => {
                let (y, page) = (item.y, item.page);
                lines.push(TextLine {
                    items: vec![item],
                    y,
                    page,
                });
            }
        }
    }

    for line in &mut lines {
        line.items
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }

    lines
}

/// Pull runs of column-aligned lines out as tables.
///
/// A run starts at a line with at least [`MIN_TABLE_COLUMNS`] items; their
/// left edges become the column starts. Following lines join the run while
/// they have two or more items that all land on one of those columns. Runs
/// shorter than [`MIN_TABLE_ROWS`] stay ordinary lines.
pub fn split_tables(lines: Vec<TextLine>) -> (Vec<String>, Vec<Table>) {
    let mut texts = Vec::new();
    let mut tables = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let columns: Vec<f32> = lines[i].items.iter().map(|item| item.x).collect();
        let mut end = i + 1;

        if columns.len() >= MIN_TABLE_COLUMNS {
            while end < lines.len()
                && lines[end].items.len() >= 2
                && lines[end]
                    .items
                    .iter()
                    .all(|item| find_column_index(&columns, item.x).is_some())
            {
                end += 1;
            }
        }

        if columns.len() >= MIN_TABLE_COLUMNS && end - i >= MIN_TABLE_ROWS {
            tables.push(build_table(&lines[i..end], &columns));
            i = end;
        } else {
            texts.push(lines[i].text());
            i += 1;
        }
    }

    (texts, tables)
}

/// Column whose start is closest to `x`, within tolerance
fn find_column_index(columns: &[f32], x: f32) -> Option<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, &start)| (idx, (start - x).abs()))
        .filter(|&(_, dist)| dist < COLUMN_X_TOLERANCE)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}

fn build_table(rows: &[TextLine], columns: &[f32]) -> Table {
    let grid = rows
        .iter()
        .map(|line| {
            let mut cells: Vec<Option<String>> = vec![None; columns.len()];
            for item in &line.items {
                if let Some(col) = find_column_index(columns, item.x) {
                    match &mut cells[col] {
                        Some(text) => {
                            text.push(' ');
                            text.push_str(&item.text);
                        }
                        empty => *empty = Some(item.text.clone()),
                    }
                }
            }
            cells
        })
        .collect();
    Table::new(grid)
}
