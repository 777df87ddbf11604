//! Table field detection
//!
//! Forms often lay inputs out in a grid. Each cell is scanned with the same
//! detectors used for plain lines; when the first row looks like a header
//! (every cell filled in) it is kept as column names instead of being
//! scanned, and every field found below it records its column.

use crate::detector;
use crate::form::Field;
use crate::sanitize::sanitize;
use crate::section::SectionTracker;

/// A rectangular grid of cells as produced by the PDF extractor.
///
/// `None` marks a position with no text at all, which is different from a
/// cell holding an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a table where every cell is present
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    /// Column names from the first row, if every cell in it holds text
    pub fn header(&self) -> Option<Vec<String>> {
        let first = self.rows.first()?;
        if first.is_empty() {
            return None;
        }
        first
            .iter()
            .map(|cell| match cell.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => Some(text.to_string()),
                _ => None,
            })
            .collect()
    }
}

/// Run field detection over every cell of `table`.
///
/// Fields are tagged with the tracker's current section and, when a header
/// row was found, with the sanitized name of their column.
pub fn process_table(table: &Table, tracker: &SectionTracker, max_label_len: usize) -> Vec<Field> {
    let header = table.header();
    let columns: Vec<Option<String>> = header
        .as_ref()
        .map(|names| {
            names
                .iter()
                .map(|name| Some(sanitize(name)).filter(|s| !s.is_empty()))
                .collect()
        })
        .unwrap_or_default();

    if let Some(names) = &header {
        log::debug!("Table header row: {:?}", names);
    }

    let skip = usize::from(header.is_some());
    let mut fields = Vec::new();

    for row in table.rows.iter().skip(skip) {
        for (col, cell) in row.iter().enumerate() {
            let Some(text) = cell.as_deref() else {
                continue;
            };
            let column = columns.get(col).and_then(|c| c.as_deref());
            for line in text.lines() {
                for field in detector::detect_fields(line, max_label_len) {
                    fields.push(tracker.tag(field).with_table_column(column));
                }
            }
        }
    }

    fields
}
