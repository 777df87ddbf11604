//! Section tracking
//!
//! Headings split a form into groups. A line is a heading when it is written
//! entirely in capitals (`DATOS GENERALES`) or when it is a short line whose
//! very last character is a colon (`Datos del solicitante:`). A colon with
//! trailing blanks after it (`Nombre: `) is a fill-in blank, not a heading.
//!
//! The tracker remembers the last heading and tags every following field
//! with it until the next heading appears.

use crate::checkbox;
use crate::form::Field;
use crate::sanitize::sanitize;
use once_cell::sync::Lazy;
use regex::Regex;

static FORM_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:form\w*|template|plantilla)\b").unwrap());

/// Length limits for colon-terminated headings
#[derive(Debug, Clone, Copy)]
pub struct HeadingRule {
    /// A colon heading must be longer than this many characters
    pub min_len: usize,
    /// Colon-terminated lines longer than this are not headings
    pub max_len: usize,
}

impl Default for HeadingRule {
    fn default() -> Self {
        Self {
            min_len: 3,
            max_len: 60,
        }
    }
}

impl HeadingRule {
    /// Whether `line` reads as a section heading
    pub fn is_heading(&self, line: &str) -> bool {
        let text = line.trim_start().trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() || checkbox::contains_marker(text) {
            return false;
        }

        if is_all_caps(text) {
            return true;
        }

        let len = text.chars().count();
        text.ends_with(':') && len > self.min_len && len <= self.max_len
    }
}

/// At least two letters and none of them lowercase
fn is_all_caps(text: &str) -> bool {
    let mut letters = 0;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if !c.is_uppercase() {
            return false;
        }
        letters += 1;
    }
    letters >= 2
}

/// Whether a line looks like the title of the form
pub fn looks_like_form_title(line: &str) -> bool {
    FORM_TITLE_RE.is_match(line)
}

/// Carries the current heading across lines and pages
#[derive(Debug, Default)]
pub struct SectionTracker {
    current: Option<String>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Switch to the section named by `heading`.
    ///
    /// Returns the section marker field to record, or `None` when the
    /// heading has no usable label (the tracker is left unchanged).
    pub fn enter(&mut self, heading: &str) -> Option<Field> {
        let label = sanitize(heading);
        if label.is_empty() {
            return None;
        }
        log::debug!("Section '{}' starts at line {:?}", label, heading.trim());
        self.current = Some(label.clone());
        Some(Field::section_marker(label))
    }

    /// Tag a detected field with the current section
    pub fn tag(&self, field: Field) -> Field {
        field.with_section(self.current())
    }
}
