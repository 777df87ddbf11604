//! Checkbox and radio-button detection
//!
//! Paper forms draw options as `[ ] Option`, `( ) Option` or with box
//! glyphs such as `☐ Option`. A single line can hold several of them
//! (`☐ Sí ☐ No`), so detection returns every option found.

use crate::form::Field;
use crate::sanitize::sanitize;
use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern for one checkbox/radio marker.
///
/// Shared with the line detector and the type classifier so all three
/// agree on what a checkbox looks like.
pub(crate) const MARKER_PATTERN: &str = r"\[\s*[xX✓✔]?\s*\]|\(\s*\)|[☐☑☒□■▢◻◼○◯◉]";

static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(MARKER_PATTERN).unwrap());

/// Whether `text` contains at least one checkbox/radio marker
pub fn contains_marker(text: &str) -> bool {
    MARKER_RE.is_match(text)
}

/// Remove every checkbox/radio marker from `text`
pub fn strip_markers(text: &str) -> String {
    MARKER_RE.replace_all(text, " ").into_owned()
}

/// Detect every glyph-marked option in `text`.
///
/// Each option label runs from its marker to the next marker, a line break,
/// or the end of the text. Anything after a `:` inside the run is the
/// option's answer text and is not part of the label. Every option becomes
/// an unchecked checkbox field; options with no usable label are skipped.
pub fn detect_checkboxes(text: &str) -> Vec<Field> {
    let markers: Vec<_> = MARKER_RE.find_iter(text).collect();
    let mut fields = Vec::with_capacity(markers.len());

    for (i, marker) in markers.iter().enumerate() {
        let run_end = markers.get(i + 1).map_or(text.len(), |next| next.start());
        let run = &text[marker.end()..run_end];
        let run = run.split(['\n', '\r']).next().unwrap_or_default();
        let label_text = run.split(':').next().unwrap_or_default();

        let label = sanitize(&collapse_whitespace(label_text));
        if label.is_empty() {
            continue;
        }
        fields.push(Field::checkbox(label));
    }

    fields
}

/// The part of `text` before its first checkbox/radio marker
pub(crate) fn before_next_marker(text: &str) -> &str {
    match MARKER_RE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldType, FieldValue};

    fn labels(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.label.as_str()).collect()
    }

    #[test]
    fn test_single_bracket_option() {
        let fields = detect_checkboxes("[ ] Acepta terminos");
        assert_eq!(labels(&fields), vec!["acepta_terminos"]);
        assert_eq!(fields[0].field_type, FieldType::Checkbox);
        assert_eq!(fields[0].value, FieldValue::Bool(false));
    }

    #[test]
    fn test_multiple_options_on_one_line() {
        let fields = detect_checkboxes("☐ Soltero ☐ Casado ☐ Viudo");
        assert_eq!(labels(&fields), vec!["soltero", "casado", "viudo"]);

        let fields = detect_checkboxes("Sexo: ( ) Masculino ( ) Femenino");
        assert_eq!(labels(&fields), vec!["masculino", "femenino"]);
    }

    #[test]
    fn test_checked_marker_still_unchecked_template() {
        let fields = detect_checkboxes("[x] Newsletter");
        assert_eq!(labels(&fields), vec!["newsletter"]);
        assert_eq!(fields[0].value.as_bool(), Some(false));
    }

    #[test]
    fn test_label_stops_at_colon_and_line_break() {
        let fields = detect_checkboxes("[ ] Cantidad: 5");
        assert_eq!(labels(&fields), vec!["cantidad"]);

        let fields = detect_checkboxes("[ ] Uno\nsegunda linea");
        assert_eq!(labels(&fields), vec!["uno"]);
    }

    #[test]
    fn test_no_markers() {
        assert!(detect_checkboxes("Nombre: Juan").is_empty());
        assert!(detect_checkboxes("").is_empty());
        assert!(detect_checkboxes("[ ] [ ]").is_empty());
    }

    #[test]
    fn test_marker_helpers() {
        assert!(contains_marker("[ ] x"));
        assert!(contains_marker("( ) x"));
        assert!(contains_marker("☒ x"));
        assert!(!contains_marker("Peso (kg)"));
        assert_eq!(strip_markers("[ ] Acepta").trim(), "Acepta");
        assert_eq!(before_next_marker("Sí [ ] No"), "Sí ");
        assert_eq!(before_next_marker("Sí"), "Sí");
    }
}
