//! Line field detection
//!
//! A line becomes a field when one of a fixed list of label shapes matches
//! it. The list is tried in order and the first match wins, so the order
//! below decides how ambiguous lines are split:
//!
//! | # | Shape            | Example                         |
//! |---|------------------|---------------------------------|
//! | 1 | colon            | `Nombre: Juan`, `Nombre: ____`  |
//! | 2 | equals           | `Cantidad = 3`                  |
//! | 3 | checkbox prefix  | `[ ] Acepta`, `☐ Acepta: si`    |
//! | 4 | underscore run   | `Firma ___________`             |
//! | 5 | numbered         | `3. Ocupación: docente`         |
//! | 6 | parenthetical    | `Peso (kg): 70`                 |
//!
//! Colon and equals refuse labels that start with an enumeration marker or
//! contain parentheses; those lines fall through to the numbered and
//! parenthetical shapes.
//!
//! Lines that match nothing are prose and yield no field.

use crate::checkbox::{self, collapse_whitespace, MARKER_PATTERN};
use crate::classify::infer_type;
use crate::form::{Field, FieldType};
use crate::sanitize::sanitize;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default upper bound on raw label length, in characters
pub const DEFAULT_MAX_LABEL_LEN: usize = 60;

/// The label shapes, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Colon,
    Equals,
    CheckboxPrefix,
    UnderscoreRun,
    Numbered,
    Parenthetical,
}

/// Raw split of a line before cleanup and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: PatternKind,
    pub raw_label: String,
    pub raw_value: String,
    /// Text in parentheses next to the label, used as typing context
    pub note: Option<String>,
}

struct LinePattern {
    kind: PatternKind,
    regex: Regex,
}

impl LinePattern {
    fn new(kind: PatternKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).unwrap(),
        }
    }

    fn apply(&self, line: &str) -> Option<Candidate> {
        let caps = self.regex.captures(line)?;
        let raw_label = caps.name("label")?.as_str().trim().to_string();
        let raw_value = caps
            .name("value")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let note = caps.name("note").map(|m| m.as_str().trim().to_string());

        let candidate = Candidate {
            kind: self.kind,
            raw_label,
            raw_value,
            note,
        };
        if self.accepts(&candidate) {
            Some(candidate)
        } else {
            None
        }
    }

    fn accepts(&self, candidate: &Candidate) -> bool {
        match self.kind {
            PatternKind::Colon | PatternKind::Equals => {
                !ENUMERATION_RE.is_match(&candidate.raw_label)
                    && !candidate.raw_label.contains(['(', ')'])
                    && !candidate.raw_value.starts_with("//")
            }
            _ => true,
        }
    }
}

static LINE_PATTERNS: Lazy<Vec<LinePattern>> = Lazy::new(|| {
    vec![
        LinePattern::new(
            PatternKind::Colon,
            r"^(?P<label>[^:]+?)\s*:\s*(?P<value>.*)$",
        ),
        LinePattern::new(
            PatternKind::Equals,
            r"^(?P<label>[^=]+?)\s*=\s*(?P<value>.*)$",
        ),
        LinePattern::new(
            PatternKind::CheckboxPrefix,
            &format!(
                r"^(?:{})\s*(?P<label>[^:]+?)(?:\s*:\s*(?P<value>.*))?$",
                MARKER_PATTERN
            ),
        ),
        LinePattern::new(
            PatternKind::UnderscoreRun,
            r"^(?P<label>[^_]+?)\s*_{3,}\s*(?P<value>.*)$",
        ),
        LinePattern::new(
            PatternKind::Numbered,
            r"^\d+[.)]\s*(?P<label>[^:]+?)\s*:\s*(?P<value>.*)$",
        ),
        LinePattern::new(
            PatternKind::Parenthetical,
            r"^(?P<label>[^(:]+?)\s*\((?P<note>[^)]*)\)\s*:\s*(?P<value>.*)$",
        ),
    ]
});

static ENUMERATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s").unwrap());
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}|\.{3,}|…+").unwrap());

/// Split a line into a raw (label, value) pair using the first matching shape
pub fn detect_candidate(line: &str) -> Option<Candidate> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    LINE_PATTERNS.iter().find_map(|pattern| pattern.apply(line))
}

/// Detect a single field in a line of text
pub fn detect_field(line: &str) -> Option<Field> {
    detect_field_with_limit(line, DEFAULT_MAX_LABEL_LEN)
}

/// Detect a single field, treating labels longer than `max_label_len`
/// characters as prose
pub fn detect_field_with_limit(line: &str, max_label_len: usize) -> Option<Field> {
    let candidate = detect_candidate(line)?;

    // `[ ] Sí [ ] No`: the prefix shape only owns the first option
    let raw_label = match candidate.kind {
        PatternKind::CheckboxPrefix => checkbox::before_next_marker(&candidate.raw_label),
        _ => candidate.raw_label.as_str(),
    };
    let label_text = clean_label(raw_label);
    if label_text.chars().count() > max_label_len
        || !label_text.chars().any(char::is_alphabetic)
    {
        return None;
    }
    let label = sanitize(&label_text);
    if label.is_empty() {
        return None;
    }

    let field_type = match candidate.kind {
        PatternKind::CheckboxPrefix => FieldType::Checkbox,
        _ => {
            let label_context = match &candidate.note {
                Some(note) => format!("{} ({})", candidate.raw_label, note),
                None => candidate.raw_label.clone(),
            };
            infer_type(&label_context, &candidate.raw_value)
        }
    };

    Some(Field::new(label, field_type, clean_value(&candidate.raw_value)))
}

/// Detect every field a line holds: the line's own field first, then any
/// checkbox options on it.
///
/// Both detectors may report the same checkbox; the duplicate is removed
/// when the field list is finalized.
pub fn detect_fields(line: &str, max_label_len: usize) -> Vec<Field> {
    let mut fields: Vec<Field> = detect_field_with_limit(line, max_label_len)
        .into_iter()
        .collect();
    fields.extend(checkbox::detect_checkboxes(line));
    fields
}

/// Remove glyphs and collapse whitespace, leaving human-readable label text
fn clean_label(raw: &str) -> String {
    collapse_whitespace(&checkbox::strip_markers(raw))
}

/// Drop fill-in placeholders (`____`, `......`) and surrounding whitespace
fn clean_value(raw: &str) -> String {
    collapse_whitespace(&PLACEHOLDER_RE.replace_all(raw, " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldValue;

    fn kind_of(line: &str) -> Option<PatternKind> {
        detect_candidate(line).map(|c| c.kind)
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn test_colon_field() {
        let field = detect_field("Nombre: Juan").unwrap();
        assert_eq!(field.label, "nombre");
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.value, text("Juan"));
        assert!(field.section.is_none());
    }

    #[test]
    fn test_colon_with_placeholder() {
        let field = detect_field("Apellido: ______________").unwrap();
        assert_eq!(field.label, "apellido");
        assert_eq!(field.value, text(""));

        let field = detect_field("Ciudad: ..........  Lima").unwrap();
        assert_eq!(field.value, text("Lima"));
    }

    #[test]
    fn test_colon_keeps_value_colons() {
        let field = detect_field("Hora de entrada: 10:30").unwrap();
        assert_eq!(field.label, "hora_de_entrada");
        assert_eq!(field.value, text("10:30"));
    }

    #[test]
    fn test_equals_field() {
        assert_eq!(kind_of("Cantidad = 3"), Some(PatternKind::Equals));
        let field = detect_field("Cantidad = 3").unwrap();
        assert_eq!(field.label, "cantidad");
        assert_eq!(field.field_type, FieldType::Number);
        assert_eq!(field.value, text("3"));
    }

    #[test]
    fn test_checkbox_prefix() {
        assert_eq!(
            kind_of("[ ] Acepta terminos"),
            Some(PatternKind::CheckboxPrefix)
        );
        let field = detect_field("[ ] Acepta terminos").unwrap();
        assert_eq!(field.label, "acepta_terminos");
        assert_eq!(field.field_type, FieldType::Checkbox);
        assert_eq!(field.value, FieldValue::Bool(false));

        let field = detect_field("☐ Deseo factura").unwrap();
        assert_eq!(field.label, "deseo_factura");
        assert_eq!(field.field_type, FieldType::Checkbox);
    }

    #[test]
    fn test_checkbox_with_colon_is_checkbox() {
        assert_eq!(kind_of("[ ] Cantidad: 5"), Some(PatternKind::Colon));
        let field = detect_field("[ ] Cantidad: 5").unwrap();
        assert_eq!(field.label, "cantidad");
        assert_eq!(field.field_type, FieldType::Checkbox);
        assert_eq!(field.value, FieldValue::Bool(false));
    }

    #[test]
    fn test_underscore_run() {
        assert_eq!(kind_of("Firma ____________"), Some(PatternKind::UnderscoreRun));
        let field = detect_field("Firma ____________").unwrap();
        assert_eq!(field.label, "firma");
        assert_eq!(field.value, text(""));
    }

    #[test]
    fn test_numbered_field() {
        assert_eq!(kind_of("3. Ocupación: docente"), Some(PatternKind::Numbered));
        let field = detect_field("3. Ocupación: docente").unwrap();
        assert_eq!(field.label, "ocupación");
        assert_eq!(field.value, text("docente"));

        assert_eq!(kind_of("12) Edad: 40"), Some(PatternKind::Numbered));
    }

    #[test]
    fn test_parenthetical_field() {
        assert_eq!(kind_of("Peso (kg): 70"), Some(PatternKind::Parenthetical));
        let field = detect_field("Peso (kg): 70").unwrap();
        assert_eq!(field.label, "peso");
        assert_eq!(field.field_type, FieldType::Number);
        assert_eq!(field.value, text("70"));

        let field = detect_field("Vencimiento (dd/mm/aaaa):").unwrap();
        assert_eq!(field.label, "vencimiento");
        assert_eq!(field.field_type, FieldType::Date);
    }

    #[test]
    fn test_prose_is_not_a_field() {
        assert!(detect_field("Por favor complete el formulario con letra clara.").is_none());
        assert!(detect_field("").is_none());
        assert!(detect_field("   ").is_none());
        assert!(detect_field("10:30").is_none());
        assert!(detect_field("Visite https://example.com para más información").is_none());
    }

    #[test]
    fn test_long_label_is_prose() {
        let line = format!("{}: valor", "palabra ".repeat(12));
        assert!(detect_field(&line).is_none());
        assert!(detect_field_with_limit(&line, 200).is_some());
    }

    #[test]
    fn test_checkbox_prefix_takes_first_option() {
        let field = detect_field("[ ] Soltero [ ] Casado").unwrap();
        assert_eq!(field.label, "soltero");
    }

    #[test]
    fn test_detect_fields_combines_detectors() {
        let fields = detect_fields("Estado civil: ( ) Soltero ( ) Casado", DEFAULT_MAX_LABEL_LEN);
        let labels: Vec<_> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["estado_civil", "soltero", "casado"]);
        assert!(fields.iter().all(|f| f.field_type == FieldType::Checkbox));

        let fields = detect_fields("Nombre: Juan", DEFAULT_MAX_LABEL_LEN);
        assert_eq!(fields.len(), 1);
        assert!(detect_fields("Texto libre sin campos", DEFAULT_MAX_LABEL_LEN).is_empty());
    }

    #[test]
    fn test_date_field() {
        let field = detect_field("Fecha de nacimiento: ").unwrap();
        assert_eq!(field.label, "fecha_de_nacimiento");
        assert_eq!(field.field_type, FieldType::Date);
        assert_eq!(field.value, text(""));
    }
}
