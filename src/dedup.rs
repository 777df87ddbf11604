//! Deduplication and output ordering

use crate::form::Field;
use std::collections::HashSet;

/// Output order of the finalized field list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldOrder {
    /// First-seen order, mirroring the reading order of the PDF
    #[default]
    Stable,
    /// Ascending by label; ties keep first-seen order
    Sorted,
}

/// Drop repeated fields and apply the requested order.
///
/// Two fields are the same when their [`Field::identity_key`] matches. The
/// first occurrence is kept as is; later ones are discarded, never merged.
pub fn finalize(fields: Vec<Field>, order: FieldOrder) -> Vec<Field> {
    let mut seen = HashSet::with_capacity(fields.len());
    let mut unique: Vec<Field> = fields
        .into_iter()
        .filter(|field| seen.insert(field.identity_key()))
        .collect();

    if order == FieldOrder::Sorted {
        unique.sort_by(|a, b| a.label.cmp(&b.label));
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldType, FieldValue};

    fn text(label: &str, value: &str) -> Field {
        Field::new(label, FieldType::Text, value)
    }

    fn labels(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.label.as_str()).collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let fields = vec![text("nombre", "Juan"), text("nombre", "Pedro")];
        let out = finalize(fields, FieldOrder::Stable);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, FieldValue::Text("Juan".into()));
    }

    #[test]
    fn test_type_and_section_are_part_of_identity() {
        let fields = vec![
            text("fecha", ""),
            Field::new("fecha", FieldType::Date, ""),
            text("nombre", "").with_section(Some("titular")),
            text("nombre", "").with_section(Some("conyuge")),
            text("nombre", "").with_section(Some("titular")),
        ];
        let out = finalize(fields, FieldOrder::Stable);
        assert_eq!(out.len(), 4);
        assert_eq!(out[2].section.as_deref(), Some("titular"));
        assert_eq!(out[3].section.as_deref(), Some("conyuge"));
    }

    #[test]
    fn test_stable_order_preserved() {
        let fields = vec![
            text("zeta", ""),
            text("alfa", ""),
            text("zeta", ""),
            text("medio", ""),
        ];
        let out = finalize(fields, FieldOrder::Stable);
        assert_eq!(labels(&out), vec!["zeta", "alfa", "medio"]);
    }

    #[test]
    fn test_sorted_order() {
        let fields = vec![
            text("zeta", ""),
            text("alfa", "").with_section(Some("b")),
            text("medio", ""),
            text("alfa", "").with_section(Some("a")),
        ];
        let out = finalize(fields, FieldOrder::Sorted);
        assert_eq!(labels(&out), vec!["alfa", "alfa", "medio", "zeta"]);
        assert_eq!(out[0].section.as_deref(), Some("b"));
    }

    #[test]
    fn test_idempotent() {
        let fields = vec![
            text("a", ""),
            Field::checkbox("b"),
            text("a", "x"),
            Field::checkbox("b").with_section(Some("s")),
            Field::checkbox("b"),
        ];
        for order in [FieldOrder::Stable, FieldOrder::Sorted] {
            let once = finalize(fields.clone(), order);
            let twice = finalize(once.clone(), order);
            assert_eq!(once, twice);

            let keys: HashSet<String> = once.iter().map(Field::identity_key).collect();
            assert_eq!(keys.len(), once.len());
        }
    }

    #[test]
    fn test_empty() {
        assert!(finalize(Vec::new(), FieldOrder::Sorted).is_empty());
    }
}
