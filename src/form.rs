//! Form data model
//!
//! The inferred template is a flat, ordered list of [`Field`]s plus a small
//! metadata block. Serialization is driven by serde so the JSON shape is:
//!
//! ```json
//! {
//!   "fields": [{"label": "nombre", "type": "text", "value": "", "section": "datos"}],
//!   "metadata": {"total_pages": 1, "form_name": "Formulario de Registro"}
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of an inferred field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Checkbox,
    /// Heading marker; groups the fields that follow it
    Section,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Section => "section",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default value of a field: literal text, or a boolean for checkboxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

/// One inferred form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Sanitized identifier (see [`crate::sanitize::sanitize`])
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub value: FieldValue,
    /// Most recent heading seen before this field, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Header of the table column the field was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_column: Option<String>,
}

impl Field {
    /// Build a field with the default value for its type.
    ///
    /// Checkboxes start unchecked, everything else starts with `value`
    /// (an empty string when the form has no pre-filled text).
    pub fn new(label: impl Into<String>, field_type: FieldType, value: impl Into<String>) -> Self {
        let value = match field_type {
            FieldType::Checkbox => FieldValue::Bool(false),
            FieldType::Section => FieldValue::Text(String::new()),
            _ => FieldValue::Text(value.into()),
        };
        Self {
            label: label.into(),
            field_type,
            value,
            section: None,
            table_column: None,
        }
    }

    pub fn checkbox(label: impl Into<String>) -> Self {
        Self::new(label, FieldType::Checkbox, "")
    }

    pub fn section_marker(label: impl Into<String>) -> Self {
        Self::new(label, FieldType::Section, "")
    }

    pub fn with_section(mut self, section: Option<&str>) -> Self {
        self.section = section.map(str::to_string);
        self
    }

    pub fn with_table_column(mut self, column: Option<&str>) -> Self {
        self.table_column = column.map(str::to_string);
        self
    }

    /// Deduplication identity: `label|type`, plus `|section` when tagged.
    pub fn identity_key(&self) -> String {
        match &self.section {
            Some(section) => format!("{}|{}|{}", self.label, self.field_type, section),
            None => format!("{}|{}", self.label, self.field_type),
        }
    }
}

/// Document-level information gathered during the scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormMetadata {
    pub total_pages: u32,
    /// Title line found near the top of page 1, empty if none matched
    pub form_name: String,
}

/// Result of one inference run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStructure {
    pub fields: Vec<Field>,
    pub metadata: FormMetadata,
}

impl FormStructure {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn field(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label == label)
    }

    /// Fields excluding section markers
    pub fn input_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| f.field_type != FieldType::Section)
    }
}
