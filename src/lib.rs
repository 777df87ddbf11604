//! Form template inference for flat PDFs
//!
//! Many PDF forms are plain documents with no fillable fields: labels,
//! blanks and checkbox glyphs printed as text. This crate scans the text
//! and tables of such a document and infers the form behind it:
//! - Label detection from common form layouts (`Label: ____`, `[ ] Option`, ...)
//! - Field typing (text, number, date, checkbox) from keywords and value shape
//! - Section grouping from headings
//! - Deduplicated, ordered output ready to serialize as a JSON template
//!
//! PDFs that already have fillable AcroForm fields can be listed and filled
//! directly with [`native_fields`] and [`fill_form`].

pub mod acroform;
pub mod checkbox;
pub mod classify;
pub mod dedup;
pub mod detector;
pub mod extractor;
pub mod form;
pub mod pipeline;
pub mod sanitize;
pub mod section;
pub mod tables;

pub use acroform::{fill_native_fields, native_form_fields};
pub use classify::infer_type;
pub use dedup::{finalize, FieldOrder};
pub use detector::{detect_field, detect_fields};
pub use extractor::{extract_pages, extract_pages_mem, pages_from_text, PageContent};
pub use form::{Field, FieldType, FieldValue, FormMetadata, FormStructure};
pub use pipeline::{infer_form_structure, InferenceOptions};
pub use sanitize::sanitize;
pub use tables::Table;

use lopdf::Document;
use std::collections::HashMap;
use std::path::Path;

/// Infer the form template of a PDF file
pub fn extract_form<P: AsRef<Path>>(
    path: P,
    options: &InferenceOptions,
) -> Result<FormStructure, FormError> {
    let path = path.as_ref();
    log::info!("Extracting form structure from {}", path.display());

    let pages = extract_pages(path)?;
    Ok(infer_form_structure(&pages, options))
}

/// Infer the form template of a PDF held in memory
pub fn extract_form_mem(
    buffer: &[u8],
    options: &InferenceOptions,
) -> Result<FormStructure, FormError> {
    let pages = extract_pages_mem(buffer)?;
    Ok(infer_form_structure(&pages, options))
}

/// Names of the fillable fields a PDF file already has
pub fn native_fields<P: AsRef<Path>>(path: P) -> Result<Vec<String>, FormError> {
    let doc = load_unencrypted(path.as_ref())?;
    Ok(native_form_fields(&doc))
}

/// Fill the native fields of `input` with `values` and save the result to
/// `output`. Returns how many fields were filled.
pub fn fill_form<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    values: &HashMap<String, String>,
    output: Q,
) -> Result<usize, FormError> {
    let mut doc = load_unencrypted(input.as_ref())?;
    let filled = fill_native_fields(&mut doc, values);
    doc.save(output.as_ref())?;
    log::info!("Filled form written to {}", output.as_ref().display());
    Ok(filled)
}

fn load_unencrypted(path: &Path) -> Result<Document, FormError> {
    let doc = Document::load(path)?;
    if doc.is_encrypted() {
        return Err(FormError::Encrypted);
    }
    Ok(doc)
}

/// Infer the form template of plain text, pages separated by form feeds
pub fn extract_form_from_text(text: &str, options: &InferenceOptions) -> FormStructure {
    infer_form_structure(&pages_from_text(text), options)
}

/// Write a form template as pretty-printed JSON
pub fn write_form_template<P: AsRef<Path>>(
    form: &FormStructure,
    path: P,
) -> Result<(), FormError> {
    let path = path.as_ref();
    let json = form.to_json()?;
    std::fs::write(path, json)
        .map_err(|e| FormError::Serialization(format!("{}: {}", path.display(), e)))
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("Failed to write form template: {0}")]
    Serialization(String),
}

impl From<lopdf::Error> for FormError {
    fn from(e: lopdf::Error) -> Self {
        FormError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for FormError {
    fn from(e: serde_json::Error) -> Self {
        FormError::Serialization(e.to_string())
    }
}
