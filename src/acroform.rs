//! Native AcroForm fields
//!
//! Some PDFs already carry fillable widgets. Their names are listed so the
//! caller knows inference is not needed, and values can be written into
//! them directly.

use crate::extractor::decode_string_bytes;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{HashMap, HashSet};

/// A widget annotation and the field dictionary that names it
struct Widget {
    name: String,
    /// Object holding `/T`: the widget itself or its parent field
    field_id: Option<ObjectId>,
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn field_name(dict: &Dictionary) -> Option<String> {
    let Object::String(bytes, _) = dict.get(b"T").ok()? else {
        return None;
    };
    let name = decode_string_bytes(bytes);
    (!name.is_empty()).then_some(name)
}

/// Widgets in page order. Kids without `/T` take the name of their parent.
fn widgets(doc: &Document) -> Vec<Widget> {
    let mut found = Vec::new();

    for (_, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Some(Ok(annots)) = page
            .get(b"Annots")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .map(Object::as_array)
        else {
            continue;
        };

        for annot in annots {
            let id = annot.as_reference().ok();
            let Some(Ok(dict)) = resolve(doc, annot).map(Object::as_dict) else {
                continue;
            };
            let is_widget = dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Widget");
            if !is_widget {
                continue;
            }

            if let Some(name) = field_name(dict) {
                found.push(Widget { name, field_id: id });
                continue;
            }

            let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok();
            let parent_name = parent_id
                .and_then(|pid| doc.get_dictionary(pid).ok())
                .and_then(field_name);
            if let Some(name) = parent_name {
                found.push(Widget {
                    name,
                    field_id: parent_id,
                });
            }
        }
    }

    found
}

/// Names of the fillable fields already present in `doc`, first occurrence
/// order, each name once
pub fn native_form_fields(doc: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    widgets(doc)
        .into_iter()
        .map(|widget| widget.name)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Write `values` into the matching native fields of `doc`.
///
/// Returns the number of fields updated. Viewers are asked to regenerate
/// appearances since none are drawn here.
pub fn fill_native_fields(doc: &mut Document, values: &HashMap<String, String>) -> usize {
    let targets: Vec<(ObjectId, String)> = widgets(doc)
        .into_iter()
        .filter_map(|widget| {
            let value = values.get(&widget.name)?;
            Some((widget.field_id?, value.clone()))
        })
        .collect::<HashMap<_, _>>()
        .into_iter()
        .collect();

    let mut filled = 0;
    for (id, value) in targets {
        if let Ok(dict) = doc.get_object_mut(id).and_then(|obj| obj.as_dict_mut()) {
            dict.set("V", encode_text_string(&value));
            filled += 1;
        }
    }

    if filled > 0 {
        set_need_appearances(doc);
    }
    log::info!("Filled {} of {} values", filled, values.len());
    filled
}

/// PDF text string: literal for ASCII, UTF-16BE with a BOM otherwise
fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn set_need_appearances(doc: &mut Document) {
    let Ok(root_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) else {
        return;
    };
    let acroform_id = doc
        .get_dictionary(root_id)
        .ok()
        .and_then(|catalog| catalog.get(b"AcroForm").ok())
        .and_then(|obj| obj.as_reference().ok());

    let acroform = match acroform_id {
        Some(id) => doc.get_object_mut(id).and_then(|obj| obj.as_dict_mut()),
        None => doc
            .get_object_mut(root_id)
            .and_then(|obj| obj.as_dict_mut())
            .and_then(|catalog| catalog.get_mut(b"AcroForm"))
            .and_then(|obj| obj.as_dict_mut()),
    };
    if let Ok(dict) = acroform {
        dict.set("NeedAppearances", true);
    }
}
