//! Field type inference
//!
//! Keyword/pattern heuristics that map a label (plus surrounding text) to a
//! [`FieldType`]. Categories overlap, so the checks run in a fixed order and
//! the first hit wins:
//!
//! 1. checkbox/radio glyph present -> `Checkbox`
//! 2. date keyword or date-shaped text -> `Date`
//! 3. quantity keyword, or the context is a bare number -> `Number`
//! 4. yes/no or acceptance keyword -> `Checkbox`
//! 5. otherwise `Text`
//!
//! Keywords cover English and Spanish forms.

use crate::checkbox;
use crate::form::FieldType;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        date | month | year | birth | fecha | nacimiento | vencimiento
        | \b(?: day | d[ií]a | mes | año | a[nñ]o | dob )s?\b
        | \b(?: dd | mm )\s*[/-]\s*(?: mm | dd | aa | yy )
        | \d{1,4}\s*[/-]\s*\d{1,2}\s*[/-]\s*\d{1,4}
        | _{1,4}\s*/\s*_{1,4}\s*/\s*_{1,4}
        ",
    )
    .unwrap()
});

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        amount | number | total | weight | height | phone | quantity
        | cantidad | monto | importe | n[uú]mero | peso | altura | estatura | tel[eé]fono
        | \b(?: age | qty | edad | celular )s?\b
        | \bn[oº°]\. | \bn[º°]
        ",
    )
    .unwrap()
});

static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?[$€]?\s*\d[\d.,\s]*%?\s*$").unwrap());

static BOOLEAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b(?: yes | no | s[ií] )\b
        | accept | agree | consent | acepto | acepta | autorizo | de\ acuerdo
        ",
    )
    .unwrap()
});

/// Infer the semantic type of a field.
///
/// `label` is the raw label text (glyphs included, before sanitizing) and
/// `context` is any surrounding text such as the value that followed it.
/// Never fails: ambiguous input falls back to [`FieldType::Text`].
pub fn infer_type(label: &str, context: &str) -> FieldType {
    let text = format!("{} {}", label, context).to_lowercase();

    if checkbox::contains_marker(&text) {
        return FieldType::Checkbox;
    }
    if DATE_RE.is_match(&text) {
        return FieldType::Date;
    }
    if NUMBER_RE.is_match(&text) || BARE_NUMBER_RE.is_match(context) {
        return FieldType::Number;
    }
    if BOOLEAN_RE.is_match(&text) {
        return FieldType::Checkbox;
    }
    FieldType::Text
}
