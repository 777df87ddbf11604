//! Form inference over extracted pages
//!
//! Pages are scanned strictly in order because the current section and the
//! form title carry over from one page to the next. For every line:
//!
//! 1. a heading switches the current section and records a section marker;
//! 2. anything else goes through the line and checkbox detectors, and the
//!    resulting fields are tagged with the current section.
//!
//! Tables on a page are scanned after its lines. The collected fields are
//! deduplicated and ordered once at the end of the run.

use crate::dedup::{finalize, FieldOrder};
use crate::detector::{self, DEFAULT_MAX_LABEL_LEN};
use crate::extractor::PageContent;
use crate::form::{Field, FormMetadata, FormStructure};
use crate::section::{looks_like_form_title, HeadingRule, SectionTracker};
use crate::tables::process_table;

/// Configuration for form inference
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    /// Order of the final field list (default: first-seen)
    pub order: FieldOrder,
    /// Limits for colon-terminated headings
    pub heading: HeadingRule,
    /// How many leading non-empty lines of the first page may hold the title
    pub form_name_lines: usize,
    /// Labels longer than this many characters are treated as prose
    pub max_label_len: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            order: FieldOrder::Stable,
            heading: HeadingRule::default(),
            form_name_lines: 5,
            max_label_len: DEFAULT_MAX_LABEL_LEN,
        }
    }
}

/// Infer the form structure of a sequence of pages
pub fn infer_form_structure(pages: &[PageContent], options: &InferenceOptions) -> FormStructure {
    let mut scan = FormScan::new(options);

    for (index, page) in pages.iter().enumerate() {
        scan.scan_page(page, index == 0);
    }

    scan.finish(pages.len() as u32)
}

/// Accumulated state of one inference run
struct FormScan<'a> {
    options: &'a InferenceOptions,
    tracker: SectionTracker,
    fields: Vec<Field>,
    form_name: Option<String>,
}

impl<'a> FormScan<'a> {
    fn new(options: &'a InferenceOptions) -> Self {
        Self {
            options,
            tracker: SectionTracker::new(),
            fields: Vec::new(),
            form_name: None,
        }
    }

    fn scan_page(&mut self, page: &PageContent, is_first_page: bool) {
        let before = self.fields.len();

        if is_first_page {
            self.find_form_name(&page.lines);
        }

        for line in &page.lines {
            self.scan_line(line);
        }

        for table in &page.tables {
            let fields = process_table(table, &self.tracker, self.options.max_label_len);
            self.fields.extend(fields);
        }

        log::info!(
            "Page {}: {} lines, {} tables, {} candidate fields",
            page.page,
            page.lines.len(),
            page.tables.len(),
            self.fields.len() - before
        );
    }

    fn scan_line(&mut self, line: &str) {
        if self.options.heading.is_heading(line) {
            if let Some(marker) = self.tracker.enter(line) {
                self.fields.push(marker);
                return;
            }
        }

        for field in detector::detect_fields(line, self.options.max_label_len) {
            let field = self.tracker.tag(field);
            self.fields.push(field);
        }
    }

    fn find_form_name(&mut self, lines: &[String]) {
        if self.form_name.is_some() {
            return;
        }
        self.form_name = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .take(self.options.form_name_lines)
            .find(|line| looks_like_form_title(line))
            .map(str::to_string);

        if let Some(name) = &self.form_name {
            log::debug!("Form name: {:?}", name);
        }
    }

    fn finish(self, total_pages: u32) -> FormStructure {
        let detected = self.fields.len();
        let fields = finalize(self.fields, self.options.order);
        log::info!(
            "Inferred {} fields ({} detected, {} duplicates dropped) over {} pages",
            fields.len(),
            detected,
            detected - fields.len(),
            total_pages
        );

        FormStructure {
            fields,
            metadata: FormMetadata {
                total_pages,
                form_name: self.form_name.unwrap_or_default(),
            },
        }
    }
}
