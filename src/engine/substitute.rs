//! Placeholder substitution over a loaded document.
//!
//! The unit of work is one paragraph. A paragraph whose text contains a
//! list-valued token is replaced by bullet paragraphs spliced in place;
//! otherwise every plain token it contains is replaced and the paragraph is
//! rewritten as a single run. Paragraphs without a matching token keep their
//! runs and styling untouched.

use tracing::debug;

use super::config::EngineConfig;
use super::mapping::{Mapping, Value};
use super::report::SubstitutionReport;
use super::scanner::extract_placeholders;
use crate::document::{Block, Container, Document, Table};

/// Counters for one pass over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub paragraphs_rewritten: usize,
    pub lists_expanded: usize,
}

/// Runs the configured number of passes and reports what happened.
///
/// Passes stop early once one rewrites nothing.
pub fn substitute(document: &mut Document, mapping: &Mapping, config: &EngineConfig) -> SubstitutionReport {
    let mut report = SubstitutionReport::new(extract_placeholders(document), mapping);
    let substitutor = Substitutor::new(mapping, config);

    for pass in 1..=config.effective_passes() {
        let stats = substitutor.run_pass(document);
        report.passes = pass;
        report.paragraphs_rewritten += stats.paragraphs_rewritten;
        report.lists_expanded += stats.lists_expanded;
        if stats.paragraphs_rewritten == 0 {
            break;
        }
    }

    report.stranded = extract_placeholders(document)
        .into_iter()
        .filter(|token| mapping.contains_key(token))
        .collect();
    report
}

pub struct Substitutor<'a> {
    mapping: &'a Mapping,
    config: &'a EngineConfig,
}

impl<'a> Substitutor<'a> {
    pub fn new(mapping: &'a Mapping, config: &'a EngineConfig) -> Self {
        Self { mapping, config }
    }

    /// One pass over the body, every header and footer, and all table cells.
    /// Paragraphs created during the pass are not visited again.
    pub fn run_pass(&self, document: &mut Document) -> PassStats {
        let mut stats = PassStats::default();
        for story in document.stories_mut() {
            self.process_container(&mut story.content, &mut stats);
        }
        stats
    }

    pub fn process_container(&self, container: &mut Container, stats: &mut PassStats) {
        let mut index = 0;
        while index < container.blocks.len() {
            if let Some(Block::Table(table)) = container.blocks.get_mut(index) {
                self.process_table(table, stats);
                index += 1;
                continue;
            }
            let added = self.process_paragraph(container, index, stats);
            index += 1 + added;
        }
    }

    fn process_table(&self, table: &mut Table, stats: &mut PassStats) {
        for cell in table.rows_mut().flat_map(|row| row.cells_mut()) {
            self.process_container(&mut cell.content, stats);
        }
    }

    /// Rewrites the paragraph at `index` if it holds a known token and
    /// returns how many paragraphs were inserted after it.
    fn process_paragraph(&self, container: &mut Container, index: usize, stats: &mut PassStats) -> usize {
        let Some(paragraph) = container.paragraph(index) else {
            return 0;
        };
        let original = paragraph.text();
        if !original.contains(|c: char| c == '[' || c == ']') {
            return 0;
        }

        if let Some((at, key, value)) = self.first_list_token(&original) {
            let added = self.expand_list(container, index, &original, at, key, value);
            stats.lists_expanded += 1;
            stats.paragraphs_rewritten += 1;
            debug!(token = key, paragraphs = added + 1, "expanded list placeholder");
            return added;
        }

        if let Some(text) = self.replace_plain(&original) {
            if let Some(paragraph) = container.paragraph_mut(index) {
                paragraph.set_text(&text);
                stats.paragraphs_rewritten += 1;
                debug!(before = %original, after = %text, "replaced placeholders");
            }
        }
        0
    }

    /// The list-valued token whose marker occurs earliest in `text`.
    fn first_list_token(&self, text: &str) -> Option<(usize, &'a str, &'a Value)> {
        self.mapping
            .iter()
            .filter(|(_, value)| value.is_list())
            .filter_map(|(key, value)| {
                text.find(&marker(key)).map(|at| (at, key, value))
            })
            .min_by_key(|(at, _, _)| *at)
    }

    /// Replaces the paragraph at `index` with its pre-text (if any), one
    /// bullet paragraph per item, and its post-text (if any). Returns the
    /// number of paragraphs inserted after `index`.
    fn expand_list(
        &self,
        container: &mut Container,
        index: usize,
        original: &str,
        at: usize,
        key: &str,
        value: &Value,
    ) -> usize {
        let list = &self.config.list;
        let pre_text = &original[..at];
        let post_text = &original[at + marker(key).len()..];

        let Some(paragraph) = container.paragraph_mut(index) else {
            return 0;
        };
        let section_break = paragraph.take_section_break();

        let mut current = index;
        if !pre_text.is_empty() {
            paragraph.set_text(pre_text);
            current = container.insert_paragraph_after(current, "");
        }

        for (i, item) in value.rendered_items().into_iter().enumerate() {
            if i > 0 {
                current = container.insert_paragraph_after(current, "");
            }
            if let Some(host) = container.paragraph_mut(current) {
                host.set_text(&format!("{}{}", list.bullet, item));
                host.set_left_indent(list.indent);
            }
        }

        if !post_text.is_empty() {
            current = container.insert_paragraph_after(current, post_text);
        }

        // The expansion must still end the section the original paragraph ended.
        if let Some(sect_pr) = section_break {
            if let Some(last) = container.paragraph_mut(current) {
                last.set_section_break(sect_pr);
            }
        }

        current - index
    }

    /// Applies every plain entry in mapping order. `None` when nothing matched.
    fn replace_plain(&self, original: &str) -> Option<String> {
        let mut text = original.to_string();
        let mut replaced = false;

        for (key, value) in self.mapping.iter() {
            let Value::Text(replacement) = value else {
                continue;
            };
            let needle = marker(key);
            if text.contains(&needle) {
                text = text.replace(&needle, replacement);
                replaced = true;
            }
        }

        replaced.then_some(text)
    }
}

fn marker(key: &str) -> String {
    format!("[{key}]")
}
