use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::{Block, Container, Document, Paragraph};

lazy_static! {
    /// `[token]`: any bracketed run of non-bracket characters.
    static ref MARKER: Regex = Regex::new(r"\[([^\[\]]+)\]").expect("marker pattern is valid");
}

/// Distinct tokens in a piece of text.
pub fn markers_in_text(text: &str) -> BTreeSet<String> {
    MARKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Distinct tokens in a paragraph. Matching runs over the concatenated run
/// text, so a token split across runs is still found.
pub fn collect_markers(paragraph: &Paragraph) -> BTreeSet<String> {
    markers_in_text(&paragraph.text())
}

/// Every distinct token in the body, table cells (nested tables included),
/// headers and footers, sorted.
pub fn extract_placeholders(document: &Document) -> Vec<String> {
    let mut found = BTreeSet::new();
    for story in document.stories() {
        collect_container(&story.content, &mut found);
    }
    found.into_iter().collect()
}

fn collect_container(container: &Container, found: &mut BTreeSet<String>) {
    for block in &container.blocks {
        match block {
            Block::Paragraph(p) => found.extend(collect_markers(p)),
            Block::Table(table) => {
                for cell in table.rows().flat_map(|row| row.cells()) {
                    collect_container(&cell.content, found);
                }
            }
            Block::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{docx, paragraph, table};

    #[test]
    fn test_token_split_across_runs() {
        let doc = Document::from_bytes(&docx(&paragraph(&["Вагон № [ваго", "ны.номер]"]), None, None)).unwrap();
        let p = doc.paragraphs().next().unwrap();

        let markers = collect_markers(p);
        assert_eq!(markers.len(), 1);
        assert!(markers.contains("вагоны.номер"));
    }

    #[test]
    fn test_all_token_shapes() {
        let markers = markers_in_text("[номер] [договоры.дата] [сумма(услуги.стоимость)]");
        let expected: BTreeSet<String> = ["номер", "договоры.дата", "сумма(услуги.стоимость)"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(markers, expected);
    }

    #[test]
    fn test_nested_and_empty_brackets_are_not_tokens() {
        assert!(markers_in_text("[] and [[").is_empty());
        let markers = markers_in_text("[[inner]]");
        assert_eq!(markers.into_iter().collect::<Vec<_>>(), vec!["inner"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(markers_in_text("[a] [a] [b]").len(), 2);
    }

    #[test]
    fn test_extract_placeholders_covers_every_location() {
        let body = format!("{}{}", paragraph(&["[b.body]"]), table(&["[c.cell]", "plain"]));
        let doc = Document::from_bytes(&docx(
            &body,
            Some(&paragraph(&["[a.header]"])),
            Some(&paragraph(&["[d.footer] [b.body]"])),
        ))
        .unwrap();

        assert_eq!(
            extract_placeholders(&doc),
            vec!["a.header", "b.body", "c.cell", "d.footer"]
        );
    }

    #[test]
    fn test_extract_placeholders_is_repeatable() {
        let doc = Document::from_bytes(&docx(&paragraph(&["[z] [y] [x]"]), None, None)).unwrap();
        assert_eq!(extract_placeholders(&doc), extract_placeholders(&doc));
        assert_eq!(extract_placeholders(&doc), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_nested_table_cells_are_scanned() {
        let inner = table(&["[deep]"]);
        let body = format!("<w:tbl><w:tr><w:tc>{inner}<w:p/></w:tc></w:tr></w:tbl>");
        let doc = Document::from_bytes(&docx(&body, None, None)).unwrap();
        assert_eq!(extract_placeholders(&doc), vec!["deep"]);
    }
}
