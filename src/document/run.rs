use crate::xml::{XmlElement, XmlNode};

/// One piece of run content. Only text, tabs and breaks contribute to the
/// visible text; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    Tab,
    Break,
    Other(XmlNode),
}

/// A contiguous span of text sharing one set of run properties (`w:r`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub attributes: Vec<(String, String)>,
    pub properties: Option<XmlElement>,
    pub content: Vec<RunContent>,
}

impl Run {
    /// Creates an unstyled run. `\t` and `\n` become tab and break elements.
    pub fn new(text: &str) -> Self {
        let mut content = Vec::new();
        let mut pending = String::new();

        for c in text.chars() {
            let special = match c {
                '\t' => Some(RunContent::Tab),
                '\n' => Some(RunContent::Break),
                _ => None,
            };
            match special {
                Some(item) => {
                    if !pending.is_empty() {
                        content.push(RunContent::Text(std::mem::take(&mut pending)));
                    }
                    content.push(item);
                }
                None => pending.push(c),
            }
        }
        if !pending.is_empty() || content.is_empty() {
            content.push(RunContent::Text(pending));
        }

        Self {
            attributes: Vec::new(),
            properties: None,
            content,
        }
    }

    pub fn from_element(el: XmlElement) -> Self {
        let mut run = Self {
            attributes: el.attributes,
            properties: None,
            content: Vec::new(),
        };

        for node in el.children {
            let item = match node {
                XmlNode::Element(child) => match child.name.clone().as_str() {
                    "w:rPr" if run.properties.is_none() => {
                        run.properties = Some(child);
                        continue;
                    }
                    "w:t" => RunContent::Text(child.text()),
                    "w:tab" => RunContent::Tab,
                    "w:cr" => RunContent::Break,
                    "w:br" if is_line_break(&child) => RunContent::Break,
                    _ => RunContent::Other(XmlNode::Element(child)),
                },
                other => RunContent::Other(other),
            };
            run.content.push(item);
        }

        run
    }

    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.content {
            match item {
                RunContent::Text(t) => text.push_str(t),
                RunContent::Tab => text.push('\t'),
                RunContent::Break => text.push('\n'),
                RunContent::Other(_) => {}
            }
        }
        text
    }

    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:r");
        el.attributes = self.attributes.clone();
        if let Some(props) = &self.properties {
            el.children.push(XmlNode::Element(props.clone()));
        }

        for item in &self.content {
            let node = match item {
                RunContent::Text(t) => XmlNode::Element(text_element(t)),
                RunContent::Tab => XmlNode::Element(XmlElement::new("w:tab")),
                RunContent::Break => XmlNode::Element(XmlElement::new("w:br")),
                RunContent::Other(node) => node.clone(),
            };
            el.children.push(node);
        }

        el
    }
}

fn is_line_break(br: &XmlElement) -> bool {
    matches!(br.attribute("w:type"), None | Some("textWrapping"))
}

fn text_element(text: &str) -> XmlElement {
    let mut el = XmlElement::new("w:t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        el.set_attribute("xml:space", "preserve");
    }
    if !text.is_empty() {
        el.children.push(XmlNode::Text(text.to_string()));
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlPart;

    fn parse_run(xml: &str) -> Run {
        Run::from_element(XmlPart::parse(xml).unwrap().root)
    }

    #[test]
    fn test_run_text_concatenates_text_tabs_and_breaks() {
        let run = parse_run(r#"<w:r><w:rPr><w:b/></w:rPr><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r>"#);
        assert_eq!(run.text(), "a\tb\nc");
        assert!(run.properties.is_some());
    }

    #[test]
    fn test_page_break_carries_no_text() {
        let run = parse_run(r#"<w:r><w:br w:type="page"/></w:r>"#);
        assert_eq!(run.text(), "");
        assert_eq!(run.content.len(), 1);
    }

    #[test]
    fn test_new_run_maps_control_characters() {
        let run = Run::new("x\ty\nz");
        assert_eq!(run.content.len(), 5);
        assert_eq!(run.text(), "x\ty\nz");
        assert!(run.properties.is_none());
    }

    #[test]
    fn test_new_run_with_empty_text_keeps_one_text_node() {
        let run = Run::new("");
        assert_eq!(run.content, vec![RunContent::Text(String::new())]);
    }

    #[test]
    fn test_to_element_preserves_edge_whitespace() {
        let el = Run::new(" padded ").to_element();
        let t = el.child("w:t").unwrap();
        assert_eq!(t.attribute("xml:space"), Some("preserve"));
        assert_eq!(t.text(), " padded ");
    }

    #[test]
    fn test_round_trip_keeps_unknown_children() {
        let run = parse_run(r#"<w:r><w:drawing><wp:inline/></w:drawing><w:t>x</w:t></w:r>"#);
        let el = run.to_element();
        assert!(el.child("w:drawing").is_some());
        assert_eq!(Run::from_element(el).text(), "x");
    }
}
