use super::paragraph::Paragraph;
use super::table::Table;
use crate::xml::XmlNode;

/// Block-level content of a story (body, header, footer, table cell).
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Section properties, content controls, cell properties and the like.
    Other(XmlNode),
}

/// An ordered list of blocks sharing one parent.
///
/// Inserting a paragraph is a splice on this list, so the relative order of
/// every other block is untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub blocks: Vec<Block>,
}

impl Container {
    pub fn from_nodes(nodes: Vec<XmlNode>) -> Self {
        let blocks = nodes
            .into_iter()
            .map(|node| match node {
                XmlNode::Element(el) if el.name == "w:p" => Block::Paragraph(Paragraph::from_element(el)),
                XmlNode::Element(el) if el.name == "w:tbl" => Block::Table(Table::from_element(el)),
                other => Block::Other(other),
            })
            .collect();
        Self { blocks }
    }

    pub fn to_nodes(&self) -> Vec<XmlNode> {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => XmlNode::Element(p.to_element()),
                Block::Table(t) => XmlNode::Element(t.to_element()),
                Block::Other(node) => node.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Direct paragraphs in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Direct tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        match self.blocks.get(index)? {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        match self.blocks.get_mut(index)? {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Splices a new bare paragraph holding `text` right after the block at
    /// `index` and returns the new paragraph's index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn insert_paragraph_after(&mut self, index: usize, text: &str) -> usize {
        assert!(index < self.blocks.len(), "insert position {index} out of bounds");
        self.blocks
            .insert(index + 1, Block::Paragraph(Paragraph::new(text)));
        index + 1
    }
}
