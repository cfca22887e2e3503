use super::container::Container;
use super::paragraph::Paragraph;
use crate::xml::{XmlElement, XmlNode};

#[derive(Debug, Clone, PartialEq)]
pub enum TableItem {
    Row(Row),
    /// `w:tblPr`, `w:tblGrid` and anything else outside the rows.
    Other(XmlNode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowItem {
    Cell(Cell),
    Other(XmlNode),
}

/// A `w:tbl` grid. The engine only ever edits cell content, so the grid
/// shape is whatever was loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub attributes: Vec<(String, String)>,
    pub content: Vec<TableItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub attributes: Vec<(String, String)>,
    pub content: Vec<RowItem>,
}

/// A `w:tc` cell. Its `w:tcPr` lives in the container as a raw block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub attributes: Vec<(String, String)>,
    pub content: Container,
}

impl Table {
    pub fn from_element(el: XmlElement) -> Self {
        let content = el
            .children
            .into_iter()
            .map(|node| match node {
                XmlNode::Element(row) if row.name == "w:tr" => TableItem::Row(Row::from_element(row)),
                other => TableItem::Other(other),
            })
            .collect();

        Self {
            attributes: el.attributes,
            content,
        }
    }

    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tbl");
        el.attributes = self.attributes.clone();
        el.children = self
            .content
            .iter()
            .map(|item| match item {
                TableItem::Row(row) => XmlNode::Element(row.to_element()),
                TableItem::Other(node) => node.clone(),
            })
            .collect();
        el
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.content.iter().filter_map(|item| match item {
            TableItem::Row(row) => Some(row),
            TableItem::Other(_) => None,
        })
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.content.iter_mut().filter_map(|item| match item {
            TableItem::Row(row) => Some(row),
            TableItem::Other(_) => None,
        })
    }

    /// Cell counts per row.
    pub fn shape(&self) -> Vec<usize> {
        self.rows().map(|row| row.cells().count()).collect()
    }
}

impl Row {
    pub fn from_element(el: XmlElement) -> Self {
        let content = el
            .children
            .into_iter()
            .map(|node| match node {
                XmlNode::Element(cell) if cell.name == "w:tc" => RowItem::Cell(Cell {
                    attributes: cell.attributes,
                    content: Container::from_nodes(cell.children),
                }),
                other => RowItem::Other(other),
            })
            .collect();

        Self {
            attributes: el.attributes,
            content,
        }
    }

    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tr");
        el.attributes = self.attributes.clone();
        el.children = self
            .content
            .iter()
            .map(|item| match item {
                RowItem::Cell(cell) => XmlNode::Element(cell.to_element()),
                RowItem::Other(node) => node.clone(),
            })
            .collect();
        el
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.content.iter().filter_map(|item| match item {
            RowItem::Cell(cell) => Some(cell),
            RowItem::Other(_) => None,
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.content.iter_mut().filter_map(|item| match item {
            RowItem::Cell(cell) => Some(cell),
            RowItem::Other(_) => None,
        })
    }
}

impl Cell {
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.paragraphs()
    }

    pub fn to_element(&self) -> XmlElement {
        let mut el = XmlElement::new("w:tc");
        el.attributes = self.attributes.clone();
        el.children = self.content.to_nodes();
        el
    }
}
