//! Template filling for rail-wagon repair paperwork.
//!
//! Word templates carry placeholders such as `[договоры.номер]` or
//! `[list(услуги.название)]`. This crate finds them (even when the editor
//! split a token across formatting runs), and replaces them with plain text
//! or with a bulleted list of paragraphs.
//!
//! ```rust,ignore
//! use repair_docs::engine::{replace_placeholders, EngineConfig, Mapping, Value};
//!
//! let mut mapping = Mapping::new();
//! mapping.insert("договоры.номер", "2024.000001");
//! mapping.insert("список_работ", Value::list(["Покраска", "Сварка"]));
//! let report = replace_placeholders("act.docx", "act-filled.docx", &mapping, &EngineConfig::default())?;
//! ```

pub mod document;
pub mod engine;
pub mod input;
pub mod xml;

#[cfg(test)]
mod testing;

pub use document::Document;
pub use engine::{
    extract_placeholders, replace_placeholders, substitute, EngineConfig, Mapping, SubstitutionReport,
    TemplateError, Value,
};
