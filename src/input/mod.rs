//! Producing a [`Mapping`](crate::engine::Mapping) for a template's tokens.
//!
//! Tokens come in three shapes: `name`, `table.column` and
//! `function(table.column)`. A [`MappingSource`] turns the tokens a template
//! actually contains into values; tokens it cannot resolve are simply left
//! out and show up as unresolved in the substitution report.

pub mod json;
pub mod records;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::engine::Mapping;

pub use json::load_mapping_json;
pub use records::{RecordSet, NO_SERVICES};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported value for {key}: {message}")]
    UnsupportedValue { key: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Aggregates available to `function(table.column)` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Column values of every row, as a list value.
    List,
    /// Numeric sum of the column, two decimals.
    Sum,
    /// Number of rows that have a value in the column.
    Count,
}

impl FromStr for Aggregate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Aggregate::List),
            "sum" => Ok(Aggregate::Sum),
            "count" => Ok(Aggregate::Count),
            other => Err(format!("unknown aggregate function: {other}")),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregate::List => "list",
            Aggregate::Sum => "sum",
            Aggregate::Count => "count",
        };
        f.write_str(name)
    }
}

/// Contract-scoped functions used by the paperwork templates, e.g.
/// `[список_работ(договоры.номер)]`. The argument names the contract in
/// context, not the column being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractAggregate {
    /// Names of the services on the contract, as a list value.
    /// Matches names starting with `список_работ` or `список_услуг`.
    ServiceList,
    /// Total price of those services with VAT, as `"1234.50 руб."`.
    /// Matches names starting with `сумма`.
    ServiceTotal,
}

impl ContractAggregate {
    pub fn from_name(name: &str) -> Option<Self> {
        if name.starts_with("список_работ") || name.starts_with("список_услуг") {
            Some(ContractAggregate::ServiceList)
        } else if name.starts_with("сумма") {
            Some(ContractAggregate::ServiceTotal)
        } else {
            None
        }
    }
}

/// Parsed form of a token body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenShape<'a> {
    Name(&'a str),
    Field {
        table: &'a str,
        column: &'a str,
    },
    Aggregate {
        function: &'a str,
        table: &'a str,
        column: &'a str,
    },
}

impl<'a> TokenShape<'a> {
    /// Returns `None` for tokens outside the three shapes (whitespace, empty
    /// parts, stray parentheses).
    pub fn parse(token: &'a str) -> Option<Self> {
        if let Some(open) = token.find('(') {
            let function = &token[..open];
            let inner = token[open + 1..].strip_suffix(')')?;
            let (table, column) = split_field(inner)?;
            return is_identifier(function).then_some(TokenShape::Aggregate {
                function,
                table,
                column,
            });
        }

        if token.contains('.') {
            let (table, column) = split_field(token)?;
            return Some(TokenShape::Field { table, column });
        }

        is_identifier(token).then_some(TokenShape::Name(token))
    }
}

fn split_field(text: &str) -> Option<(&str, &str)> {
    let (table, column) = text.split_once('.')?;
    (is_identifier(table) && is_identifier(column)).then_some((table, column))
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Something that can produce values for a template's tokens.
pub trait MappingSource {
    fn build(&self, tokens: &[String]) -> Result<Mapping, ResolveError>;
}
