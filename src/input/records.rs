use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::{Aggregate, ContractAggregate, MappingSource, ResolveError, TokenShape};
use crate::engine::{Mapping, Value};

type Row = BTreeMap<String, JsonValue>;

const CONTRACTS: &str = "договоры";
const SERVICES: &str = "услуги";
// Link table: one row per (id_договора, id_услуги) pair.
const CONTRACT_SERVICES: &str = "договорные_услуги";
const LINK_CONTRACT: &str = "id_договора";
const LINK_SERVICE: &str = "id_услуги";
const SERVICE_NAME: &str = "наименование";
const SERVICE_PRICE: &str = "стоимость_с_ндс";

/// Value of a service list placeholder when the contract has no services.
pub const NO_SERVICES: &str = "Нет услуг по договору";

/// In-memory tables of rows, keyed by table name.
///
/// The first row of a table is the entity in context: `table.column` tokens
/// read from it. `list`/`sum`/`count` run over every row of the table, which
/// the caller is expected to have already scoped to that entity. The
/// contract functions (`список_работ(...)`, `сумма(...)`) scope services to
/// the contract through the link table when one is present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    tables: BTreeMap<String, Vec<Row>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ResolveError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|e| ResolveError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn push_row<K, V, I>(&mut self, table: &str, row: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<JsonValue>,
    {
        let row = row
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Column value of the entity in context.
    pub fn field(&self, table: &str, column: &str) -> Option<String> {
        self.rows(table).first()?.get(column).and_then(scalar)
    }

    /// Column values of every row that has one.
    pub fn column(&self, table: &str, column: &str) -> Vec<String> {
        self.rows(table)
            .iter()
            .filter_map(|row| row.get(column).and_then(scalar))
            .collect()
    }

    pub fn aggregate(&self, function: Aggregate, table: &str, column: &str) -> Option<Value> {
        if !self.tables.contains_key(table) {
            return None;
        }
        let values = self.column(table, column);

        let value = match function {
            Aggregate::List => Value::List(values),
            Aggregate::Count => Value::Text(values.len().to_string()),
            Aggregate::Sum => Value::Text(format!("{:.2}", sum(table, column, &values))),
        };
        Some(value)
    }

    /// Services on the contract in context.
    ///
    /// The contract is the first row of `table`, which must carry `column`
    /// when one is given. With a `договорные_услуги` link table and a
    /// contract `id`, only the linked services count; otherwise every row of
    /// `услуги` is taken as already scoped to the contract.
    pub fn contract_services(&self, table: &str, column: Option<&str>) -> Option<Vec<&Row>> {
        let contract = self.rows(table).first()?;
        if let Some(column) = column {
            contract.get(column)?;
        }

        let services = self.rows(SERVICES);
        let links = self.rows(CONTRACT_SERVICES);
        let contract_id = contract.get("id").and_then(scalar);
        let (Some(contract_id), false) = (contract_id, links.is_empty()) else {
            return Some(services.iter().collect());
        };

        let linked: BTreeSet<String> = links
            .iter()
            .filter(|link| link.get(LINK_CONTRACT).and_then(scalar).as_deref() == Some(contract_id.as_str()))
            .filter_map(|link| link.get(LINK_SERVICE).and_then(scalar))
            .collect();

        Some(
            services
                .iter()
                .filter(|row| row.get("id").and_then(scalar).is_some_and(|id| linked.contains(&id)))
                .collect(),
        )
    }

    pub fn contract_aggregate(
        &self,
        function: ContractAggregate,
        table: &str,
        column: Option<&str>,
    ) -> Option<Value> {
        let services = self.contract_services(table, column)?;

        let value = match function {
            ContractAggregate::ServiceList => {
                let names: Vec<String> = services
                    .iter()
                    .filter_map(|row| row.get(SERVICE_NAME).and_then(scalar))
                    .collect();
                if names.is_empty() {
                    Value::Text(NO_SERVICES.to_string())
                } else {
                    Value::List(names)
                }
            }
            ContractAggregate::ServiceTotal => {
                let prices: Vec<String> = services
                    .iter()
                    .filter_map(|row| row.get(SERVICE_PRICE).and_then(scalar))
                    .collect();
                Value::Text(format!("{:.2} руб.", sum(SERVICES, SERVICE_PRICE, &prices)))
            }
        };
        Some(value)
    }

    fn resolve(&self, token: &str) -> Option<Value> {
        match TokenShape::parse(token)? {
            TokenShape::Field { table, column } => self.field(table, column).map(Value::Text),
            TokenShape::Aggregate {
                function,
                table,
                column,
            } => match function.parse::<Aggregate>() {
                Ok(function) => self.aggregate(function, table, column),
                Err(_) => {
                    let function = ContractAggregate::from_name(function)?;
                    self.contract_aggregate(function, table, Some(column))
                }
            },
            // Bare `[список_работ]` and `[сумма]` refer to the contract in context.
            TokenShape::Name(name) => {
                let function = ContractAggregate::from_name(name)?;
                self.contract_aggregate(function, CONTRACTS, None)
            }
        }
    }
}

impl MappingSource for RecordSet {
    fn build(&self, tokens: &[String]) -> Result<Mapping, ResolveError> {
        let mut mapping = Mapping::new();
        for token in tokens {
            match self.resolve(token) {
                Some(value) => {
                    mapping.insert(token.clone(), value);
                }
                None => debug!(token = %token, "no record value for token"),
            }
        }
        Ok(mapping)
    }
}

fn sum(table: &str, column: &str, values: &[String]) -> f64 {
    let mut total = 0.0;
    for raw in values {
        match parse_number(raw) {
            Some(n) => total += n,
            None => warn!(table, column, value = %raw, "skipping non-numeric value in sum"),
        }
    }
    total
}

fn scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Accepts "1 234,50" as well as "1234.50".
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse().ok()
}
