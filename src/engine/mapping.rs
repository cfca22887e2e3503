use super::config::ListConfig;

/// Replacement value for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Substituted verbatim into the surrounding text.
    Text(String),
    /// Expanded into one bullet paragraph per item.
    List(Vec<String>),
}

impl Value {
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Decodes the string convention used by older callers: a value starting
    /// with the sentinel is a list of delimiter-separated items, each trimmed.
    ///
    /// A plain string that happens to start with the sentinel is read as a
    /// list too; typed callers should build [`Value::Text`] directly.
    pub fn decode(raw: &str, config: &ListConfig) -> Self {
        match raw.strip_prefix(config.sentinel.as_str()) {
            Some(rest) => Value::List(
                rest.split(config.delimiter)
                    .map(|item| item.trim().to_string())
                    .collect(),
            ),
            None => Value::Text(raw.to_string()),
        }
    }

    pub fn encode(&self, config: &ListConfig) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::List(items) => {
                let delimiter = config.delimiter.to_string();
                format!("{}{}", config.sentinel, items.join(&delimiter))
            }
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Items as rendered. An empty list still renders one empty bullet.
    pub fn rendered_items(&self) -> Vec<&str> {
        match self {
            Value::Text(text) => vec![text.as_str()],
            Value::List(items) if items.is_empty() => vec![""],
            Value::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// Placeholder name to value, in caller insertion order.
///
/// Order matters: plain replacements are applied entry by entry in this
/// order. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from string values in the sentinel convention.
    pub fn from_encoded<I, K, V>(pairs: I, config: &ListConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .map(|(key, raw)| (key.into(), Value::decode(raw.as_ref(), config)))
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlays `other`: its values win, new keys go to the end.
    pub fn merge(&mut self, other: Mapping) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}
