use std::fmt;

use tracing::{info, warn};

use super::mapping::Mapping;

/// Diagnostics for one substitution run. Informational only; nothing in
/// here ever blocks writing the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Tokens found in the template before substitution, sorted.
    pub placeholders: Vec<String>,
    /// Found tokens that had a mapping entry.
    pub resolved: Vec<String>,
    /// Found tokens without a mapping entry; left as literal `[token]`.
    pub unresolved: Vec<String>,
    /// Mapping keys that no paragraph referenced.
    pub unused_keys: Vec<String>,
    /// Mapped tokens still present after the last pass, e.g. text next to
    /// an expanded list.
    pub stranded: Vec<String>,
    pub paragraphs_rewritten: usize,
    pub lists_expanded: usize,
    pub passes: usize,
}

impl SubstitutionReport {
    pub fn new(placeholders: Vec<String>, mapping: &Mapping) -> Self {
        let (resolved, unresolved): (Vec<String>, Vec<String>) = placeholders
            .iter()
            .cloned()
            .partition(|token| mapping.contains_key(token));

        let unused_keys = mapping
            .keys()
            .filter(|key| placeholders.binary_search_by(|p| p.as_str().cmp(*key)).is_err())
            .map(String::from)
            .collect();

        Self {
            placeholders,
            resolved,
            unresolved,
            unused_keys,
            ..Self::default()
        }
    }

    /// True when every token in the template had a value.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn log(&self) {
        for token in &self.unresolved {
            warn!(token = %token, "placeholder has no mapping entry, left as is");
        }
        for key in &self.unused_keys {
            warn!(key = %key, "mapping entry not referenced by the template");
        }
        for token in &self.stranded {
            warn!(token = %token, "mapped placeholder still present after substitution");
        }
        info!(
            placeholders = self.placeholders.len(),
            resolved = self.resolved.len(),
            paragraphs_rewritten = self.paragraphs_rewritten,
            lists_expanded = self.lists_expanded,
            passes = self.passes,
            "substitution finished"
        );
    }
}

impl fmt::Display for SubstitutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "placeholders: {} ({} resolved, {} unresolved)",
            self.placeholders.len(),
            self.resolved.len(),
            self.unresolved.len()
        )?;
        if !self.unresolved.is_empty() {
            writeln!(f, "unresolved: {}", self.unresolved.join(", "))?;
        }
        if !self.unused_keys.is_empty() {
            writeln!(f, "unused mapping keys: {}", self.unused_keys.join(", "))?;
        }
        if !self.stranded.is_empty() {
            writeln!(f, "still present: {}", self.stranded.join(", "))?;
        }
        write!(
            f,
            "paragraphs rewritten: {}, lists expanded: {}, passes: {}",
            self.paragraphs_rewritten, self.lists_expanded, self.passes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_against_mapping() {
        let mapping: Mapping = [("a", "1"), ("z", "2")].into_iter().collect();
        let report = SubstitutionReport::new(vec!["a".into(), "b".into()], &mapping);

        assert_eq!(report.resolved, vec!["a"]);
        assert_eq!(report.unresolved, vec!["b"]);
        assert_eq!(report.unused_keys, vec!["z"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_display_mentions_unresolved() {
        let report = SubstitutionReport::new(vec!["missing".into()], &Mapping::new());
        let text = report.to_string();
        assert!(text.contains("1 unresolved"));
        assert!(text.contains("unresolved: missing"));
    }
}
