// Configuration for the substitution engine
// Defaults reproduce the templates already in circulation

use crate::document::Twips;

/// List-expansion settings
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    /// Prefix marking an encoded mapping value as a list (default "LIST:")
    pub sentinel: String,

    /// Separator between encoded list items (default '|')
    pub delimiter: char,

    /// Text written in front of every list item (default "• ")
    pub bullet: String,

    /// Left indent applied to every list item paragraph (default 720 twips, half an inch)
    pub indent: Twips,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            sentinel: "LIST:".to_string(),
            delimiter: '|',
            bullet: "• ".to_string(),
            indent: Twips(720),
        }
    }
}

/// Master configuration for a substitution run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub list: ListConfig,

    /// Number of passes over the document (default 1).
    /// Each pass expands at most one list token per paragraph; extra passes
    /// pick up further list tokens and any plain tokens left in the text
    /// around an expanded list.
    pub passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            list: ListConfig::default(),
            passes: 1,
        }
    }
}

impl EngineConfig {
    /// Pass count with zero treated as one.
    pub fn effective_passes(&self) -> usize {
        self.passes.max(1)
    }
}
