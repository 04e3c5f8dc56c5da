//! Parsed stylesheets.

use std::path::{Path, PathBuf};

use crate::parser::Parser;
use crate::rules::{Rule, RuleList};
use crate::types::Properties;
use crate::{Error, Result};

/// A parsed stylesheet.
///
/// Holds the top-level rules in source order and the map-level properties
/// declared in `Map { ... }` blocks. Once parsed, a stylesheet is immutable
/// and can be shared across threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    rules: RuleList,
    map: Properties,
    /// Source file path (for hot-reload tracking).
    pub source_path: Option<PathBuf>,
}

impl Stylesheet {
    /// Create a stylesheet from parts.
    pub fn new(rules: RuleList, map: Properties) -> Self {
        Self {
            rules,
            map,
            source_path: None,
        }
    }

    /// Parse stylesheet text with the default parser.
    pub fn parse(text: &str) -> Result<Self> {
        Parser::new().parse(text)
    }

    /// Load a stylesheet from a file.
    ///
    /// The source path is stored for hot-reload support.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with(path, &Parser::new())
    }

    /// Load a stylesheet from a file with a configured parser.
    pub fn from_file_with(path: impl AsRef<Path>, parser: &Parser) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut sheet = parser.parse(&content)?;
        sheet.source_path = Some(path.to_path_buf());
        Ok(sheet)
    }

    /// The top-level rules, in source order.
    pub fn rules(&self) -> &RuleList {
        &self.rules
    }

    /// Map-level properties.
    pub fn map(&self) -> &Properties {
        &self.map
    }

    /// Append a top-level rule.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Get the number of top-level rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the stylesheet has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over top-level rules.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}
