//! Parser configuration.

/// What to do when a rule body assigns the same property key twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DuplicateKeys {
    /// The last assignment wins.
    #[default]
    Overwrite,
    /// Repeated assignments accumulate into a [`Value::Composite`].
    ///
    /// [`Value::Composite`]: crate::types::Value::Composite
    Accumulate,
}

/// Options controlling how stylesheets are parsed.
///
/// # Example
///
/// ```
/// use cartograph_style::config::{DuplicateKeys, ParserConfig};
///
/// let config = ParserConfig::default()
///     .with_max_depth(16)
///     .with_duplicate_keys(DuplicateKeys::Accumulate);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum block nesting depth, counting every `{`, `[` and `(`.
    pub max_depth: usize,
    /// Duplicate property key policy.
    pub duplicate_keys: DuplicateKeys,
}

impl ParserConfig {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Create the default configuration.
    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeys::Overwrite,
        }
    }

    /// Configuration that accumulates repeated keys instead of overwriting.
    pub fn accumulating() -> Self {
        Self::new().with_duplicate_keys(DuplicateKeys::Accumulate)
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the duplicate key policy.
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}
