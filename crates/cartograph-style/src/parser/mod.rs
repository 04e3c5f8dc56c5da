//! Stylesheet parsing.
//!
//! The parser is a small state machine driven by an explicit stack of
//! [states](state::ParserState). Each state has a handler that reads tokens
//! until it needs to descend into a child construct or has finished its own.
//! Parsing stops at the first error; there is no recovery.
//!
//! # Example
//!
//! ```
//! use cartograph_style::Parser;
//! use cartograph_style::config::DuplicateKeys;
//!
//! let parser = Parser::builder()
//!     .duplicate_keys(DuplicateKeys::Accumulate)
//!     .build();
//! let sheet = parser.parse("#roads { line-color: #f00; line-color: #0f0; }").unwrap();
//! assert_eq!(
//!     sheet.rules()[0].get("line-color").map(|v| v.to_string()),
//!     Some("#f00, #0f0".to_string())
//! );
//! ```

mod diagnostics;
mod driver;
mod handlers;
mod state;

use std::sync::Arc;

use cartograph_core::PredicateEngine;
use cartograph_core::logging::targets;
use cartograph_filter::CqlEngine;

use crate::Result;
use crate::config::{DuplicateKeys, ParserConfig};
use crate::functions::{FunctionFactory, FunctionRegistry};
use crate::lexer::{TokenStream, Tokenizer};
use crate::rules::Stylesheet;

pub use diagnostics::CoercionWarning;

use driver::Driver;

/// A parsed stylesheet together with its non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub stylesheet: Stylesheet,
    pub warnings: Vec<CoercionWarning>,
}

/// Stylesheet parser.
///
/// A parser holds its configuration, the predicate engine used for
/// `[...]` filters and the function registry used for function-call values.
/// It keeps no state between calls and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    engine: Arc<dyn PredicateEngine>,
    functions: FunctionRegistry,
}

impl Parser {
    /// A parser with default configuration, CQL filters and the built-in
    /// functions.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// A default parser with the given configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parse stylesheet text.
    ///
    /// Coercion warnings are logged and dropped; use
    /// [`parse_with_diagnostics`](Self::parse_with_diagnostics) to keep them.
    pub fn parse(&self, text: &str) -> Result<Stylesheet> {
        self.parse_with_diagnostics(text).map(|parsed| parsed.stylesheet)
    }

    /// Parse stylesheet text, returning coercion warnings alongside.
    pub fn parse_with_diagnostics(&self, text: &str) -> Result<Parsed> {
        let mut tokens = TokenStream::from_source(text, self.config.max_depth)?;
        self.parse_tokens(&mut tokens)
    }

    /// Parse from any token source.
    pub fn parse_tokens(&self, tokens: &mut dyn Tokenizer) -> Result<Parsed> {
        let driver = Driver::new(tokens, self.engine.as_ref(), &self.functions, self.config);
        let (stylesheet, warnings) = driver.run()?;

        tracing::debug!(
            target: targets::PARSER,
            rules = stylesheet.len(),
            map_properties = stylesheet.map().len(),
            warnings = warnings.len(),
            "parsed stylesheet"
        );
        Ok(Parsed {
            stylesheet,
            warnings,
        })
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Parser`].
#[derive(Debug, Default)]
pub struct ParserBuilder {
    config: ParserConfig,
    engine: Option<Arc<dyn PredicateEngine>>,
    functions: Option<FunctionRegistry>,
}

impl ParserBuilder {
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the duplicate property key policy.
    pub fn duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.config.duplicate_keys = policy;
        self
    }

    /// Use a different predicate engine for `[...]` filters.
    pub fn predicate_engine(mut self, engine: Arc<dyn PredicateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Replace the function registry.
    pub fn functions(mut self, registry: FunctionRegistry) -> Self {
        self.functions = Some(registry);
        self
    }

    /// Register one function on top of the current registry.
    pub fn function(mut self, name: &str, factory: impl FunctionFactory + 'static) -> Self {
        self.functions
            .get_or_insert_with(FunctionRegistry::builtin)
            .register(name, factory);
        self
    }

    pub fn build(self) -> Parser {
        Parser {
            config: self.config,
            engine: self.engine.unwrap_or_else(|| Arc::new(CqlEngine::new())),
            functions: self.functions.unwrap_or_default(),
        }
    }
}
