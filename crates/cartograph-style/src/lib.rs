//! CartoCSS-style stylesheet compiler and cascade engine for Cartograph.
//!
//! This crate turns stylesheet text into a rule tree and resolves, per
//! candidate record, which declarations apply:
//!
//! - **Parsing**: a state-machine parser over a CSS-like token stream, with
//!   `[...]` filters handed to a pluggable predicate engine
//! - **Selectors**: layer names, `#id`, `.class`, `*`, filters and
//!   `::attachment`
//! - **Cascade**: selection, filter matching, nesting flattening, collapse
//!   with override semantics and grouping by attachment
//! - **Functions**: an open registry of function-call values
//! - **Hot Reload**: reload stylesheets from disk while rendering
//!
//! # Example
//!
//! ```
//! use cartograph_core::Feature;
//! use cartograph_style::prelude::*;
//!
//! let sheet = Stylesheet::parse(
//!     "#roads { line-width: 1; [type = 'motorway'] { line-width: 4; } }",
//! )
//! .unwrap();
//!
//! let mut resolver = StyleResolver::new();
//! resolver.add_stylesheet(sheet);
//!
//! let road = Feature::new().with("type", "motorway");
//! let passes = resolver.resolve(Some("roads"), &road);
//! assert_eq!(
//!     passes[0].properties.get("line-width").and_then(|v| v.as_f64()),
//!     Some(4.0)
//! );
//! ```

pub mod config;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod resolve;
pub mod rules;
pub mod selector;
pub mod types;

#[cfg(feature = "hot-reload")]
pub mod hot_reload;

mod error;

pub use error::{Error, Result};
pub use parser::{Parser, ParserBuilder};
pub use rules::{Rule, RuleList, Stylesheet};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::config::{DuplicateKeys, ParserConfig};
    pub use crate::functions::{FunctionError, FunctionFactory, FunctionRegistry};
    pub use crate::parser::{CoercionWarning, Parsed, Parser, ParserBuilder};
    pub use crate::resolve::{StylePass, StyleResolver, ZGroup};
    pub use crate::rules::{Rule, RuleKind, RuleList, Stylesheet};
    pub use crate::selector::{Filter, Selector, SelectorKind, SelectorMatcher};
    pub use crate::types::{Argument, FunctionCall, Properties, Rgba, Value};

    #[cfg(feature = "hot-reload")]
    pub use crate::hot_reload::StylesheetWatcher;
}
