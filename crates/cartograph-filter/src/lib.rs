//! CQL-style attribute predicates for Cartograph.
//!
//! This crate provides the default [`PredicateEngine`] used by the stylesheet
//! parser for the text inside selector brackets (`#roads[kind = 'major']`).
//! The supported grammar is a small subset of OGC CQL:
//!
//! ```text
//! expr       := and ( OR and )*
//! and        := not ( AND not )*
//! not        := NOT not | primary
//! primary    := '(' expr ')' | operand IS [NOT] NULL | operand op operand
//! op         := = | != | <> | < | <= | > | >=
//! operand    := attribute | number | 'string' | "string" | TRUE | FALSE | #color
//! ```
//!
//! Keywords are case-insensitive. Any other bare identifier is an attribute
//! name.
//!
//! # Example
//!
//! ```
//! use cartograph_core::{Feature, PredicateEngine};
//! use cartograph_filter::CqlEngine;
//!
//! let predicate = CqlEngine::new().parse("pop > 100 AND pop < 1000").unwrap();
//! let town = Feature::new().with("pop", 500);
//! assert_eq!(predicate.evaluate(&town), Ok(true));
//! ```

mod expr;
mod parser;

use std::sync::Arc;

use cartograph_core::logging::targets;
use cartograph_core::{Predicate, PredicateEngine, PredicateError};

pub use expr::{CompareOp, Comparison, Expr, Operand};

/// The default predicate engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CqlEngine;

impl CqlEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self
    }
}

impl PredicateEngine for CqlEngine {
    fn parse(&self, text: &str) -> Result<Arc<dyn Predicate>, PredicateError> {
        let expr = Expr::parse(text)?;
        tracing::trace!(target: targets::FILTER, %expr, "parsed predicate");
        Ok(Arc::new(expr))
    }
}
