//! Core contracts shared by the Cartograph crates.
//!
//! This crate defines the pieces that sit between a parsed stylesheet and the
//! data it is resolved against:
//!
//! - [`Literal`]: scalar values carried by properties, predicates and records
//! - [`Candidate`]: the record a stylesheet is resolved against, with
//!   [`Feature`] as the default implementation
//! - [`Predicate`] and [`PredicateEngine`]: the attribute-predicate contract
//!   consumed by the stylesheet parser
//! - [`logging`]: `tracing` target names used across the workspace

pub mod candidate;
pub mod literal;
pub mod logging;
pub mod predicate;

pub use candidate::{Candidate, Feature};
pub use literal::Literal;
pub use predicate::{EvalError, Predicate, PredicateEngine, PredicateError};
