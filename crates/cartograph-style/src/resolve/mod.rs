//! Cascade resolution.
//!
//! Everything here is a pure function of a parsed stylesheet: operations
//! never mutate their input and always allocate fresh output, so a single
//! stylesheet can be resolved from many threads at once.

mod cascade;
mod engine;
mod flatten;

pub use cascade::{ZGroup, cascade_properties, collapse, zgroup};
pub use engine::{StyleResolver, StylePass};
pub use flatten::flatten;
