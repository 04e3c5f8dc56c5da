//! Selectors, filters and selector matching.

mod filter;
mod matcher;
mod types;

pub use filter::Filter;
pub use matcher::SelectorMatcher;
pub use types::{Selector, SelectorKind};
