//! Rules, rule lists and stylesheets.

mod list;
mod rule;
mod stylesheet;

pub use list::RuleList;
pub use rule::{Rule, RuleKind};
pub use stylesheet::Stylesheet;
