//! Logging conventions for Cartograph.
//!
//! All crates in the workspace log through the `tracing` facade and never
//! install a subscriber themselves. To see logs, install one in the host
//! application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("cartograph_style::parser=trace")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Token stream production.
    pub const LEXER: &str = "cartograph_style::lexer";
    /// Parser state machine transitions and rule construction.
    pub const PARSER: &str = "cartograph_style::parser";
    /// Selection, matching, flattening and cascade.
    pub const CASCADE: &str = "cartograph_style::cascade";
    /// Predicate parsing and evaluation.
    pub const FILTER: &str = "cartograph_filter";
    /// Stylesheet file watching.
    pub const RELOAD: &str = "cartograph_style::hot_reload";
}
