//! Non-fatal parse diagnostics.

use std::fmt;

use crate::lexer::Location;

/// A numeric-looking token that could not be read as a number.
///
/// The value is kept as a string literal with the token's text, so
/// `line-width: 2px` yields the string `"2px"`. Warnings never abort a
/// parse; they are logged and returned from
/// [`Parser::parse_with_diagnostics`](super::Parser::parse_with_diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionWarning {
    /// The token text that was kept as a string.
    pub text: String,
    pub location: Location,
}

impl CoercionWarning {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' at {} is not a number, keeping it as text",
            self.text, self.location
        )
    }
}
