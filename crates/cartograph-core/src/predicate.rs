//! Attribute-predicate contracts.
//!
//! The stylesheet parser does not know the grammar of the text between
//! `[` and `]`. It hands that text to a [`PredicateEngine`] and stores the
//! resulting [`Predicate`] on the selector.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::Candidate;

/// A boolean expression over candidate attributes.
///
/// Implementations must be immutable once built: parsed stylesheets are
/// shared read-only between rendering threads.
pub trait Predicate: fmt::Debug + fmt::Display + Send + Sync {
    /// Evaluate against a candidate.
    ///
    /// Errors (missing attributes, incomparable values) are reported rather
    /// than folded into `false` so callers can decide how to log them.
    fn evaluate(&self, candidate: &dyn Candidate) -> Result<bool, EvalError>;

    /// Add the names of all attributes the predicate reads to `fields`.
    fn collect_fields(&self, fields: &mut BTreeSet<String>);
}

/// Parses predicate text into [`Predicate`]s.
pub trait PredicateEngine: fmt::Debug + Send + Sync {
    /// Parse the text found between a pair of square brackets.
    fn parse(&self, text: &str) -> Result<Arc<dyn Predicate>, PredicateError>;
}

/// Errors produced while parsing predicate text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    /// The text ended before the expression was complete.
    #[error("unexpected end of predicate '{text}'")]
    UnexpectedEnd { text: String },

    /// A token that does not fit the grammar at its position.
    #[error("unexpected token '{token}' in predicate '{text}'")]
    UnexpectedToken { token: String, text: String },

    /// Any other grammar violation.
    #[error("invalid predicate '{text}': {message}")]
    Invalid { text: String, message: String },
}

impl PredicateError {
    /// Create an unexpected-token error.
    pub fn unexpected_token(token: impl Into<String>, text: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            token: token.into(),
            text: text.into(),
        }
    }

    /// Create a generic grammar error.
    pub fn invalid(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            text: text.into(),
            message: message.into(),
        }
    }
}

/// Errors produced while evaluating a predicate against a candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The predicate reads an attribute the candidate does not have.
    #[error("attribute '{0}' is not present on the candidate")]
    MissingAttribute(String),

    /// An ordering comparison between values with no common ordering.
    #[error("cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },
}
