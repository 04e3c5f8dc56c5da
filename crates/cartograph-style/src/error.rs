//! Error types for stylesheet parsing and loading.

use std::path::PathBuf;

use cartograph_core::PredicateError;

use crate::lexer::Token;

/// Result type alias for stylesheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling a stylesheet.
///
/// Parsing has no error recovery: the first error aborts the whole parse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed stylesheet syntax.
    #[error("syntax error at line {line}, column {column}: {message}{}", near(.token, .at_eof))]
    Syntax {
        message: String,
        /// Text of the offending token, if there was one.
        token: Option<String>,
        line: u32,
        column: u32,
        /// The input ended before the construct did.
        at_eof: bool,
    },

    /// The predicate engine rejected the text of a `[...]` filter.
    #[error("invalid filter '[{filter}]' at line {line}, column {column}")]
    PredicateParse {
        filter: String,
        line: u32,
        column: u32,
        #[source]
        source: PredicateError,
    },

    /// File I/O error.
    #[error("failed to read stylesheet '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hot-reload error.
    #[cfg(feature = "hot-reload")]
    #[error("hot-reload error: {0}")]
    HotReload(String),
}

fn near(token: &Option<String>, at_eof: &bool) -> String {
    match token {
        Some(t) => format!(" (near '{t}')"),
        None if *at_eof => " (at end of input)".to_string(),
        None => String::new(),
    }
}

impl Error {
    /// Create a syntax error at a token, or at end of input when `token` is
    /// `None`.
    pub fn syntax(message: impl Into<String>, token: Option<&Token>) -> Self {
        let (text, line, column) = match token {
            Some(t) => (Some(t.raw.clone()), t.location.line, t.location.column),
            None => (None, 0, 0),
        };
        Self::Syntax {
            message: message.into(),
            at_eof: text.is_none(),
            token: text,
            line,
            column,
        }
    }

    /// Create a syntax error at an explicit location.
    pub fn syntax_at(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            token: None,
            line,
            column,
            at_eof: false,
        }
    }

    /// Create a syntax error for input that ended early, positioned after
    /// the last token read.
    pub fn end_of_input(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            token: None,
            line,
            column,
            at_eof: true,
        }
    }

    /// Wrap a predicate engine failure.
    pub fn predicate(filter: impl Into<String>, token: &Token, source: PredicateError) -> Self {
        Self::PredicateParse {
            filter: filter.into(),
            line: token.location.line,
            column: token.location.column,
            source,
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for syntax errors.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
