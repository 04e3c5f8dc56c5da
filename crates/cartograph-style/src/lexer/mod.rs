//! Token model and tokenizer contract.
//!
//! The parser consumes tokens through the [`Tokenizer`] trait, one token at
//! a time, with no lookahead beyond the current token. [`TokenStream`] is the
//! default implementation, filled by [`lex`] from stylesheet text.

mod css;

use std::fmt;

pub use css::lex;

/// Token categories seen by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Spaces, tabs and newlines.
    Whitespace,
    /// Structural punctuation: braces, brackets, parentheses, `:`, `;`, `,`.
    Delimiter,
    /// Bare word.
    Identifier,
    /// Numeric literal, possibly with a unit suffix.
    Number,
    /// Quoted string.
    String,
    /// `#` followed by a name, used for both colors and ids.
    ColorLiteral,
    /// Function name followed by `(`.
    FunctionStart,
    /// Any other single character, such as `.`, `*`, `=`, `<`.
    Operator,
}

/// Source position, 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Text exactly as written in the source.
    pub raw: String,
    /// Cleaned text: quotes removed from strings, `(` removed from function
    /// starts, whitespace collapsed to a single space.
    pub text: String,
    pub location: Location,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        raw: impl Into<String>,
        text: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            kind,
            raw: raw.into(),
            text: text.into(),
            location,
        }
    }

    /// Returns true if this is the delimiter `text`.
    pub fn is_delimiter(&self, text: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == text
    }

    /// Returns true if this is the operator `text`.
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == text
    }

    /// Returns true if this is an identifier equal to `word`, ignoring ASCII
    /// case.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }
}

/// A source of tokens consumed by the parser.
pub trait Tokenizer {
    /// The token under the cursor, or `None` at end of input.
    fn current(&self) -> Option<&Token>;

    /// Move the cursor to the next token.
    fn advance(&mut self);
}

/// An in-memory token sequence.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Lex `text` into a stream.
    pub fn from_source(text: &str, max_depth: usize) -> crate::Result<Self> {
        Ok(Self::new(lex(text, max_depth)?))
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }
}

impl Tokenizer for TokenStream {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_walks_tokens_in_order() {
        let mut stream = TokenStream::new(vec![
            Token::new(TokenKind::Identifier, "a", "a", Location::new(1, 1)),
            Token::new(TokenKind::Delimiter, ";", ";", Location::new(1, 2)),
        ]);
        assert!(stream.current().is_some_and(|t| t.kind == TokenKind::Identifier));
        stream.advance();
        assert!(stream.current().is_some_and(|t| t.is_delimiter(";")));
        stream.advance();
        assert!(stream.current().is_none());
        stream.advance();
        assert_eq!(stream.remaining(), 0);
    }
}
