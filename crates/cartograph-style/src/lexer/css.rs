//! Token stream production on top of the `cssparser` tokenizer.
//!
//! `cssparser` hands out blocks (`{...}`, `[...]`, `(...)`, `name(...)`) as
//! single tokens with nested parsers. The stylesheet parser wants a flat
//! stream, so blocks are unrolled here into an opening delimiter, their
//! contents, and a closing delimiter. A block left open at end of input gets
//! no closing delimiter, which the parser then reports as unterminated.

use cartograph_core::logging::targets;
use cssparser::{
    ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, SourceLocation,
    Token as CssToken,
};

use super::{Location, Token, TokenKind};
use crate::{Error, Result};

type LexResult<'i, T> = std::result::Result<T, CssParseError<'i, Error>>;

/// Lex stylesheet text into a flat token list.
///
/// Comments are dropped. Block nesting deeper than `max_depth` is rejected.
pub fn lex(text: &str, max_depth: usize) -> Result<Vec<Token>> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut lexer = Lexer {
        tokens: Vec::new(),
        max_depth,
    };

    lexer.block_contents(&mut parser, 0).map_err(|e| match e.kind {
        ParseErrorKind::Custom(err) => err,
        ParseErrorKind::Basic(kind) => {
            let at = location(e.location);
            Error::syntax_at(format!("unreadable input: {kind:?}"), at.line, at.column)
        }
    })?;

    tracing::trace!(target: targets::LEXER, count = lexer.tokens.len(), "lexed stylesheet");
    Ok(lexer.tokens)
}

fn location(loc: SourceLocation) -> Location {
    Location::new(loc.line + 1, loc.column)
}

struct Lexer {
    tokens: Vec<Token>,
    max_depth: usize,
}

impl Lexer {
    fn push(&mut self, kind: TokenKind, raw: &str, text: &str, at: Location) {
        self.tokens.push(Token::new(kind, raw, text, at));
    }

    fn block_contents<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        depth: usize,
    ) -> LexResult<'i, ()> {
        loop {
            let start = parser.position();
            let at = location(parser.current_source_location());
            let token = match parser.next_including_whitespace() {
                Ok(token) => token.clone(),
                // End of input, or end of the enclosing block.
                Err(_) => return Ok(()),
            };
            let raw = parser.slice_from(start);

            match token {
                CssToken::WhiteSpace(_) => self.push(TokenKind::Whitespace, raw, " ", at),
                CssToken::Ident(name) => self.push(TokenKind::Identifier, raw, &name, at),
                CssToken::Hash(name) | CssToken::IDHash(name) => {
                    self.push(TokenKind::ColorLiteral, raw, &format!("#{name}"), at)
                }
                CssToken::Number { .. }
                | CssToken::Percentage { .. }
                | CssToken::Dimension { .. } => self.push(TokenKind::Number, raw, raw, at),
                CssToken::QuotedString(value) => self.push(TokenKind::String, raw, &value, at),
                CssToken::UnquotedUrl(value) => self.push(TokenKind::String, raw, &value, at),
                CssToken::BadString(_) => {
                    return Err(parser.new_custom_error(Error::syntax_at(
                        "unterminated string",
                        at.line,
                        at.column,
                    )));
                }
                CssToken::BadUrl(_) => {
                    return Err(parser.new_custom_error(Error::syntax_at(
                        "malformed url",
                        at.line,
                        at.column,
                    )));
                }
                CssToken::Colon => self.push(TokenKind::Delimiter, raw, ":", at),
                CssToken::Semicolon => self.push(TokenKind::Delimiter, raw, ";", at),
                CssToken::Comma => self.push(TokenKind::Delimiter, raw, ",", at),
                CssToken::CloseCurlyBracket
                | CssToken::CloseSquareBracket
                | CssToken::CloseParenthesis => self.push(TokenKind::Delimiter, raw, raw, at),
                CssToken::CurlyBracketBlock => {
                    self.push(TokenKind::Delimiter, raw, "{", at);
                    self.nested(parser, depth, at, '}')?;
                }
                CssToken::SquareBracketBlock => {
                    self.push(TokenKind::Delimiter, raw, "[", at);
                    self.nested(parser, depth, at, ']')?;
                }
                CssToken::ParenthesisBlock => {
                    self.push(TokenKind::Delimiter, raw, "(", at);
                    self.nested(parser, depth, at, ')')?;
                }
                CssToken::Function(name) => {
                    self.push(TokenKind::FunctionStart, raw, &name, at);
                    self.nested(parser, depth, at, ')')?;
                }
                CssToken::Comment(_) => {}
                CssToken::Delim(c) => {
                    self.push(TokenKind::Operator, raw, c.encode_utf8(&mut [0; 4]), at)
                }
                // `~=`, `|=`, `@name`, `<!--` and friends carry no structure for
                // the parser; keep them whole so errors show what was written.
                _ => self.push(TokenKind::Operator, raw, raw, at),
            }
        }
    }

    fn nested<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        depth: usize,
        at: Location,
        close: char,
    ) -> LexResult<'i, ()> {
        if depth >= self.max_depth {
            return Err(parser.new_custom_error(Error::syntax_at(
                format!("nesting deeper than {} levels", self.max_depth),
                at.line,
                at.column,
            )));
        }

        let (inner_end, close_at) = parser.parse_nested_block(|p| {
            self.block_contents(p, depth + 1)?;
            Ok((p.position(), location(p.current_source_location())))
        })?;

        // The outer cursor only moves past `inner_end` if the block was closed.
        if parser.position().byte_index() > inner_end.byte_index() {
            let mut buf = [0; 4];
            let text = close.encode_utf8(&mut buf);
            self.push(TokenKind::Delimiter, text, text, close_at);
        } else {
            tracing::trace!(target: targets::LEXER, %at, "block left open at end of input");
        }
        Ok(())
    }
}
