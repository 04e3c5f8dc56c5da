//! Recursive-descent predicate parser over `cssparser` tokens.

use cartograph_core::{Literal, PredicateError};
use cssparser::{
    BasicParseErrorKind, ParseError as CssParseError, ParseErrorKind, Parser, ParserInput,
    ToCss, Token,
};

use crate::expr::{CompareOp, Comparison, Expr, Operand};

type PResult<'i, T> = std::result::Result<T, CssParseError<'i, ()>>;

impl Expr {
    /// Parse predicate text.
    pub fn parse(text: &str) -> Result<Expr, PredicateError> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        parser
            .parse_entirely(parse_or)
            .map_err(|e| to_predicate_error(text, e))
    }
}

fn parse_or<'i>(parser: &mut Parser<'i, '_>) -> PResult<'i, Expr> {
    let mut parts = vec![parse_and(parser)?];
    while parser.try_parse(|p| p.expect_ident_matching("or")).is_ok() {
        parts.push(parse_and(parser)?);
    }
    Ok(collapse(parts, Expr::Or))
}

fn parse_and<'i>(parser: &mut Parser<'i, '_>) -> PResult<'i, Expr> {
    let mut parts = vec![parse_not(parser)?];
    while parser.try_parse(|p| p.expect_ident_matching("and")).is_ok() {
        parts.push(parse_not(parser)?);
    }
    Ok(collapse(parts, Expr::And))
}

fn collapse(mut parts: Vec<Expr>, combine: fn(Vec<Expr>) -> Expr) -> Expr {
    match parts.pop() {
        Some(only) if parts.is_empty() => only,
        Some(last) => {
            parts.push(last);
            combine(parts)
        }
        None => combine(parts),
    }
}

fn parse_not<'i>(parser: &mut Parser<'i, '_>) -> PResult<'i, Expr> {
    if parser.try_parse(|p| p.expect_ident_matching("not")).is_ok() {
        return Ok(Expr::Not(Box::new(parse_not(parser)?)));
    }
    parse_primary(parser)
}

fn parse_primary<'i>(parser: &mut Parser<'i, '_>) -> PResult<'i, Expr> {
    if parser.try_parse(|p| p.expect_parenthesis_block()).is_ok() {
        return parser.parse_nested_block(parse_or);
    }

    let left = parse_operand(parser)?;

    if parser.try_parse(|p| p.expect_ident_matching("is")).is_ok() {
        let negated = parser.try_parse(|p| p.expect_ident_matching("not")).is_ok();
        parser.expect_ident_matching("null")?;
        return Ok(Expr::IsNull {
            operand: left,
            negated,
        });
    }

    let op = parse_op(parser)?;
    let right = parse_operand(parser)?;
    Ok(Expr::Compare(Comparison { left, op, right }))
}

fn parse_operand<'i>(parser: &mut Parser<'i, '_>) -> PResult<'i, Operand> {
    parser.skip_whitespace();
    let start = parser.position();
    let location = parser.current_source_location();
    let token = parser.next()?.clone();

    match token {
        Token::Ident(ref name) if name.eq_ignore_ascii_case("true") => {
            Ok(Operand::Literal(Literal::Boolean(true)))
        }
        Token::Ident(ref name) if name.eq_ignore_ascii_case("false") => {
            Ok(Operand::Literal(Literal::Boolean(false)))
        }
        Token::Ident(name) => Ok(Operand::Attribute(name.to_string())),
        Token::QuotedString(value) => Ok(Operand::Literal(Literal::String(value.to_string()))),
        Token::Number { .. } => {
            // Re-read the source text so `0.1` stays `0.1` rather than an f32
            // approximation.
            let text = parser.slice_from(start).trim();
            match Literal::parse_number(text) {
                Some(lit) => Ok(Operand::Literal(lit)),
                None => Err(location.new_unexpected_token_error(token)),
            }
        }
        Token::Hash(ref value) | Token::IDHash(ref value) => {
            Ok(Operand::Literal(Literal::Color(format!("#{value}"))))
        }
        other => Err(location.new_unexpected_token_error(other)),
    }
}

fn parse_op<'i>(parser: &mut Parser<'i, '_>) -> PResult<'i, CompareOp> {
    let location = parser.current_source_location();
    let token = parser.next()?.clone();

    let op = match token {
        Token::Delim('=') => CompareOp::Eq,
        Token::Delim('!') => {
            if followed_by(parser, '=') {
                CompareOp::Ne
            } else {
                return Err(location.new_unexpected_token_error(token));
            }
        }
        Token::Delim('<') => {
            if followed_by(parser, '=') {
                CompareOp::Le
            } else if followed_by(parser, '>') {
                CompareOp::Ne
            } else {
                CompareOp::Lt
            }
        }
        Token::Delim('>') => {
            if followed_by(parser, '=') {
                CompareOp::Ge
            } else {
                CompareOp::Gt
            }
        }
        other => return Err(location.new_unexpected_token_error(other)),
    };
    Ok(op)
}

/// Consume `delim` only when it directly follows the previous token.
fn followed_by(parser: &mut Parser<'_, '_>, delim: char) -> bool {
    parser
        .try_parse(|p| match p.next_including_whitespace() {
            Ok(&Token::Delim(c)) if c == delim => Ok(()),
            _ => Err(()),
        })
        .is_ok()
}

fn to_predicate_error(text: &str, error: CssParseError<'_, ()>) -> PredicateError {
    match error.kind {
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => PredicateError::UnexpectedEnd {
            text: text.to_string(),
        },
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            PredicateError::unexpected_token(token.to_css_string(), text)
        }
        ParseErrorKind::Basic(other) => PredicateError::invalid(text, format!("{other:?}")),
        ParseErrorKind::Custom(()) => PredicateError::invalid(text, "malformed expression"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str) -> Operand {
        Operand::Attribute(name.to_string())
    }

    #[test]
    fn parse_comparison() {
        let expr = Expr::parse("foo < 3").unwrap();
        assert_eq!(
            expr,
            Expr::Compare(Comparison {
                left: attr("foo"),
                op: CompareOp::Lt,
                right: Operand::Literal(Literal::Integer(3)),
            })
        );
    }

    #[test]
    fn parse_operators() {
        let cases = [
            ("a=1", CompareOp::Eq),
            ("a != 1", CompareOp::Ne),
            ("a <> 1", CompareOp::Ne),
            ("a<1", CompareOp::Lt),
            ("a <= 1", CompareOp::Le),
            ("a>1", CompareOp::Gt),
            ("a >= 1", CompareOp::Ge),
        ];
        for (text, op) in cases {
            match Expr::parse(text).unwrap() {
                Expr::Compare(cmp) => assert_eq!(cmp.op, op, "{text}"),
                other => panic!("unexpected {other:?} for {text}"),
            }
        }
    }

    #[test]
    fn parse_precedence() {
        let expr = Expr::parse("a = 1 OR b = 2 AND c = 3").unwrap();
        match expr {
            Expr::Or(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[1], Expr::And(_)));
            }
            other => panic!("expected OR, got {other:?}"),
        }
    }

    #[test]
    fn parse_parentheses_and_not() {
        let expr = Expr::parse("NOT (a = 1 or b = 2)").unwrap();
        match expr {
            Expr::Not(inner) => assert!(matches!(*inner, Expr::Or(_))),
            other => panic!("expected NOT, got {other:?}"),
        }
    }

    #[test]
    fn parse_literals() {
        let expr = Expr::parse("bam = 'xyz'").unwrap();
        assert_eq!(expr.to_string(), "bam = 'xyz'");

        let expr = Expr::parse("ratio >= 0.1").unwrap();
        assert_eq!(expr.to_string(), "ratio >= 0.1");

        let expr = Expr::parse("capital = TRUE").unwrap();
        assert_eq!(expr.to_string(), "capital = TRUE");
    }

    #[test]
    fn parse_is_null() {
        assert_eq!(
            Expr::parse("name IS NOT NULL").unwrap(),
            Expr::IsNull {
                operand: attr("name"),
                negated: true
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            Expr::parse(""),
            Err(PredicateError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Expr::parse("a <"),
            Err(PredicateError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Expr::parse("a = 1 b"),
            Err(PredicateError::UnexpectedToken { .. })
        ));
        assert!(Expr::parse("a ! 1").is_err());
    }
}
