//! The state-stack driver.
//!
//! The driver owns three stacks. The control stack holds [`ParserState`]s;
//! the handler for the top state runs until it asks to push a child state
//! or pop back to its parent. The context stack holds [`Frame`]s: pending
//! selectors, declarations, filter text and one-token markers. The fragment
//! stack holds the rules and `Map` blocks whose braces are still open.
//!
//! A popped handler leaves the current token in place, so the parent resumes
//! exactly where the child stopped. There is no backtracking.

use cartograph_core::logging::targets;
use cartograph_core::{Literal, PredicateEngine};

use crate::config::{DuplicateKeys, ParserConfig};
use crate::functions::FunctionRegistry;
use crate::lexer::{Location, Token, TokenKind, Tokenizer};
use crate::parser::CoercionWarning;
use crate::parser::state::{Fragment, Frame, ParserState, PendingFunction, PendingProperty, Transition};
use crate::resolve::cascade_properties;
use crate::rules::{Rule, RuleList, Stylesheet};
use crate::selector::Selector;
use crate::types::{Argument, Properties, Value};
use crate::{Error, Result};

pub(crate) struct Driver<'a> {
    tokens: &'a mut dyn Tokenizer,
    pub(super) engine: &'a dyn PredicateEngine,
    pub(super) functions: &'a FunctionRegistry,
    pub(super) config: ParserConfig,
    control: Vec<ParserState>,
    pub(super) context: Vec<Frame>,
    pub(super) fragments: Vec<Fragment>,
    rules: Vec<Rule>,
    map: Properties,
    warnings: Vec<CoercionWarning>,
    last: Location,
}

impl<'a> Driver<'a> {
    pub(crate) fn new(
        tokens: &'a mut dyn Tokenizer,
        engine: &'a dyn PredicateEngine,
        functions: &'a FunctionRegistry,
        config: ParserConfig,
    ) -> Self {
        Self {
            tokens,
            engine,
            functions,
            config,
            control: Vec::new(),
            context: Vec::new(),
            fragments: Vec::new(),
            rules: Vec::new(),
            map: Properties::new(),
            warnings: Vec::new(),
            last: Location::new(1, 1),
        }
    }

    /// Run handlers until the control stack is empty.
    pub(crate) fn run(mut self) -> Result<(Stylesheet, Vec<CoercionWarning>)> {
        self.control.push(ParserState::Root);

        while let Some(&state) = self.control.last() {
            let transition = match state {
                ParserState::Root => self.root()?,
                ParserState::Rule => self.rule()?,
                ParserState::Property => self.property()?,
                ParserState::Filter => self.filter()?,
                ParserState::Function => self.function()?,
                ParserState::Attribute => self.attribute()?,
                ParserState::Map => self.map_block()?,
            };
            match transition {
                Transition::Push(next) => {
                    tracing::trace!(
                        target: targets::PARSER,
                        from = %state,
                        to = %next,
                        depth = self.control.len(),
                        "push"
                    );
                    self.control.push(next);
                }
                Transition::Pop => {
                    self.control.pop();
                    tracing::trace!(
                        target: targets::PARSER,
                        from = %state,
                        depth = self.control.len(),
                        "pop"
                    );
                }
            }
        }

        if let Some(token) = self.tokens.current() {
            return Err(Error::syntax("unexpected input after the last rule", Some(token)));
        }
        if !self.fragments.is_empty() || !self.context.is_empty() {
            return Err(self.eof("unexpected end of input inside a block"));
        }

        Ok((
            Stylesheet::new(RuleList::new(self.rules), self.map),
            self.warnings,
        ))
    }

    /// Clone the current token, or `None` at end of input.
    pub(super) fn peek(&mut self) -> Option<Token> {
        let token = self.tokens.current()?.clone();
        self.last = token.location;
        Some(token)
    }

    pub(super) fn advance(&mut self) {
        self.tokens.advance();
    }

    pub(super) fn skip_whitespace(&mut self) {
        while self.tokens.current().is_some_and(Token::is_whitespace) {
            self.tokens.advance();
        }
    }

    /// A syntax error at end of input, positioned after the last token seen.
    pub(super) fn eof(&self, message: &str) -> Error {
        Error::end_of_input(message, self.last.line, self.last.column)
    }

    /// Read a number token, keeping its text when it does not parse.
    ///
    /// Pixels are the implied unit, so a `px` suffix is dropped.
    pub(super) fn number(&mut self, token: &Token) -> Literal {
        let digits = token.text.strip_suffix("px").unwrap_or(&token.text);
        match Literal::parse_number(digits) {
            Some(literal) => literal,
            None => {
                let warning = CoercionWarning::new(&token.text, token.location);
                tracing::warn!(target: targets::PARSER, "{warning}");
                self.warnings.push(warning);
                Literal::String(token.text.clone())
            }
        }
    }

    /// The selector currently being built.
    pub(super) fn current_selector(&mut self, token: &Token) -> Result<&mut Selector> {
        self.context
            .iter_mut()
            .rev()
            .find_map(|frame| match frame {
                Frame::Selectors(selectors) => selectors.last_mut(),
                _ => None,
            })
            .ok_or_else(|| Error::syntax("expected a selector", Some(token)))
    }

    pub(super) fn pending_property(&mut self, token: &Token) -> Result<&mut PendingProperty> {
        match self.context.last_mut() {
            Some(Frame::Property(pending)) => Ok(pending),
            _ => Err(Error::syntax("value outside of a declaration", Some(token))),
        }
    }

    pub(super) fn pending_function(&mut self, token: &Token) -> Result<&mut PendingFunction> {
        match self.context.last_mut() {
            Some(Frame::Function(pending)) => Ok(pending),
            _ => Err(Error::syntax("argument outside of a function call", Some(token))),
        }
    }

    /// Append a value to the declaration being built.
    pub(super) fn push_value(&mut self, token: &Token, value: Value) -> Result<()> {
        let pending = self.pending_property(token)?;
        if !pending.separated {
            return Err(Error::syntax("expected ':' after property name", Some(token)));
        }
        pending.values.push(value);
        Ok(())
    }

    /// Append an argument to the function call being built.
    pub(super) fn push_arg(&mut self, token: &Token, arg: Argument) -> Result<()> {
        let pending = self.pending_function(token)?;
        if !pending.expect_arg {
            return Err(Error::syntax("expected ',' between arguments", Some(token)));
        }
        pending.args.push(arg);
        pending.expect_arg = false;
        Ok(())
    }

    /// Commit the declaration on top of the context stack into the open
    /// rule or `Map` block.
    pub(super) fn commit_property(&mut self, token: &Token) -> Result<()> {
        let Some(Frame::Property(pending)) = self.context.pop() else {
            return Err(Error::syntax("expected a declaration", Some(token)));
        };
        let Some(key) = pending.key else {
            return Err(Error::syntax("expected a property name", Some(token)));
        };
        if !pending.separated {
            return Err(Error::syntax(
                format!("expected ':' after '{key}'"),
                Some(token),
            ));
        }
        let value = combine(&key, pending.values, token)?;

        let policy = self.config.duplicate_keys;
        let Some(fragment) = self.fragments.last_mut() else {
            return Err(Error::syntax("declaration outside of a block", Some(token)));
        };
        let properties = fragment.properties_mut();
        match policy {
            DuplicateKeys::Overwrite => properties.set(key, value),
            DuplicateKeys::Accumulate => properties.append(key, value),
        }
        Ok(())
    }

    /// Close a top-level rule or `Map` block at `}`.
    pub(super) fn close_block(&mut self, token: &Token) -> Result<()> {
        match (self.context.pop(), self.fragments.pop()) {
            (Some(Frame::RuleBody), Some(Fragment::Rule(rule))) => {
                let selectors: Vec<String> = rule.selectors.iter().map(|s| s.to_string()).collect();
                tracing::debug!(
                    target: targets::PARSER,
                    rule = %selectors.join(", "),
                    properties = rule.properties.len(),
                    nested = rule.nested.len(),
                    "committed rule"
                );
                self.rules.push(rule);
            }
            (Some(Frame::MapBlock), Some(Fragment::Map(properties))) => {
                tracing::debug!(
                    target: targets::PARSER,
                    properties = properties.len(),
                    "committed Map block"
                );
                match self.config.duplicate_keys {
                    DuplicateKeys::Overwrite => cascade_properties(&mut self.map, &properties),
                    DuplicateKeys::Accumulate => {
                        for (key, value) in &properties {
                            self.map.append(key, value.clone());
                        }
                    }
                }
            }
            _ => return Err(Error::syntax("unmatched '}'", Some(token))),
        }
        Ok(())
    }
}

/// Build one value from the tokens of a declaration.
///
/// Several numbers make a [`Value::List`]; several scalars of any other mix
/// join into one space-separated string. Attribute references and function
/// calls must stand alone.
fn combine(key: &str, mut values: Vec<Value>, token: &Token) -> Result<Value> {
    match values.len() {
        0 => Err(Error::syntax(format!("missing value for '{key}'"), Some(token))),
        1 => Ok(values.swap_remove(0)),
        _ => {
            let numbers = values
                .iter()
                .map(|value| match value {
                    Value::Literal(lit) if lit.is_numeric() => lit.as_f64(),
                    _ => None,
                })
                .collect::<Option<Vec<f64>>>();
            if let Some(numbers) = numbers {
                return Ok(Value::List(numbers));
            }
            values
                .iter()
                .map(|value| value.as_literal().map(Literal::to_string))
                .collect::<Option<Vec<_>>>()
                .map(|words| Value::string(words.join(" ")))
                .ok_or_else(|| {
                    Error::syntax(
                        format!("'{key}' mixes an attribute reference or function call with other values"),
                        Some(token),
                    )
                })
        }
    }
}

/// Whether a token can begin a selector.
pub(super) fn starts_selector(token: &Token) -> bool {
    match token.kind {
        TokenKind::ColorLiteral | TokenKind::Identifier => true,
        TokenKind::Operator => token.text == "." || token.text == "*",
        TokenKind::Delimiter => token.text == "[" || token.text == ":",
        _ => false,
    }
}

/// A syntax error naming the kind of an unexpected token.
pub(super) fn unexpected(token: &Token, place: &str) -> Error {
    let kind = match token.kind {
        TokenKind::Whitespace => "whitespace",
        TokenKind::Delimiter => "delimiter",
        TokenKind::Identifier => "identifier",
        TokenKind::Number => "number",
        TokenKind::String => "string",
        TokenKind::ColorLiteral => "color literal",
        TokenKind::FunctionStart => "function call",
        TokenKind::Operator => "operator",
    };
    Error::syntax(format!("unexpected {kind} {place}"), Some(token))
}
