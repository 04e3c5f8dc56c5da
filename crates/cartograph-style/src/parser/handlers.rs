//! One handler per parser state.
//!
//! Each handler consumes tokens until it either needs a child state
//! ([`Transition::Push`], current token left in place for the child) or has
//! finished its construct ([`Transition::Pop`]).

use cartograph_core::Literal;
use cartograph_core::logging::targets;

use crate::lexer::{Token, TokenKind};
use crate::parser::driver::{Driver, starts_selector, unexpected};
use crate::parser::state::{Fragment, Frame, ParserState, PendingFunction, PendingProperty, Transition};
use crate::rules::Rule;
use crate::selector::{Filter, Selector};
use crate::types::{Argument, Properties, Value};
use crate::{Error, Result};

impl Driver<'_> {
    /// Top level: opens rules and `Map` blocks, and closes them at `}`.
    pub(super) fn root(&mut self) -> Result<Transition> {
        loop {
            let Some(token) = self.peek() else {
                return Ok(Transition::Pop);
            };
            match token.kind {
                TokenKind::Whitespace => self.advance(),
                TokenKind::Delimiter if token.text == "}" => {
                    self.close_block(&token)?;
                    self.advance();
                }
                TokenKind::Identifier if token.is_keyword("map") => {
                    return Ok(Transition::Push(ParserState::Map));
                }
                _ if starts_selector(&token) => {
                    self.context.push(Frame::Selectors(vec![Selector::new()]));
                    return Ok(Transition::Push(ParserState::Rule));
                }
                _ => return Err(unexpected(&token, "at top level")),
            }
        }
    }

    /// A selector list, then the body it opens.
    ///
    /// A top-level rule pops at its closing `}` without consuming it, so the
    /// root handler commits it. A nested rule consumes its `}` and attaches
    /// itself to its parent.
    pub(super) fn rule(&mut self) -> Result<Transition> {
        loop {
            let step = if matches!(self.context.last(), Some(Frame::RuleBody)) {
                self.rule_body_step()?
            } else {
                self.selector_step()?
            };
            if let Some(transition) = step {
                return Ok(transition);
            }
        }
    }

    fn selector_step(&mut self) -> Result<Option<Transition>> {
        let Some(token) = self.peek() else {
            return Err(self.eof("unterminated selector, expected '{'"));
        };

        match self.context.last() {
            Some(Frame::ClassMarker) => {
                if token.kind != TokenKind::Identifier {
                    return Err(Error::syntax("expected a class name after '.'", Some(&token)));
                }
                self.context.pop();
                let selector = self.current_selector(&token)?;
                if !selector.classes.contains(&token.text) {
                    selector.classes.push(token.text.clone());
                }
                self.advance();
                return Ok(None);
            }
            Some(Frame::ColonMarker) => {
                if !token.is_delimiter(":") {
                    return Err(Error::syntax("expected '::' before attachment name", Some(&token)));
                }
                self.context.pop();
                self.context.push(Frame::AttachMarker);
                self.advance();
                return Ok(None);
            }
            Some(Frame::AttachMarker) => {
                if token.kind != TokenKind::Identifier {
                    return Err(Error::syntax("expected an attachment name after '::'", Some(&token)));
                }
                self.context.pop();
                let selector = self.current_selector(&token)?;
                if selector.attachment.is_some() {
                    return Err(Error::syntax("selector has more than one attachment", Some(&token)));
                }
                selector.attachment = Some(token.text.clone());
                self.advance();
                return Ok(None);
            }
            _ => {}
        }

        match token.kind {
            TokenKind::Whitespace => self.advance(),
            TokenKind::ColorLiteral => {
                let id = token.text.trim_start_matches('#').to_string();
                let selector = self.current_selector(&token)?;
                if selector.id.is_some() {
                    return Err(Error::syntax("selector has more than one id", Some(&token)));
                }
                selector.id = Some(id);
                self.advance();
            }
            TokenKind::Identifier => {
                let selector = self.current_selector(&token)?;
                if selector.name.is_some() {
                    return Err(unexpected(&token, "after selector name"));
                }
                selector.name = Some(token.text.clone());
                self.advance();
            }
            TokenKind::Operator if token.text == "." => {
                self.context.push(Frame::ClassMarker);
                self.advance();
            }
            TokenKind::Operator if token.text == "*" => {
                self.current_selector(&token)?.wildcard = true;
                self.advance();
            }
            TokenKind::Delimiter => match token.text.as_str() {
                ":" => {
                    self.context.push(Frame::ColonMarker);
                    self.advance();
                }
                "," => {
                    if self.current_selector(&token)?.is_empty() {
                        return Err(Error::syntax("empty selector before ','", Some(&token)));
                    }
                    if let Some(Frame::Selectors(selectors)) = self.context.last_mut() {
                        selectors.push(Selector::new());
                    }
                    self.advance();
                }
                "[" => return Ok(Some(Transition::Push(ParserState::Filter))),
                "{" => {
                    self.open_rule(&token)?;
                    self.advance();
                }
                _ => return Err(unexpected(&token, "in selector")),
            },
            _ => return Err(unexpected(&token, "in selector")),
        }
        Ok(None)
    }

    fn open_rule(&mut self, token: &Token) -> Result<()> {
        let Some(Frame::Selectors(selectors)) = self.context.pop() else {
            return Err(Error::syntax("expected a selector before '{'", Some(token)));
        };
        if selectors.iter().any(Selector::is_empty) {
            return Err(Error::syntax("empty selector", Some(token)));
        }

        let depth = self
            .fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Rule(_)))
            .count();
        if depth >= self.config.max_depth {
            return Err(Error::syntax(
                format!("rules nested deeper than {} levels", self.config.max_depth),
                Some(token),
            ));
        }

        self.fragments.push(Fragment::Rule(Rule::new(selectors)));
        self.context.push(Frame::RuleBody);
        Ok(())
    }

    fn rule_body_step(&mut self) -> Result<Option<Transition>> {
        let Some(token) = self.peek() else {
            return Err(self.eof("unterminated rule, expected '}'"));
        };
        match token.kind {
            TokenKind::Whitespace => self.advance(),
            TokenKind::Delimiter if token.text == ";" => self.advance(),
            TokenKind::Delimiter if token.text == "}" => {
                return self.close_rule(&token).map(Some);
            }
            TokenKind::Identifier => {
                self.context.push(Frame::Property(PendingProperty::default()));
                return Ok(Some(Transition::Push(ParserState::Property)));
            }
            _ if starts_selector(&token) => {
                self.context.push(Frame::Selectors(vec![Selector::new()]));
                return Ok(Some(Transition::Push(ParserState::Rule)));
            }
            _ => return Err(unexpected(&token, "in rule body")),
        }
        Ok(None)
    }

    fn close_rule(&mut self, token: &Token) -> Result<Transition> {
        if self.fragments.len() <= 1 {
            return Ok(Transition::Pop);
        }
        let (Some(Frame::RuleBody), Some(Fragment::Rule(child))) =
            (self.context.pop(), self.fragments.pop())
        else {
            return Err(Error::syntax("unmatched '}'", Some(token)));
        };
        match self.fragments.last_mut() {
            Some(Fragment::Rule(parent)) => {
                tracing::trace!(
                    target: targets::PARSER,
                    properties = child.properties.len(),
                    "nested rule closed"
                );
                parent.nested.push(child);
            }
            _ => return Err(Error::syntax("nested rule outside of a rule", Some(token))),
        }
        self.advance();
        Ok(Transition::Pop)
    }

    /// One `key: value;` declaration.
    ///
    /// A declaration ends at `;`, or at the `}` closing its block.
    pub(super) fn property(&mut self) -> Result<Transition> {
        loop {
            let Some(token) = self.peek() else {
                return Err(self.eof("unterminated declaration, expected ';'"));
            };
            match token.kind {
                TokenKind::Whitespace => self.advance(),
                TokenKind::Identifier => {
                    let pending = self.pending_property(&token)?;
                    if pending.key.is_none() {
                        pending.key = Some(token.text.clone());
                    } else {
                        self.push_value(&token, Value::string(token.text.clone()))?;
                    }
                    self.advance();
                }
                TokenKind::Number => {
                    let number = self.number(&token);
                    self.push_value(&token, Value::Literal(number))?;
                    self.advance();
                }
                TokenKind::String => {
                    self.push_value(&token, Value::string(token.text.clone()))?;
                    self.advance();
                }
                TokenKind::ColorLiteral => {
                    self.push_value(&token, Value::color(token.text.clone()))?;
                    self.advance();
                }
                TokenKind::FunctionStart => {
                    self.expect_value(&token)?;
                    return Ok(Transition::Push(ParserState::Function));
                }
                TokenKind::Delimiter => match token.text.as_str() {
                    ":" => {
                        let pending = self.pending_property(&token)?;
                        if pending.key.is_none() || pending.separated {
                            return Err(unexpected(&token, "in declaration"));
                        }
                        pending.separated = true;
                        self.advance();
                    }
                    // `line-dasharray: 4, 2` lists its numbers with commas
                    "," => {
                        if self.pending_property(&token)?.values.is_empty() {
                            return Err(unexpected(&token, "in declaration"));
                        }
                        self.advance();
                    }
                    "[" => {
                        self.expect_value(&token)?;
                        return Ok(Transition::Push(ParserState::Attribute));
                    }
                    ";" => {
                        self.commit_property(&token)?;
                        self.advance();
                        return Ok(Transition::Pop);
                    }
                    "}" => {
                        self.commit_property(&token)?;
                        return Ok(Transition::Pop);
                    }
                    _ => return Err(unexpected(&token, "in declaration")),
                },
                _ => return Err(unexpected(&token, "in declaration")),
            }
        }
    }

    fn expect_value(&mut self, token: &Token) -> Result<()> {
        if self.pending_property(token)?.separated {
            Ok(())
        } else {
            Err(Error::syntax("expected ':' after property name", Some(token)))
        }
    }

    /// Bracketed filter groups following a selector.
    ///
    /// Adjacent groups AND together. A `,` followed by another group ORs it
    /// with the selector's filter so far; a `,` followed by anything else
    /// starts the next selector.
    pub(super) fn filter(&mut self) -> Result<Transition> {
        loop {
            let Some(token) = self.peek() else {
                if let Some(Frame::FilterBuffer { open, .. }) = self.context.last() {
                    return Err(Error::syntax("unterminated filter, expected ']'", Some(open)));
                }
                return Ok(Transition::Pop);
            };

            if matches!(self.context.last(), Some(Frame::FilterBuffer { .. })) {
                self.filter_token(&token)?;
                self.advance();
                continue;
            }

            match token.kind {
                TokenKind::Whitespace => self.advance(),
                TokenKind::Delimiter if token.text == "[" => {
                    self.context.push(Frame::FilterBuffer {
                        text: String::new(),
                        open: token,
                    });
                    self.advance();
                }
                TokenKind::Delimiter if token.text == "," => {
                    if matches!(self.context.last(), Some(Frame::Comma)) {
                        return Err(unexpected(&token, "between filters"));
                    }
                    self.context.push(Frame::Comma);
                    self.advance();
                }
                _ => {
                    if matches!(self.context.last(), Some(Frame::Comma)) {
                        self.context.pop();
                        if let Some(Frame::Selectors(selectors)) = self.context.last_mut() {
                            selectors.push(Selector::new());
                        }
                    }
                    return Ok(Transition::Pop);
                }
            }
        }
    }

    fn filter_token(&mut self, token: &Token) -> Result<()> {
        match token.kind {
            TokenKind::Delimiter if token.text == "]" => return self.close_filter(),
            TokenKind::Delimiter if matches!(token.text.as_str(), "[" | "{" | "}" | ";") => {
                return Err(unexpected(token, "in filter"));
            }
            _ => {}
        }
        let Some(Frame::FilterBuffer { text, .. }) = self.context.last_mut() else {
            return Err(unexpected(token, "outside of a filter"));
        };
        if token.is_whitespace() {
            if !text.is_empty() {
                text.push(' ');
            }
        } else {
            text.push_str(&token.raw);
        }
        Ok(())
    }

    fn close_filter(&mut self) -> Result<()> {
        let Some(Frame::FilterBuffer { text, open }) = self.context.pop() else {
            return Err(self.eof("expected a filter"));
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::syntax("empty filter", Some(&open)));
        }
        let predicate = self
            .engine
            .parse(text)
            .map_err(|e| Error::predicate(text, &open, e))?;
        tracing::trace!(target: targets::PARSER, filter = %predicate, "parsed filter");

        let or = matches!(self.context.last(), Some(Frame::Comma));
        if or {
            self.context.pop();
        }
        let selector = self.current_selector(&open)?;
        let filter = Filter::new(predicate);
        if or {
            selector.or_filter(filter);
        } else {
            selector.and_filter(filter);
        }
        Ok(())
    }

    /// A function-call value, from its name to the closing `)`.
    pub(super) fn function(&mut self) -> Result<Transition> {
        loop {
            let Some(token) = self.peek() else {
                return Err(self.eof("unterminated function call, expected ')'"));
            };
            let open = matches!(self.context.last(), Some(Frame::Function(_)));
            match token.kind {
                TokenKind::FunctionStart if !open => {
                    self.context.push(Frame::Function(PendingFunction::new(token)));
                    self.advance();
                }
                TokenKind::FunctionStart => {
                    return Err(Error::syntax(
                        "function calls cannot be arguments",
                        Some(&token),
                    ));
                }
                _ if !open => return Err(unexpected(&token, "before function call")),
                TokenKind::Whitespace => self.advance(),
                TokenKind::Identifier | TokenKind::String => {
                    let arg = Argument::Literal(Literal::String(token.text.clone()));
                    self.push_arg(&token, arg)?;
                    self.advance();
                }
                TokenKind::ColorLiteral => {
                    let arg = Argument::Literal(Literal::Color(token.text.clone()));
                    self.push_arg(&token, arg)?;
                    self.advance();
                }
                TokenKind::Number => {
                    let number = self.number(&token);
                    self.push_arg(&token, Argument::Literal(number))?;
                    self.advance();
                }
                TokenKind::Delimiter => match token.text.as_str() {
                    "," => {
                        let pending = self.pending_function(&token)?;
                        if pending.expect_arg {
                            return Err(Error::syntax("missing argument before ','", Some(&token)));
                        }
                        pending.expect_arg = true;
                        self.advance();
                    }
                    "[" => {
                        if !self.pending_function(&token)?.expect_arg {
                            return Err(Error::syntax("expected ',' between arguments", Some(&token)));
                        }
                        return Ok(Transition::Push(ParserState::Attribute));
                    }
                    ")" => {
                        let value = self.close_function(&token)?;
                        self.push_value(&token, value)?;
                        self.advance();
                        return Ok(Transition::Pop);
                    }
                    _ => return Err(unexpected(&token, "in function arguments")),
                },
                _ => return Err(unexpected(&token, "in function arguments")),
            }
        }
    }

    fn close_function(&mut self, token: &Token) -> Result<Value> {
        let Some(Frame::Function(call)) = self.context.pop() else {
            return Err(unexpected(token, "outside of a function call"));
        };
        if call.expect_arg && !call.args.is_empty() {
            return Err(Error::syntax("missing argument before ')'", Some(token)));
        }
        let name = call.name;
        self.functions
            .build(&name, call.args)
            .map_err(|e| Error::syntax(format!("invalid call to {name}(): {e}"), Some(&call.open)))
    }

    /// A `[name]` attribute reference inside a declaration or function call.
    pub(super) fn attribute(&mut self) -> Result<Transition> {
        loop {
            let Some(token) = self.peek() else {
                return Err(self.eof("unterminated attribute reference, expected ']'"));
            };
            if !matches!(self.context.last(), Some(Frame::Attribute { .. })) {
                if !token.is_delimiter("[") {
                    return Err(unexpected(&token, "before attribute reference"));
                }
                self.context.push(Frame::Attribute {
                    name: None,
                    open: token,
                });
                self.advance();
                continue;
            }

            match token.kind {
                TokenKind::Whitespace => self.advance(),
                TokenKind::Identifier | TokenKind::String => {
                    if let Some(Frame::Attribute { name, .. }) = self.context.last_mut() {
                        if name.is_some() {
                            return Err(Error::syntax(
                                "attribute reference takes a single name",
                                Some(&token),
                            ));
                        }
                        *name = Some(token.text.clone());
                    }
                    self.advance();
                }
                TokenKind::Delimiter if token.text == "]" => {
                    let Some(Frame::Attribute { name, open }) = self.context.pop() else {
                        return Err(unexpected(&token, "outside of an attribute reference"));
                    };
                    let name =
                        name.ok_or_else(|| Error::syntax("empty attribute reference", Some(&open)))?;
                    if matches!(self.context.last(), Some(Frame::Function(_))) {
                        self.push_arg(&open, Argument::Attribute(name))?;
                    } else {
                        self.push_value(&open, Value::Attribute(name))?;
                    }
                    self.advance();
                    return Ok(Transition::Pop);
                }
                _ => return Err(unexpected(&token, "in attribute reference")),
            }
        }
    }

    /// A `Map { ... }` block of map-level declarations.
    pub(super) fn map_block(&mut self) -> Result<Transition> {
        if !matches!(self.context.last(), Some(Frame::MapBlock)) {
            // the `Map` keyword
            self.advance();
            self.skip_whitespace();
            match self.peek() {
                Some(token) if token.is_delimiter("{") => {
                    self.fragments.push(Fragment::Map(Properties::new()));
                    self.context.push(Frame::MapBlock);
                    self.advance();
                }
                Some(token) => {
                    return Err(Error::syntax("expected '{' after Map", Some(&token)));
                }
                None => return Err(self.eof("expected '{' after Map")),
            }
        }

        loop {
            let Some(token) = self.peek() else {
                return Err(self.eof("unterminated Map block, expected '}'"));
            };
            match token.kind {
                TokenKind::Whitespace => self.advance(),
                TokenKind::Delimiter if token.text == ";" => self.advance(),
                TokenKind::Delimiter if token.text == "}" => return Ok(Transition::Pop),
                TokenKind::Identifier => {
                    self.context.push(Frame::Property(PendingProperty::default()));
                    return Ok(Transition::Push(ParserState::Property));
                }
                _ => return Err(unexpected(&token, "in Map block")),
            }
        }
    }
}
