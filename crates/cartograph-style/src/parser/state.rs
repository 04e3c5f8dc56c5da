//! Parser states and the values kept on the context stack.

use std::fmt;

use crate::lexer::Token;
use crate::rules::Rule;
use crate::selector::Selector;
use crate::types::{Argument, Properties, Value};

/// A syntactic context. Each state has one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParserState {
    /// Top level: rules and `Map` blocks.
    Root,
    /// A selector list, then the body of the rule it opens.
    Rule,
    /// One `key: value;` declaration.
    Property,
    /// Bracketed filter groups following a selector.
    Filter,
    /// A function-call value.
    Function,
    /// A `[name]` attribute reference inside a value.
    Attribute,
    /// A `Map { ... }` block.
    Map,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Root => "root",
            ParserState::Rule => "rule",
            ParserState::Property => "property",
            ParserState::Filter => "filter",
            ParserState::Function => "function",
            ParserState::Attribute => "attribute",
            ParserState::Map => "map",
        };
        f.write_str(name)
    }
}

/// What a handler asks the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Descend into a new state; the current handler resumes afterwards.
    Push(ParserState),
    /// Return to the parent state at the current token.
    Pop,
}

/// A partially built piece of syntax.
#[derive(Debug)]
pub(crate) enum Frame {
    /// Selectors of the rule being opened; the last one is current.
    Selectors(Vec<Selector>),
    /// Inside the braces of the rule on top of the fragment stack.
    RuleBody,
    Property(PendingProperty),
    /// A `.` waiting for its class name.
    ClassMarker,
    /// A single `:` waiting for the second one.
    ColonMarker,
    /// `::` waiting for the attachment name.
    AttachMarker,
    /// A `,` after a filter group: either an OR or a new selector.
    Comma,
    /// Text of an open `[...]` filter.
    FilterBuffer { text: String, open: Token },
    Function(PendingFunction),
    /// An open `[...]` attribute reference.
    Attribute { name: Option<String>, open: Token },
    /// Inside the braces of a `Map` block.
    MapBlock,
}

#[derive(Debug, Default)]
pub(crate) struct PendingProperty {
    pub key: Option<String>,
    pub separated: bool,
    pub values: Vec<Value>,
}

#[derive(Debug)]
pub(crate) struct PendingFunction {
    pub name: String,
    pub args: Vec<Argument>,
    /// Set at the start and after each `,`.
    pub expect_arg: bool,
    pub open: Token,
}

impl PendingFunction {
    pub(crate) fn new(open: Token) -> Self {
        Self {
            name: open.text.clone(),
            args: Vec::new(),
            expect_arg: true,
            open,
        }
    }
}

/// A completed-but-open container that declarations are committed into.
#[derive(Debug)]
pub(crate) enum Fragment {
    Rule(Rule),
    Map(Properties),
}

impl Fragment {
    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        match self {
            Fragment::Rule(rule) => &mut rule.properties,
            Fragment::Map(props) => props,
        }
    }
}
