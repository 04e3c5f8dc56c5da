//! Property values.
//!
//! A property value is what follows the `:` in a declaration. Values are
//! built once by the parser and never mutated; resolving a value against a
//! candidate produces a new value with attribute references substituted.
//!
//! # Example
//!
//! ```
//! use cartograph_core::{Feature, Literal};
//! use cartograph_style::types::Value;
//!
//! let label = Value::Attribute("NAME".to_string());
//! let city = Feature::new().with("NAME", "Lisbon");
//! assert_eq!(
//!     label.resolve(&city),
//!     Some(Value::Literal(Literal::from("Lisbon")))
//! );
//! ```

use std::collections::BTreeSet;
use std::fmt;

use cartograph_core::{Candidate, Literal};

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single scalar: string, number, boolean or color.
    Literal(Literal),
    /// A space-separated list of numbers, e.g. `line-dasharray: 4 2`.
    List(Vec<f64>),
    /// A reference to a candidate attribute, written `[name]`.
    Attribute(String),
    /// A function call that was not folded into a literal.
    Function(FunctionCall),
    /// Values accumulated from repeated declarations of the same key.
    Composite(Vec<Value>),
}

/// A function call value such as `interpolate([pop], red, blue, 0, 1000)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Argument>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A function argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal(Literal),
    Attribute(String),
}

impl Argument {
    /// The literal, if this argument is one.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Argument::Literal(lit) => Some(lit),
            Argument::Attribute(_) => None,
        }
    }
}

impl Value {
    /// Create a string literal value.
    pub fn string(value: impl Into<String>) -> Self {
        Value::Literal(Literal::String(value.into()))
    }

    /// Create a color literal value.
    pub fn color(value: impl Into<String>) -> Self {
        Value::Literal(Literal::Color(value.into()))
    }

    /// The literal, if this is a scalar value.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Numeric view of a scalar value.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_literal().and_then(Literal::as_f64)
    }

    /// Text view of a string or color value.
    pub fn as_str(&self) -> Option<&str> {
        self.as_literal().and_then(Literal::as_str)
    }

    /// Boolean view of a scalar value. The words `true` and `false` count,
    /// since property values are written as bare identifiers.
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_literal()? {
            Literal::Boolean(b) => Some(*b),
            Literal::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Literal::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Numeric list view.
    ///
    /// A [`Value::List`] converts directly, a number becomes a one-element
    /// list, and a string is split on spaces and commas.
    pub fn to_numbers(&self) -> Option<Vec<f64>> {
        match self {
            Value::List(items) => Some(items.clone()),
            Value::Literal(Literal::String(s)) => s
                .split([' ', ','])
                .filter(|part| !part.is_empty())
                .map(|part| Literal::parse_number(part).and_then(|lit| lit.as_f64()))
                .collect(),
            Value::Literal(lit) => lit.as_f64().map(|n| vec![n]),
            _ => None,
        }
    }

    /// Substitute attribute references with values read from `candidate`.
    ///
    /// Function calls that can be computed once their arguments are known
    /// (`interpolate`) are replaced by their result. Returns `None` if any
    /// referenced attribute is missing.
    pub fn resolve(&self, candidate: &dyn Candidate) -> Option<Value> {
        match self {
            Value::Literal(_) | Value::List(_) => Some(self.clone()),
            Value::Attribute(name) => candidate.attribute(name).map(Value::Literal),
            Value::Function(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| match arg {
                        Argument::Literal(lit) => Some(Argument::Literal(lit.clone())),
                        Argument::Attribute(name) => {
                            candidate.attribute(name).map(Argument::Literal)
                        }
                    })
                    .collect::<Option<Vec<_>>>()?;
                let call = FunctionCall::new(call.name.clone(), args);
                Some(crate::functions::evaluate(&call).unwrap_or(Value::Function(call)))
            }
            Value::Composite(parts) => parts
                .iter()
                .map(|part| part.resolve(candidate))
                .collect::<Option<Vec<_>>>()
                .map(Value::Composite),
        }
    }

    /// Add every attribute name this value references to `fields`.
    pub fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            match value {
                Value::Attribute(name) => {
                    fields.insert(name.clone());
                }
                Value::Function(call) => {
                    for arg in &call.args {
                        if let Argument::Attribute(name) = arg {
                            fields.insert(name.clone());
                        }
                    }
                }
                Value::Composite(parts) => pending.extend(parts),
                Value::Literal(_) | Value::List(_) => {}
            }
        }
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        Value::Literal(lit)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Literal(Literal::Integer(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Literal(Literal::Integer(value.into()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Literal(Literal::Boolean(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Literal(Literal::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Literal(Literal::String(s)) if s.contains([' ', ',', ')']) => {
                write!(f, "'{s}'")
            }
            Argument::Literal(lit) => write!(f, "{lit}"),
            Argument::Attribute(name) => write!(f, "[{name}]"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(lit) => write!(f, "{lit}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Attribute(name) => write!(f, "[{name}]"),
            Value::Function(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Value::Composite(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::Feature;

    fn call(name: &str, args: Vec<Argument>) -> Value {
        Value::Function(FunctionCall::new(name, args))
    }

    #[test]
    fn typed_views() {
        assert_eq!(Value::from(2).as_f64(), Some(2.0));
        assert_eq!(Value::from("true").as_bool(), Some(true));
        assert_eq!(Value::color("#c00").as_str(), Some("#c00"));
        assert_eq!(Value::from(2.5).as_str(), None);
    }

    #[test]
    fn numbers_from_lists_and_strings() {
        assert_eq!(Value::List(vec![1.0, 2.0]).to_numbers(), Some(vec![1.0, 2.0]));
        assert_eq!(Value::from("4 2, 1").to_numbers(), Some(vec![4.0, 2.0, 1.0]));
        assert_eq!(Value::from(3).to_numbers(), Some(vec![3.0]));
        assert_eq!(Value::from("4 wide").to_numbers(), None);
    }

    #[test]
    fn resolve_substitutes_attributes() {
        let f = Feature::new().with("pop", 10);
        let value = call(
            "interpolate",
            vec![
                Argument::Attribute("pop".into()),
                Argument::Literal(Literal::from("red")),
            ],
        );
        assert_eq!(
            value.resolve(&f),
            Some(call(
                "interpolate",
                vec![
                    Argument::Literal(Literal::Integer(10)),
                    Argument::Literal(Literal::from("red")),
                ],
            ))
        );
        assert_eq!(Value::Attribute("missing".into()).resolve(&f), None);
    }

    #[test]
    fn fields_through_functions_and_composites() {
        let value = Value::Composite(vec![
            Value::Attribute("NAME".into()),
            call("f", vec![Argument::Attribute("pop".into())]),
            Value::from(1),
        ]);
        let mut fields = BTreeSet::new();
        value.collect_fields(&mut fields);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["NAME", "pop"]);
    }

    #[test]
    fn display() {
        assert_eq!(Value::List(vec![1.0, 2.5]).to_string(), "1 2.5");
        assert_eq!(
            call(
                "interpolate",
                vec![
                    Argument::Attribute("foo".into()),
                    Argument::Literal(Literal::from("red")),
                    Argument::Literal(Literal::Integer(0)),
                ],
            )
            .to_string(),
            "interpolate([foo], red, 0)"
        );
    }
}
