//! Scalar literal values.

use std::fmt;

/// A scalar value.
///
/// Literals are produced by the stylesheet parser for property values, by
/// predicate engines for comparison operands, and by candidates for their
/// attribute values.
///
/// # Example
///
/// ```
/// use cartograph_core::Literal;
///
/// assert_eq!(Literal::parse_number("42"), Some(Literal::Integer(42)));
/// assert_eq!(Literal::parse_number("42.5"), Some(Literal::Float(42.5)));
/// assert_eq!(Literal::parse_number("wide"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integral number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Plain text (identifiers and quoted strings).
    String(String),
    /// Color literal, kept as written (e.g. `#c00`).
    Color(String),
}

impl Literal {
    /// Coerce numeric text: integer first, then floating point.
    ///
    /// Returns `None` when the text is neither, so the caller can fall back
    /// to keeping it as a string. Words such as `inf` or `NaN` are rejected
    /// even though `f64` would accept them.
    pub fn parse_number(text: &str) -> Option<Literal> {
        let text = text.trim();
        if text.is_empty()
            || !text
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        {
            return None;
        }

        if let Ok(i) = text.parse::<i64>() {
            return Some(Literal::Integer(i));
        }
        text.parse::<f64>().ok().map(Literal::Float)
    }

    /// Numeric view of the literal.
    ///
    /// Strings holding numeric text convert as well, the way attribute values
    /// read from text-only data sources are expected to compare.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            Literal::String(s) => match Literal::parse_number(s)? {
                Literal::Integer(i) => Some(i as f64),
                Literal::Float(f) => Some(f),
                _ => None,
            },
            Literal::Boolean(_) | Literal::Color(_) => None,
        }
    }

    /// Integral view of the literal. Floats only convert when they have no
    /// fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Integer(i) => Some(*i),
            Literal::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Literal::String(s) => match Literal::parse_number(s)? {
                Literal::Integer(i) => Some(i),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text view of string and color literals.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) | Literal::Color(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for integer and float literals.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Literal::Integer(_) | Literal::Float(_))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::String(s) | Literal::Color(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(value.into())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}
