//! Function-call values.
//!
//! When the parser reaches the closing `)` of a function value it hands the
//! name and arguments to a [`FunctionRegistry`]. A registered factory may
//! validate the arguments, fold the call into a literal (as `rgb()` does), or
//! keep it as a [`FunctionCall`]. Names with no factory are kept as plain
//! calls.
//!
//! # Example
//!
//! ```
//! use cartograph_style::functions::{FunctionError, FunctionRegistry};
//! use cartograph_style::types::{Argument, Value};
//!
//! let registry = FunctionRegistry::builtin().with(
//!     "double",
//!     |args: Vec<Argument>| -> Result<Value, FunctionError> {
//!         let n = args
//!             .first()
//!             .and_then(|a| a.as_literal())
//!             .and_then(|l| l.as_f64())
//!             .ok_or_else(|| FunctionError::new("expected a number"))?;
//!         Ok(Value::from(n * 2.0))
//!     },
//! );
//! assert!(registry.contains("double"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cartograph_core::Literal;

use crate::types::{Argument, FunctionCall, Rgba, Value};

/// Rejected function arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FunctionError {
    pub message: String,
}

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Builds the value of a function call from its arguments.
pub trait FunctionFactory: Send + Sync {
    fn build(&self, args: Vec<Argument>) -> Result<Value, FunctionError>;
}

impl<F> FunctionFactory for F
where
    F: Fn(Vec<Argument>) -> Result<Value, FunctionError> + Send + Sync,
{
    fn build(&self, args: Vec<Argument>) -> Result<Value, FunctionError> {
        self(args)
    }
}

/// Function names mapped to factories. Names are case-insensitive.
#[derive(Clone)]
pub struct FunctionRegistry {
    factories: HashMap<String, Arc<dyn FunctionFactory>>,
}

impl FunctionRegistry {
    /// A registry with no functions.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with `rgb`, `rgba`, `interpolate` and `randcolor`.
    pub fn builtin() -> Self {
        Self::empty()
            .with("rgb", rgb)
            .with("rgba", rgba)
            .with("interpolate", interpolate)
            .with("randcolor", randcolor)
    }

    /// Register a factory, replacing any existing one for `name`.
    pub fn register(&mut self, name: impl AsRef<str>, factory: impl FunctionFactory + 'static) {
        self.factories
            .insert(name.as_ref().to_ascii_lowercase(), Arc::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: impl AsRef<str>, factory: impl FunctionFactory + 'static) -> Self {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Build the value for a call.
    pub fn build(&self, name: &str, args: Vec<Argument>) -> Result<Value, FunctionError> {
        match self.factories.get(&name.to_ascii_lowercase()) {
            Some(factory) => factory.build(args),
            None => Ok(Value::Function(FunctionCall::new(name, args))),
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

fn channel(arg: &Argument, max: f64) -> Result<f64, FunctionError> {
    let n = arg
        .as_literal()
        .and_then(Literal::as_f64)
        .ok_or_else(|| FunctionError::new(format!("expected a number, got {arg}")))?;
    if !(0.0..=max).contains(&n) {
        return Err(FunctionError::new(format!("{n} is outside 0..={max}")));
    }
    Ok(n)
}

fn rgb(args: Vec<Argument>) -> Result<Value, FunctionError> {
    let [r, g, b] = args.as_slice() else {
        return Err(FunctionError::new("usage: rgb(<red>, <green>, <blue>)"));
    };
    let color = Rgba::opaque(
        channel(r, 255.0)?.round() as u8,
        channel(g, 255.0)?.round() as u8,
        channel(b, 255.0)?.round() as u8,
    );
    Ok(Value::color(color.to_string()))
}

fn rgba(args: Vec<Argument>) -> Result<Value, FunctionError> {
    let [r, g, b, a] = args.as_slice() else {
        return Err(FunctionError::new("usage: rgba(<red>, <green>, <blue>, <alpha>)"));
    };
    let color = Rgba::new(
        channel(r, 255.0)?.round() as u8,
        channel(g, 255.0)?.round() as u8,
        channel(b, 255.0)?.round() as u8,
        (channel(a, 1.0)? * 255.0).round() as u8,
    );
    // Keep the alpha byte even when opaque so the result is always #rrggbbaa.
    let mut hex = Rgba::opaque(color.r, color.g, color.b).to_string();
    hex.push_str(&format!("{:02x}", color.a));
    Ok(Value::color(hex))
}

fn interpolate(args: Vec<Argument>) -> Result<Value, FunctionError> {
    if args.len() != 5 {
        return Err(FunctionError::new(
            "usage: interpolate(<attribute>, <color>, <color>, <value>, <value>)",
        ));
    }
    if !matches!(args[0], Argument::Attribute(_)) {
        return Err(FunctionError::new(format!(
            "interpolate() expects an attribute reference first, got {}",
            args[0]
        )));
    }
    Ok(Value::Function(FunctionCall::new("interpolate", args)))
}

fn randcolor(args: Vec<Argument>) -> Result<Value, FunctionError> {
    if !args.is_empty() {
        return Err(FunctionError::new("randcolor() takes no arguments"));
    }
    Ok(Value::Function(FunctionCall::new("randcolor", args)))
}

/// Evaluate a call whose attribute arguments have been substituted.
///
/// `interpolate` yields the color at the candidate's position between the
/// two bounds and `randcolor` a fresh opaque color on every evaluation.
/// Anything else, or arguments that don't convert, yields `None`.
pub(crate) fn evaluate(call: &FunctionCall) -> Option<Value> {
    if call.name.eq_ignore_ascii_case("randcolor") {
        let color = Rgba::opaque(rand::random(), rand::random(), rand::random());
        return Some(Value::color(color.to_string()));
    }
    if !call.name.eq_ignore_ascii_case("interpolate") {
        return None;
    }
    let [value, from, to, low, high] = call.args.as_slice() else {
        return None;
    };
    let number = |arg: &Argument| arg.as_literal().and_then(Literal::as_f64);
    let color = |arg: &Argument| arg.as_literal().and_then(Literal::as_str).and_then(Rgba::parse);

    let (value, low, high) = (number(value)?, number(low)?, number(high)?);
    let (from, to) = (color(from)?, color(to)?);

    let t = if high == low {
        if value <= low { 0.0 } else { 1.0 }
    } else {
        (value - low) / (high - low)
    };
    Some(Value::color(from.lerp(to, t).to_string()))
}
