//! Predicate expression tree and evaluation.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use cartograph_core::{Candidate, EvalError, Literal, Predicate};

/// A parsed predicate expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All parts must hold.
    And(Vec<Expr>),
    /// At least one part must hold.
    Or(Vec<Expr>),
    /// Negation.
    Not(Box<Expr>),
    /// Binary comparison.
    Compare(Comparison),
    /// `operand IS NULL` (or `IS NOT NULL` when `negated`).
    IsNull { operand: Operand, negated: bool },
}

/// A binary comparison such as `pop > 100`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Operand,
    pub op: CompareOp,
    pub right: Operand,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A candidate attribute, by name.
    Attribute(String),
    /// A constant.
    Literal(Literal),
}

impl Operand {
    fn resolve(&self, candidate: &dyn Candidate) -> Result<Literal, EvalError> {
        match self {
            Operand::Attribute(name) => candidate
                .attribute(name)
                .ok_or_else(|| EvalError::MissingAttribute(name.clone())),
            Operand::Literal(lit) => Ok(lit.clone()),
        }
    }
}

impl Expr {
    fn eval(&self, candidate: &dyn Candidate) -> Result<bool, EvalError> {
        match self {
            // A false part decides an AND even if another part could not be
            // evaluated; likewise a true part decides an OR.
            Expr::And(parts) => {
                let mut error = None;
                for part in parts {
                    match part.eval(candidate) {
                        Ok(false) => return Ok(false),
                        Ok(true) => {}
                        Err(e) => {
                            error.get_or_insert(e);
                        }
                    }
                }
                error.map_or(Ok(true), Err)
            }
            Expr::Or(parts) => {
                let mut error = None;
                for part in parts {
                    match part.eval(candidate) {
                        Ok(true) => return Ok(true),
                        Ok(false) => {}
                        Err(e) => {
                            error.get_or_insert(e);
                        }
                    }
                }
                error.map_or(Ok(false), Err)
            }
            Expr::Not(inner) => inner.eval(candidate).map(|b| !b),
            Expr::Compare(cmp) => cmp.eval(candidate),
            Expr::IsNull { operand, negated } => {
                let is_null = match operand {
                    Operand::Attribute(name) => candidate.attribute(name).is_none(),
                    Operand::Literal(_) => false,
                };
                Ok(is_null != *negated)
            }
        }
    }

    fn fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            Expr::And(parts) | Expr::Or(parts) => {
                for part in parts {
                    part.fields(fields);
                }
            }
            Expr::Not(inner) => inner.fields(fields),
            Expr::Compare(cmp) => {
                for operand in [&cmp.left, &cmp.right] {
                    if let Operand::Attribute(name) = operand {
                        fields.insert(name.clone());
                    }
                }
            }
            Expr::IsNull { operand, .. } => {
                if let Operand::Attribute(name) = operand {
                    fields.insert(name.clone());
                }
            }
        }
    }
}

impl Comparison {
    fn eval(&self, candidate: &dyn Candidate) -> Result<bool, EvalError> {
        let left = self.left.resolve(candidate)?;
        let right = self.right.resolve(candidate)?;

        match compare(&left, &right) {
            Some(ordering) => Ok(self.op.accepts(ordering)),
            // Values without a common ordering are simply unequal.
            None => match self.op {
                CompareOp::Eq => Ok(false),
                CompareOp::Ne => Ok(true),
                _ => Err(EvalError::Incomparable {
                    left: left.to_string(),
                    right: right.to_string(),
                }),
            },
        }
    }
}

/// Order two literals: numerically when both sides have a numeric view,
/// otherwise textually for text, otherwise only booleans against booleans.
fn compare(left: &Literal, right: &Literal) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l.partial_cmp(&r);
    }
    match (left, right) {
        (Literal::Boolean(l), Literal::Boolean(r)) => Some(l.cmp(r)),
        (l, r) => match (l.as_str(), r.as_str()) {
            (Some(l), Some(r)) => Some(l.cmp(r)),
            _ => None,
        },
    }
}

impl Predicate for Expr {
    fn evaluate(&self, candidate: &dyn Candidate) -> Result<bool, EvalError> {
        self.eval(candidate)
    }

    fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        self.fields(fields);
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Attribute(name) => f.write_str(name),
            Operand::Literal(Literal::String(s)) => write!(f, "'{}'", s.replace('\'', "''")),
            Operand::Literal(Literal::Boolean(true)) => f.write_str("TRUE"),
            Operand::Literal(Literal::Boolean(false)) => f.write_str("FALSE"),
            Operand::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And(parts) => join(f, parts, " AND "),
            Expr::Or(parts) => join(f, parts, " OR "),
            Expr::Not(inner) => write!(f, "NOT ({inner})"),
            Expr::Compare(cmp) => write!(f, "{} {} {}", cmp.left, cmp.op.symbol(), cmp.right),
            Expr::IsNull { operand, negated } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{operand} IS{not} NULL")
            }
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, parts: &[Expr], sep: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        match part {
            Expr::And(_) | Expr::Or(_) => write!(f, "({part})")?,
            _ => write!(f, "{part}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::Feature;

    fn cmp(attr: &str, op: CompareOp, value: impl Into<Literal>) -> Expr {
        Expr::Compare(Comparison {
            left: Operand::Attribute(attr.to_string()),
            op,
            right: Operand::Literal(value.into()),
        })
    }

    #[test]
    fn and_short_circuits_on_false_part() {
        let expr = Expr::And(vec![cmp("missing", CompareOp::Eq, 1), cmp("pop", CompareOp::Gt, 10)]);
        let f = Feature::new().with("pop", 5);
        assert_eq!(expr.evaluate(&f), Ok(false));

        let f = Feature::new().with("pop", 50);
        assert_eq!(
            expr.evaluate(&f),
            Err(EvalError::MissingAttribute("missing".to_string()))
        );
    }

    #[test]
    fn or_short_circuits_on_true_part() {
        let expr = Expr::Or(vec![cmp("missing", CompareOp::Eq, 1), cmp("pop", CompareOp::Gt, 10)]);
        assert_eq!(expr.evaluate(&Feature::new().with("pop", 50)), Ok(true));
    }

    #[test]
    fn mixed_types_are_unequal() {
        let f = Feature::new().with("name", "Lisbon");
        assert_eq!(cmp("name", CompareOp::Eq, 3).evaluate(&f), Ok(false));
        assert_eq!(cmp("name", CompareOp::Ne, 3).evaluate(&f), Ok(true));
        assert!(cmp("name", CompareOp::Lt, 3).evaluate(&f).is_err());
    }

    #[test]
    fn display_groups_nested_logic() {
        let expr = Expr::And(vec![
            cmp("a", CompareOp::Lt, 3),
            Expr::Or(vec![cmp("b", CompareOp::Ge, 10), cmp("c", CompareOp::Eq, "x")]),
        ]);
        assert_eq!(expr.to_string(), "a < 3 AND (b >= 10 OR c = 'x')");
    }

    #[test]
    fn fields_are_collected() {
        let expr = Expr::Not(Box::new(Expr::And(vec![
            cmp("a", CompareOp::Lt, 3),
            Expr::IsNull {
                operand: Operand::Attribute("b".into()),
                negated: true,
            },
        ])));
        let mut fields = BTreeSet::new();
        expr.collect_fields(&mut fields);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
