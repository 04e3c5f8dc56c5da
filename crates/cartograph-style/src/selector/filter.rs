//! Predicate trees attached to selectors.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use cartograph_core::logging::targets;
use cartograph_core::{Candidate, EvalError, Predicate};

/// A selector filter: engine predicates combined with AND and OR.
///
/// Chained bracket groups (`[a][b]`) combine with AND, comma-separated groups
/// (`[a], [b]`) with OR. Flattening nested rules ANDs a child's filter with
/// its ancestors'.
#[derive(Debug, Clone)]
pub enum Filter {
    /// A predicate produced by the engine.
    Predicate(Arc<dyn Predicate>),
    /// Every part must hold.
    And(Vec<Filter>),
    /// At least one part must hold.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn new(predicate: Arc<dyn Predicate>) -> Self {
        Filter::Predicate(predicate)
    }

    /// Combine with AND, keeping the result flat.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), right) => {
                left.push(right);
                Filter::And(left)
            }
            (left, Filter::And(mut right)) => {
                right.insert(0, left);
                Filter::And(right)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }

    /// Combine with OR, keeping the result flat.
    pub fn or(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Or(mut left), Filter::Or(right)) => {
                left.extend(right);
                Filter::Or(left)
            }
            (Filter::Or(mut left), right) => {
                left.push(right);
                Filter::Or(left)
            }
            (left, Filter::Or(mut right)) => {
                right.insert(0, left);
                Filter::Or(right)
            }
            (left, right) => Filter::Or(vec![left, right]),
        }
    }

    /// Evaluate against a candidate, reporting evaluation errors.
    ///
    /// A false part decides an AND and a true part decides an OR even when
    /// other parts fail to evaluate.
    pub fn evaluate(&self, candidate: &dyn Candidate) -> Result<bool, EvalError> {
        match self {
            Filter::Predicate(p) => p.evaluate(candidate),
            Filter::And(parts) => {
                let mut error = None;
                for part in parts {
                    match part.evaluate(candidate) {
                        Ok(false) => return Ok(false),
                        Ok(true) => {}
                        Err(e) => {
                            error.get_or_insert(e);
                        }
                    }
                }
                error.map_or(Ok(true), Err)
            }
            Filter::Or(parts) => {
                let mut error = None;
                for part in parts {
                    match part.evaluate(candidate) {
                        Ok(true) => return Ok(true),
                        Ok(false) => {}
                        Err(e) => {
                            error.get_or_insert(e);
                        }
                    }
                }
                error.map_or(Ok(false), Err)
            }
        }
    }

    /// Evaluate against a candidate. Evaluation errors count as no match.
    pub fn matches(&self, candidate: &dyn Candidate) -> bool {
        match self.evaluate(candidate) {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(
                    target: targets::CASCADE,
                    filter = %self,
                    %error,
                    "filter could not be evaluated; treating as no match"
                );
                false
            }
        }
    }

    /// Add every attribute name the filter reads to `fields`.
    pub fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        let mut pending = vec![self];
        while let Some(filter) = pending.pop() {
            match filter {
                Filter::Predicate(p) => p.collect_fields(fields),
                Filter::And(parts) | Filter::Or(parts) => pending.extend(parts),
            }
        }
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::Predicate(a), Filter::Predicate(b)) => {
                Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
            }
            (Filter::And(a), Filter::And(b)) | (Filter::Or(a), Filter::Or(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (parts, sep) = match self {
            Filter::Predicate(p) => return write!(f, "{p}"),
            Filter::And(parts) => (parts, " AND "),
            Filter::Or(parts) => (parts, " OR "),
        };
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "({part})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::{Feature, PredicateEngine};
    use cartograph_filter::CqlEngine;

    fn filter(text: &str) -> Filter {
        Filter::new(CqlEngine::new().parse(text).unwrap())
    }

    #[test]
    fn and_or_stay_flat() {
        let f = filter("a = 1").and(filter("b = 2")).and(filter("c = 3"));
        match &f {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected AND, got {other:?}"),
        }
        let f = filter("a = 1").or(filter("b = 2")).or(filter("c = 3"));
        assert_eq!(f.to_string(), "(a = 1) OR (b = 2) OR (c = 3)");
    }

    #[test]
    fn matches_is_fail_soft() {
        let f = filter("pop > 100");
        assert!(!f.matches(&Feature::new()));
        assert!(f.matches(&Feature::new().with("pop", 200)));

        let either = filter("pop > 100").or(filter("kind = 'city'"));
        assert!(either.matches(&Feature::new().with("kind", "city")));
    }

    #[test]
    fn equality_by_text() {
        assert_eq!(filter("a = 1"), filter("a = 1"));
        assert_ne!(filter("a = 1"), filter("a = 2"));
    }

    #[test]
    fn fields() {
        let f = filter("a = 1").and(filter("b = 2").or(filter("c > d")));
        let mut fields = BTreeSet::new();
        f.collect_fields(&mut fields);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }
}
