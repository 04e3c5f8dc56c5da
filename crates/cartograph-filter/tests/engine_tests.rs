use std::collections::BTreeSet;

use cartograph_core::{EvalError, Feature, PredicateEngine, PredicateError};
use cartograph_filter::CqlEngine;

fn eval(text: &str, feature: &Feature) -> Result<bool, EvalError> {
    CqlEngine::new()
        .parse(text)
        .unwrap_or_else(|e| panic!("failed to parse '{text}': {e}"))
        .evaluate(feature)
}

#[test]
fn numeric_comparisons() {
    let town = Feature::new().with("pop", 500);
    assert_eq!(eval("pop > 100", &town), Ok(true));
    assert_eq!(eval("pop < 100", &town), Ok(false));
    assert_eq!(eval("pop >= 500", &town), Ok(true));
    assert_eq!(eval("pop <= 499", &town), Ok(false));
    assert_eq!(eval("pop = 500", &town), Ok(true));
    assert_eq!(eval("pop <> 500", &town), Ok(false));
    assert_eq!(eval("pop != 1", &town), Ok(true));
}

#[test]
fn integer_and_float_compare_numerically() {
    let f = Feature::new().with("ratio", 0.5).with("count", 3);
    assert_eq!(eval("ratio < 1", &f), Ok(true));
    assert_eq!(eval("count = 3.0", &f), Ok(true));
}

#[test]
fn string_comparisons() {
    let f = Feature::new().with("kind", "major");
    assert_eq!(eval("kind = 'major'", &f), Ok(true));
    assert_eq!(eval("kind = \"minor\"", &f), Ok(false));
    assert_eq!(eval("kind > 'aaa'", &f), Ok(true));
}

#[test]
fn logical_combinations() {
    let f = Feature::new().with("foo", 2).with("bar", 5);
    assert_eq!(eval("foo < 3 OR bar >= 10", &f), Ok(true));
    assert_eq!(eval("foo < 3 AND bar >= 10", &f), Ok(false));
    assert_eq!(eval("NOT (foo < 3 AND bar >= 10)", &f), Ok(true));
    assert_eq!(eval("(foo = 1 or foo = 2) and bar = 5", &f), Ok(true));
}

#[test]
fn missing_attribute_is_an_error() {
    let f = Feature::new();
    assert_eq!(
        eval("pop > 100", &f),
        Err(EvalError::MissingAttribute("pop".to_string()))
    );
    assert_eq!(eval("pop IS NULL", &f), Ok(true));
    assert_eq!(eval("pop IS NOT NULL", &f), Ok(false));
}

#[test]
fn booleans() {
    let f = Feature::new().with("capital", true);
    assert_eq!(eval("capital = true", &f), Ok(true));
    assert_eq!(eval("capital = FALSE", &f), Ok(false));
}

#[test]
fn fields_are_reported() {
    let predicate = CqlEngine::new()
        .parse("pop > 100 AND (kind = 'a' OR NAME IS NULL)")
        .unwrap();
    let mut fields = BTreeSet::new();
    predicate.collect_fields(&mut fields);
    let fields: Vec<_> = fields.into_iter().collect();
    assert_eq!(fields, vec!["NAME", "kind", "pop"]);
}

#[test]
fn display_round_trips_through_the_engine() {
    let engine = CqlEngine::new();
    let predicate = engine.parse("foo < 3 or bar >= 10").unwrap();
    assert_eq!(predicate.to_string(), "foo < 3 OR bar >= 10");
    let reparsed = engine.parse(&predicate.to_string()).unwrap();
    assert_eq!(reparsed.to_string(), predicate.to_string());
}

#[test]
fn malformed_text_is_rejected() {
    let engine = CqlEngine::new();
    assert!(matches!(
        engine.parse("pop >"),
        Err(PredicateError::UnexpectedEnd { .. })
    ));
    assert!(matches!(
        engine.parse("pop > 1 2"),
        Err(PredicateError::UnexpectedToken { .. })
    ));
    assert!(engine.parse("pop ! 1").is_err());
}
