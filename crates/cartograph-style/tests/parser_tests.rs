//! Stylesheet parsing tests.

use cartograph_core::{Feature, Literal};
use cartograph_style::Error;
use cartograph_style::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

fn parse(text: &str) -> Stylesheet {
    Stylesheet::parse(text).expect("stylesheet should parse")
}

fn filter_text(rule: &Rule) -> String {
    rule.selectors[0]
        .filter
        .as_ref()
        .map(|f| f.to_string())
        .unwrap_or_default()
}

#[test]
fn test_parse_simple() {
    let sheet = parse("#layer {  line-color: #c00;  line-width: 1;}");

    assert_eq!(sheet.len(), 1);
    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors.len(), 1);
    assert_eq!(rule.selectors[0].id.as_deref(), Some("layer"));

    let none = Feature::new();
    assert_eq!(
        rule.string(&none, "line-color").as_deref().and_then(Rgba::parse),
        Rgba::parse("#cc0000")
    );
    assert_eq!(rule.get("line-width"), Some(&Value::Literal(Literal::Integer(1))));
}

#[test]
fn test_parse_simple_filter() {
    let sheet = parse("#layer[foo < 3] {  line-color: #c00ffd;  line-width: 1;}");

    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors[0].id.as_deref(), Some("layer"));
    assert_eq!(filter_text(rule), "foo < 3");
    assert_eq!(rule.string(&Feature::new(), "line-color").as_deref(), Some("#c00ffd"));
}

#[test]
fn test_parse_and_filter() {
    let sheet = parse("#layer[foo < 3][bar >= 10] {  line-width: 1;}");

    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors.len(), 1);
    assert_eq!(filter_text(rule), "(foo < 3) AND (bar >= 10)");
}

#[test]
fn test_parse_or_filter() {
    let sheet = parse("#layer[foo < 3], [bar >= 10] {  line-width: 1;}");

    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors.len(), 1);
    assert_eq!(filter_text(rule), "(foo < 3) OR (bar >= 10)");
}

#[test]
fn test_parse_or_inside_filter() {
    let sheet = parse("#layer[foo < 3 OR bar >= 10]{  line-width: 1;}");

    let rule = &sheet.rules()[0];
    assert_eq!(filter_text(rule), "foo < 3 OR bar >= 10");

    let hit = Feature::new().with("foo", 5).with("bar", 11);
    let miss = Feature::new().with("foo", 5).with("bar", 1);
    let filter = rule.selectors[0].filter.as_ref().unwrap();
    assert!(filter.matches(&hit));
    assert!(!filter.matches(&miss));
}

#[test]
fn test_parse_nested() {
    init_tracing();
    let sheet = parse(
        "#layer {
           line-width: 1;
           [foo < 3] { line-color: #aaa; }
           [bar >= 10] { line-color: #bbb; }
           [bam = 'xyz'] { line-color: #ccc; }
         }",
    );

    assert_eq!(sheet.len(), 1);
    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors[0].id.as_deref(), Some("layer"));
    assert_eq!(rule.number(&Feature::new(), "line-width"), Some(1.0));
    assert_eq!(rule.nested.len(), 3);

    let expected = [
        ("foo < 3", "#aaa"),
        ("bar >= 10", "#bbb"),
        ("bam = 'xyz'", "#ccc"),
    ];
    for (nested, (filter, color)) in rule.nested.iter().zip(expected) {
        assert_eq!(filter_text(nested), filter);
        assert_eq!(nested.get("line-color"), Some(&Value::color(color)));
    }
}

#[test]
fn test_parse_map() {
    let sheet = parse(
        "Map {  background-color: rgb(0,0,0);}#layer {  line-color: #c00;  line-width: 1px;}",
    );

    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet.map().get("background-color"), Some(&Value::color("#000000")));

    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors[0].id.as_deref(), Some("layer"));
    assert_eq!(rule.get("line-width"), Some(&Value::from(1)));
}

#[test]
fn test_parse_class() {
    let sheet = parse(".class {  line-color: #c00;  line-width: 1;}");

    let rule = &sheet.rules()[0];
    assert_eq!(rule.kind, RuleKind::Class);
    assert_eq!(rule.selectors[0].classes, vec!["class"]);
    assert_eq!(rule.string(&Feature::new(), "line-color").as_deref(), Some("#c00"));
}

#[test]
fn test_attribute_property() {
    let sheet = parse(".foo {  line-width: [attr];}");

    let rule = &sheet.rules()[0];
    let feature = Feature::new().with("attr", "1");
    assert_eq!(rule.number(&feature, "line-width"), Some(1.0));
    assert_eq!(rule.number(&Feature::new(), "line-width"), None);
}

#[test]
fn test_identifier_values() {
    let sheet = parse(
        "  #states {    polygon-fill: #888888;    polygon-opacity: 0.25;    comp-op: dst;  }",
    );

    let rule = &sheet.rules()[0];
    let none = Feature::new();
    assert_eq!(rule.string(&none, "polygon-fill").as_deref(), Some("#888888"));
    assert_eq!(rule.number(&none, "polygon-opacity"), Some(0.25));
    assert_eq!(rule.string(&none, "comp-op").as_deref(), Some("dst"));
}

#[test]
fn test_attachment() {
    let sheet = parse("  #states::glow {    polygon-fill: #888888;    comp-op: dst;  }");

    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors.len(), 1);
    assert_eq!(rule.selectors[0].id.as_deref(), Some("states"));
    assert_eq!(rule.selectors[0].attachment.as_deref(), Some("glow"));
    assert_eq!(rule.selectors[0].to_string(), "#states::glow");
}

#[test]
fn test_wildcard_and_comments() {
    let sheet = parse(
        "  /*   * some comment    */  * {  /*   * another comment    */    polygon-fill: #888888;  }",
    );

    assert_eq!(sheet.len(), 1);
    let rule = &sheet.rules()[0];
    assert_eq!(rule.selectors.len(), 1);
    assert!(rule.selectors[0].wildcard);
    assert_eq!(rule.properties.len(), 1);
}

#[test]
fn test_functions() {
    let sheet = parse("  * {    polygon-fill: randcolor();  }");
    let rule = &sheet.rules()[0];
    let fill = rule.string(&Feature::new(), "polygon-fill");
    assert!(fill.as_deref().and_then(Rgba::parse).is_some(), "got {fill:?}");

    let sheet = parse("  * {    polygon-fill: interpolate([foo], red, blue, 0, 1000);  }");
    let rule = &sheet.rules()[0];
    assert_eq!(rule.fields().into_iter().collect::<Vec<_>>(), vec!["foo"]);

    let feature = Feature::new().with("foo", 500);
    let fill = rule.string(&feature, "polygon-fill").and_then(|s| Rgba::parse(&s));
    assert_eq!(fill, Some(Rgba::opaque(128, 0, 128)));
}

#[test]
fn test_array_property() {
    let sheet = parse("  * {    line-dasharray: 1.0 2.0 3.0;  }");

    let rule = &sheet.rules()[0];
    assert_eq!(
        rule.numbers(&Feature::new(), "line-dasharray"),
        Some(vec![1.0, 2.0, 3.0])
    );
}

#[test]
fn test_number_coercion() {
    let sheet = parse("#a { i: 42; f: 42.5; s: 4x2; }");
    let rule = &sheet.rules()[0];

    assert_eq!(rule.get("i"), Some(&Value::Literal(Literal::Integer(42))));
    assert_eq!(rule.get("f"), Some(&Value::Literal(Literal::Float(42.5))));
    // not a number: kept as the text that was written
    assert_eq!(rule.get("s"), Some(&Value::from("4x2")));
}

#[test]
fn test_unterminated_rule_fails() {
    let err = Stylesheet::parse("Name { color: red ").unwrap_err();
    assert!(err.is_syntax(), "expected a syntax error, got {err}");
    assert!(matches!(err, Error::Syntax { at_eof: true, .. }), "{err}");
}

#[test]
fn test_error_reports_position() {
    let err = Stylesheet::parse("#a {\n  x: 1;\n  42;\n}").unwrap_err();
    match err {
        Error::Syntax { line, column, token, .. } => {
            assert_eq!(line, 3);
            assert_eq!(column, 3);
            assert_eq!(token.as_deref(), Some("42"));
        }
        other => panic!("expected a syntax error, got {other}"),
    }
}

#[test]
fn test_depth_is_bounded() {
    init_tracing();
    let deep = format!("{}x: 1;{}", "#a { ".repeat(100), "} ".repeat(100));
    assert!(Stylesheet::parse(&deep).is_err());

    let parser = Parser::builder().max_depth(128).build();
    assert!(parser.parse(&deep).is_ok());
}

#[test]
fn test_accumulating_parser() {
    let parser = Parser::with_config(ParserConfig::accumulating());
    let sheet = parser
        .parse("Map { font-directory: a; font-directory: b; }")
        .unwrap();
    assert_eq!(
        sheet.map().get("font-directory"),
        Some(&Value::Composite(vec![Value::from("a"), Value::from("b")]))
    );
}
