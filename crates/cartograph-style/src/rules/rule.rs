//! Rule definition.

use std::collections::BTreeSet;
use std::fmt;

use cartograph_core::Candidate;

use crate::selector::Selector;
use crate::types::{Properties, Value};

/// How a rule was introduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Selected only by id, wildcard, filter or attachment.
    #[default]
    Anonymous,
    /// At least one selector carries a name.
    Named,
    /// At least one selector carries a class, none a name.
    Class,
}

/// A rule: selectors, the properties they apply, and nested rules.
///
/// Selectors combine with OR: a rule applies to a candidate when any one of
/// them matches. Nested rules are owned by their parent, so the nesting is a
/// strict tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    /// Name of the first named selector.
    pub name: Option<String>,
    pub kind: RuleKind,
    pub selectors: Vec<Selector>,
    pub properties: Properties,
    pub nested: Vec<Rule>,
}

impl Rule {
    /// Create a rule for the given selectors.
    pub fn new(selectors: Vec<Selector>) -> Self {
        let name = selectors.iter().find_map(|s| s.name.clone());
        let kind = if name.is_some() {
            RuleKind::Named
        } else if selectors.iter().any(|s| !s.classes.is_empty()) {
            RuleKind::Class
        } else {
            RuleKind::Anonymous
        };
        Self {
            name,
            kind,
            selectors,
            properties: Properties::new(),
            nested: Vec::new(),
        }
    }

    /// Create a rule with a single selector.
    pub fn for_selector(selector: Selector) -> Self {
        Self::new(vec![selector])
    }

    /// Builder-style property assignment.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.set(key, value);
        self
    }

    /// Builder-style nested rule.
    pub fn with_nested(mut self, rule: Rule) -> Self {
        self.nested.push(rule);
        self
    }

    /// Get a property value as declared.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Resolve a property against a candidate.
    ///
    /// Attribute references are replaced with the candidate's values. Returns
    /// `None` if the property is not set or references a missing attribute.
    pub fn eval(&self, key: &str, candidate: &dyn Candidate) -> Option<Value> {
        self.properties.get(key)?.resolve(candidate)
    }

    /// Resolve a property as text.
    pub fn string(&self, candidate: &dyn Candidate, key: &str) -> Option<String> {
        self.eval(key, candidate).map(|value| value.to_string())
    }

    /// Resolve a property as a number.
    pub fn number(&self, candidate: &dyn Candidate, key: &str) -> Option<f64> {
        self.eval(key, candidate)?.as_f64()
    }

    /// Resolve a property as a boolean.
    pub fn boolean(&self, candidate: &dyn Candidate, key: &str) -> Option<bool> {
        self.eval(key, candidate)?.as_bool()
    }

    /// Resolve a property as a list of numbers.
    pub fn numbers(&self, candidate: &dyn Candidate, key: &str) -> Option<Vec<f64>> {
        self.eval(key, candidate)?.to_numbers()
    }

    /// Attribute names referenced by this rule and its nested rules, through
    /// selector filters and property values.
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    pub(crate) fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        let mut pending = vec![self];
        while let Some(rule) = pending.pop() {
            for filter in rule.selectors.iter().filter_map(|s| s.filter.as_ref()) {
                filter.collect_fields(fields);
            }
            for value in rule.properties.values() {
                value.collect_fields(fields);
            }
            pending.extend(&rule.nested);
        }
    }

    /// Number of nesting levels below this rule.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((rule, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(rule.nested.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        f.write_str(&pad)?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        f.write_str(" {\n")?;
        for (key, value) in self.properties.iter() {
            writeln!(f, "{pad}  {key}: {value};")?;
        }
        for child in &self.nested {
            child.write_indented(f, indent + 1)?;
        }
        writeln!(f, "{pad}}}")
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::Feature;

    #[test]
    fn kind_from_selectors() {
        assert_eq!(Rule::for_selector(Selector::named("Map")).kind, RuleKind::Named);
        assert_eq!(Rule::for_selector(Selector::class("a")).kind, RuleKind::Class);
        assert_eq!(Rule::for_selector(Selector::id("a")).kind, RuleKind::Anonymous);

        let rule = Rule::new(vec![Selector::class("a"), Selector::named("Layer")]);
        assert_eq!(rule.kind, RuleKind::Named);
        assert_eq!(rule.name.as_deref(), Some("Layer"));
    }

    #[test]
    fn eval_substitutes_attributes() {
        let rule = Rule::for_selector(Selector::id("cities"))
            .with_property("text-name", Value::Attribute("NAME".into()))
            .with_property("line-width", 2)
            .with_property("line-dasharray", Value::List(vec![4.0, 2.0]))
            .with_property("text-halo", "true");
        let city = Feature::new().with("NAME", "Porto");

        assert_eq!(rule.string(&city, "text-name").as_deref(), Some("Porto"));
        assert_eq!(rule.number(&city, "line-width"), Some(2.0));
        assert_eq!(rule.numbers(&city, "line-dasharray"), Some(vec![4.0, 2.0]));
        assert_eq!(rule.boolean(&city, "text-halo"), Some(true));
        assert_eq!(rule.eval("text-name", &Feature::new()), None);
        assert_eq!(rule.eval("missing", &city), None);
    }

    #[test]
    fn depth_counts_levels() {
        let rule = Rule::default().with_nested(Rule::default().with_nested(Rule::default()));
        assert_eq!(rule.depth(), 2);
    }

    #[test]
    fn display_nests() {
        let rule = Rule::for_selector(Selector::id("a"))
            .with_property("x", 1)
            .with_nested(Rule::for_selector(Selector::class("b")).with_property("y", 2));
        assert_eq!(rule.to_string(), "#a {\n  x: 1;\n  .b {\n    y: 2;\n  }\n}\n");
    }
}
