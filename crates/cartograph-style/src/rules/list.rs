//! Rule lists and the cascade operations over them.

use std::collections::BTreeSet;
use std::ops::Deref;

use cartograph_core::Candidate;

use crate::resolve::{self, ZGroup};
use crate::rules::Rule;
use crate::selector::SelectorMatcher;
use crate::types::Properties;

/// An ordered list of rules.
///
/// Every operation returns a new list and leaves `self` untouched, so they
/// chain the way a renderer uses them:
///
/// ```
/// use cartograph_core::Feature;
/// use cartograph_style::Stylesheet;
///
/// let sheet = Stylesheet::parse("#cities[pop > 100] { marker-width: 4; }").unwrap();
/// let town = Feature::new().with("pop", 500);
/// let props = sheet
///     .rules()
///     .select_by_id(Some("cities"), true)
///     .flatten()
///     .matching(&town)
///     .collapse();
/// assert_eq!(props.get("marker-width").and_then(|v| v.as_f64()), Some(4.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl RuleList {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    fn select(&self, keep: impl Fn(&Rule) -> bool) -> RuleList {
        self.rules.iter().filter(|r| keep(r)).cloned().collect()
    }

    /// Rules with a selector of the given name, or a wildcard selector when
    /// `wildcard` is set.
    pub fn select_by_name(&self, name: Option<&str>, wildcard: bool) -> RuleList {
        self.select(|rule| {
            rule.selectors
                .iter()
                .any(|s| SelectorMatcher::by_name(s, name, wildcard))
        })
    }

    /// Rules with a selector of the given id, or a wildcard selector when
    /// `wildcard` is set.
    pub fn select_by_id(&self, id: Option<&str>, wildcard: bool) -> RuleList {
        self.select(|rule| {
            rule.selectors
                .iter()
                .any(|s| SelectorMatcher::by_id(s, id, wildcard))
        })
    }

    /// Rules with a selector carrying the given class, or a wildcard selector
    /// when `wildcard` is set. `None` selects rules with a class-less
    /// selector.
    pub fn select_by_class(&self, class: Option<&str>, wildcard: bool) -> RuleList {
        self.select(|rule| {
            rule.selectors
                .iter()
                .any(|s| SelectorMatcher::by_class(s, class, wildcard))
        })
    }

    /// Rules with at least one selector whose filter accepts `candidate`.
    pub fn matching(&self, candidate: &dyn Candidate) -> RuleList {
        self.select(|rule| {
            rule.selectors
                .iter()
                .any(|s| SelectorMatcher::matches_candidate(s, candidate))
        })
    }

    /// Expand nested rules into a flat list.
    pub fn flatten(&self) -> RuleList {
        self.rules.iter().flat_map(resolve::flatten).collect()
    }

    /// Merge all properties, later rules overriding earlier ones.
    pub fn collapse(&self) -> Properties {
        resolve::collapse(&self.rules)
    }

    /// Partition by attachment, in first-seen order.
    pub fn zgroup(&self) -> Vec<ZGroup> {
        resolve::zgroup(&self.rules)
    }

    /// Candidate attribute names referenced anywhere in the list, including
    /// nested rules.
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        for rule in &self.rules {
            rule.collect_fields(&mut fields);
        }
        fields
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn into_vec(self) -> Vec<Rule> {
        self.rules
    }
}

impl Deref for RuleList {
    type Target = [Rule];

    fn deref(&self) -> &[Rule] {
        &self.rules
    }
}

impl FromIterator<Rule> for RuleList {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for RuleList {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl From<Vec<Rule>> for RuleList {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}
