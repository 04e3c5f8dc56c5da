//! Property cascading and z-order grouping.

use indexmap::IndexMap;

use crate::rules::{Rule, RuleList};
use crate::types::Properties;

/// Cascade source properties onto target.
///
/// Every property in `source` overwrites the same key in `target`. Later
/// rules override earlier ones purely by list order.
pub fn cascade_properties(target: &mut Properties, source: &Properties) {
    for (key, value) in source {
        target.set(key.clone(), value.clone());
    }
}

/// Merge the properties of `rules`, in order, into one map.
pub fn collapse<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Properties {
    let mut merged = Properties::new();
    for rule in rules {
        cascade_properties(&mut merged, &rule.properties);
    }
    merged
}

/// Rules sharing one attachment, rendered as one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZGroup {
    /// The attachment tag, or `None` for the default group.
    pub attachment: Option<String>,
    pub rules: RuleList,
}

/// Partition rules by attachment.
///
/// A rule's attachment is the first one set on any of its selectors. Groups
/// appear in the order their attachment is first seen, and each group keeps
/// the relative order of its rules.
pub fn zgroup<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Vec<ZGroup> {
    let mut groups: IndexMap<Option<String>, Vec<Rule>> = IndexMap::new();
    for rule in rules {
        let attachment = rule
            .selectors
            .iter()
            .find_map(|s| s.attachment.clone());
        groups.entry(attachment).or_default().push(rule.clone());
    }
    groups
        .into_iter()
        .map(|(attachment, rules)| ZGroup {
            attachment,
            rules: RuleList::new(rules),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use crate::types::Value;

    #[test]
    fn cascade_overwrites_set_values() {
        let mut target = Properties::new().with("color", "black").with("opacity", 1);
        let source = Properties::new().with("color", "red");

        cascade_properties(&mut target, &source);

        assert_eq!(target.get("color"), Some(&Value::from("red")));
        assert_eq!(target.get("opacity"), Some(&Value::from(1)));
    }

    #[test]
    fn collapse_is_list_order() {
        let r1 = Rule::for_selector(Selector::named("R1")).with_property("a", 1);
        let r2 = Rule::for_selector(Selector::named("R2")).with_property("a", 2);

        assert_eq!(collapse([&r1, &r2]).get("a"), Some(&Value::from(2)));
        assert_eq!(collapse([&r2, &r1]).get("a"), Some(&Value::from(1)));
        assert!(collapse(&Vec::<Rule>::new()).is_empty());
    }

    #[test]
    fn zgroup_keeps_first_seen_order() {
        let halo = |n: i32| {
            Rule::for_selector(Selector::id("x").with_attachment("halo")).with_property("n", n)
        };
        let plain = Rule::for_selector(Selector::id("x")).with_property("n", 2);
        let rules = [halo(1), plain, halo(3)];

        let groups = zgroup(&rules);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].attachment.as_deref(), Some("halo"));
        assert_eq!(groups[0].rules.len(), 2);
        assert_eq!(groups[0].rules[0].get("n"), Some(&Value::from(1)));
        assert_eq!(groups[0].rules[1].get("n"), Some(&Value::from(3)));
        assert_eq!(groups[1].attachment, None);
    }
}
