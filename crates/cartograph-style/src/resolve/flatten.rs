//! Nested rule flattening.

use cartograph_core::logging::targets;

use crate::resolve::cascade_properties;
use crate::rules::Rule;
use crate::selector::{Selector, SelectorMatcher};

/// Expand a rule tree into an equivalent list of rules without nesting.
///
/// Each rule that declares properties, and each leaf, yields one rule for
/// its path from the root:
///
/// - properties are collapsed root to leaf, so children override parents
/// - selectors are the pairwise merge of every selector on the path, which
///   ANDs filters and concatenates classes
///
/// Selector pairs that disagree on name, id or attachment can never match
/// and are dropped, and so is a subtree left with no selector at all.
/// Output is in document order (a parent before its children). Flattening a
/// flat list returns it unchanged.
pub fn flatten(rule: &Rule) -> Vec<Rule> {
    let mut flat = Vec::new();
    let mut pending = vec![(rule, path_root(rule))];

    while let Some((node, path)) = pending.pop() {
        for child in node.nested.iter().rev() {
            match descend(&path, child) {
                Some(next) => pending.push((child, next)),
                None => tracing::debug!(
                    target: targets::CASCADE,
                    parent = %selectors(&path.selectors),
                    child = %selectors(&child.selectors),
                    "dropping nested rule whose selectors conflict with its parent"
                ),
            }
        }

        if !node.properties.is_empty() || node.nested.is_empty() {
            flat.push(path);
        }
    }

    flat
}

fn path_root(rule: &Rule) -> Rule {
    let mut root = Rule::new(rule.selectors.clone());
    root.properties = rule.properties.clone();
    root
}

fn descend(path: &Rule, child: &Rule) -> Option<Rule> {
    let merged: Vec<Selector> = if path.selectors.is_empty() {
        child.selectors.clone()
    } else if child.selectors.is_empty() {
        path.selectors.clone()
    } else {
        let merged: Vec<_> = path
            .selectors
            .iter()
            .flat_map(|parent| {
                child
                    .selectors
                    .iter()
                    .filter_map(move |c| SelectorMatcher::merge(parent, c))
            })
            .collect();
        if merged.is_empty() {
            return None;
        }
        merged
    };

    let mut next = Rule::new(merged);
    next.properties = path.properties.clone();
    cascade_properties(&mut next.properties, &child.properties);
    Some(next)
}

fn selectors(selectors: &[Selector]) -> String {
    selectors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
