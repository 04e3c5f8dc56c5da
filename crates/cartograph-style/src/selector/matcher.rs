//! Selector matching and merging.

use cartograph_core::Candidate;

use super::Selector;

/// Selector matching operations used by the cascade engine.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Exact name match, or any wildcard selector when `wildcard` is set.
    ///
    /// `None` only matches selectors without a name.
    pub fn by_name(selector: &Selector, name: Option<&str>, wildcard: bool) -> bool {
        selector.name.as_deref() == name || (wildcard && selector.wildcard)
    }

    /// Exact id match, or any wildcard selector when `wildcard` is set.
    pub fn by_id(selector: &Selector, id: Option<&str>, wildcard: bool) -> bool {
        selector.id.as_deref() == id || (wildcard && selector.wildcard)
    }

    /// Class membership, or any wildcard selector when `wildcard` is set.
    ///
    /// `None` matches selectors without classes.
    pub fn by_class(selector: &Selector, class: Option<&str>, wildcard: bool) -> bool {
        let hit = match class {
            Some(class) => selector.classes.iter().any(|c| c == class),
            None => selector.classes.is_empty(),
        };
        hit || (wildcard && selector.wildcard)
    }

    /// Whether the selector's filter accepts the candidate.
    pub fn matches_candidate(selector: &Selector, candidate: &dyn Candidate) -> bool {
        selector
            .filter
            .as_ref()
            .is_none_or(|filter| filter.matches(candidate))
    }

    /// Merge a nested selector into its parent.
    ///
    /// Returns `None` when the two disagree on name, id or attachment, since
    /// no candidate could satisfy both.
    pub fn merge(parent: &Selector, child: &Selector) -> Option<Selector> {
        let name = agree(&parent.name, &child.name)?;
        let id = agree(&parent.id, &child.id)?;
        let attachment = agree(&parent.attachment, &child.attachment)?;

        let mut classes = parent.classes.clone();
        for class in &child.classes {
            if !classes.contains(class) {
                classes.push(class.clone());
            }
        }

        let filter = match (&parent.filter, &child.filter) {
            (Some(p), Some(c)) => Some(p.clone().and(c.clone())),
            (p, c) => p.clone().or_else(|| c.clone()),
        };

        let wildcard = (parent.wildcard || child.wildcard) && name.is_none() && id.is_none();

        Some(Selector {
            name,
            id,
            classes,
            wildcard,
            filter,
            attachment,
        })
    }
}

fn agree(a: &Option<String>, b: &Option<String>) -> Option<Option<String>> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => None,
        (Some(a), _) => Some(Some(a.clone())),
        (None, b) => Some(b.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Filter;
    use cartograph_core::{Feature, PredicateEngine};
    use cartograph_filter::CqlEngine;

    fn filter(text: &str) -> Filter {
        Filter::new(CqlEngine::new().parse(text).unwrap())
    }

    #[test]
    fn name_and_id_matching() {
        let s = Selector::named("Layer");
        assert!(SelectorMatcher::by_name(&s, Some("Layer"), false));
        assert!(!SelectorMatcher::by_name(&s, Some("Map"), false));
        assert!(!SelectorMatcher::by_name(&s, None, false));
        assert!(SelectorMatcher::by_id(&s, None, false));

        let any = Selector::wildcard();
        assert!(SelectorMatcher::by_id(&any, Some("roads"), true));
        assert!(!SelectorMatcher::by_id(&any, Some("roads"), false));
    }

    #[test]
    fn class_matching() {
        let s = Selector::class("major").with_class("paved");
        assert!(SelectorMatcher::by_class(&s, Some("paved"), false));
        assert!(!SelectorMatcher::by_class(&s, Some("minor"), false));
        assert!(!SelectorMatcher::by_class(&s, None, false));
        assert!(SelectorMatcher::by_class(&Selector::id("x"), None, false));
    }

    #[test]
    fn candidate_matching() {
        let s = Selector::id("cities").with_filter(filter("pop > 100"));
        assert!(SelectorMatcher::matches_candidate(&s, &Feature::new().with("pop", 101)));
        assert!(!SelectorMatcher::matches_candidate(&s, &Feature::new().with("pop", 1)));
        assert!(SelectorMatcher::matches_candidate(&Selector::id("cities"), &Feature::new()));
    }

    #[test]
    fn merge_combines_filters_and_classes() {
        let parent = Selector::id("roads")
            .with_class("major")
            .with_filter(filter("lanes > 2"));
        let child = Selector::new()
            .with_class("paved")
            .with_filter(filter("speed > 80"))
            .with_attachment("casing");

        let merged = SelectorMatcher::merge(&parent, &child).unwrap();
        assert_eq!(merged.id.as_deref(), Some("roads"));
        assert_eq!(merged.classes, vec!["major", "paved"]);
        assert_eq!(merged.attachment.as_deref(), Some("casing"));
        assert_eq!(
            merged.filter.map(|f| f.to_string()).as_deref(),
            Some("(lanes > 2) AND (speed > 80)")
        );
    }

    #[test]
    fn merge_rejects_conflicts() {
        assert!(SelectorMatcher::merge(&Selector::id("a"), &Selector::id("b")).is_none());
        assert!(
            SelectorMatcher::merge(
                &Selector::new().with_attachment("halo"),
                &Selector::new().with_attachment("glow")
            )
            .is_none()
        );
        let merged = SelectorMatcher::merge(&Selector::wildcard(), &Selector::id("a")).unwrap();
        assert!(!merged.wildcard);
    }
}
