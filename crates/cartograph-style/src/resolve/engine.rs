//! Stylesheet set and per-candidate resolution.

use std::collections::BTreeSet;
use std::path::Path;

use cartograph_core::Candidate;
use cartograph_core::logging::targets;

use crate::resolve::cascade::cascade_properties;
use crate::rules::{RuleList, Stylesheet};
use crate::types::Properties;

/// Properties for one drawing pass over a candidate.
///
/// A layer styled with `::casing` and `::fill` attachments draws each
/// candidate twice; passes come back in the order their attachments first
/// appear in the stylesheets.
#[derive(Debug, Clone, PartialEq)]
pub struct StylePass {
    /// Attachment name, `None` for the default pass.
    pub attachment: Option<String>,
    pub properties: Properties,
}

/// Resolves candidates against an ordered set of stylesheets.
///
/// Stylesheets added later take precedence over earlier ones: their rules
/// are appended after the rules already loaded, so they win the cascade.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    stylesheets: Vec<Stylesheet>,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stylesheet after the ones already loaded.
    pub fn add_stylesheet(&mut self, stylesheet: Stylesheet) {
        tracing::debug!(
            target: targets::CASCADE,
            rules = stylesheet.len(),
            path = ?stylesheet.source_path,
            "adding stylesheet"
        );
        self.stylesheets.push(stylesheet);
    }

    /// Remove stylesheets loaded from a specific source file.
    pub fn remove_stylesheet_by_path(&mut self, path: &Path) {
        self.stylesheets
            .retain(|s| s.source_path.as_deref() != Some(path));
    }

    /// Replace the stylesheet loaded from `path`, keeping its precedence.
    ///
    /// Returns `false` if no stylesheet came from `path`, in which case
    /// `stylesheet` is added after the others.
    pub fn replace_stylesheet_by_path(&mut self, path: &Path, stylesheet: Stylesheet) -> bool {
        let slot = self
            .stylesheets
            .iter_mut()
            .find(|s| s.source_path.as_deref() == Some(path));
        match slot {
            Some(slot) => {
                *slot = stylesheet;
                true
            }
            None => {
                self.add_stylesheet(stylesheet);
                false
            }
        }
    }

    /// Clear all stylesheets.
    pub fn clear_stylesheets(&mut self) {
        self.stylesheets.clear();
    }

    /// The loaded stylesheets, lowest precedence first.
    pub fn stylesheets(&self) -> &[Stylesheet] {
        &self.stylesheets
    }

    /// Get the number of loaded stylesheets.
    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    /// Get the total number of top-level rules across all stylesheets.
    pub fn rule_count(&self) -> usize {
        self.stylesheets.iter().map(Stylesheet::len).sum()
    }

    /// Map-level properties, later stylesheets overriding earlier ones.
    pub fn map(&self) -> Properties {
        let mut map = Properties::new();
        for sheet in &self.stylesheets {
            cascade_properties(&mut map, sheet.map());
        }
        map
    }

    /// Flattened rules that apply to a layer, before filters are checked.
    ///
    /// `layer` selects by id; wildcard rules always apply. `None` selects
    /// rules with no id.
    pub fn layer_rules(&self, layer: Option<&str>) -> RuleList {
        self.stylesheets
            .iter()
            .flat_map(|sheet| sheet.rules().select_by_id(layer, true).flatten())
            .collect()
    }

    /// Attribute names a layer's rules read from candidates.
    pub fn fields(&self, layer: Option<&str>) -> BTreeSet<String> {
        self.layer_rules(layer).fields()
    }

    /// Compute the drawing passes for a candidate on a layer.
    ///
    /// This performs the full cascade:
    /// 1. Select the layer's rules (by id, wildcards included)
    /// 2. Flatten nesting into standalone rules
    /// 3. Keep rules whose filters accept the candidate
    /// 4. Group by attachment
    /// 5. Collapse each group, later rules overriding earlier ones
    ///
    /// An empty result means nothing styles this candidate.
    pub fn resolve(&self, layer: Option<&str>, candidate: &dyn Candidate) -> Vec<StylePass> {
        let matched = self.layer_rules(layer).matching(candidate);
        let passes: Vec<StylePass> = matched
            .zgroup()
            .into_iter()
            .map(|group| StylePass {
                properties: group.rules.collapse(),
                attachment: group.attachment,
            })
            .collect();

        tracing::trace!(
            target: targets::CASCADE,
            layer = ?layer,
            rules = matched.len(),
            passes = passes.len(),
            "resolved candidate"
        );
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::Feature;

    fn resolver(text: &str) -> StyleResolver {
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(Stylesheet::parse(text).unwrap());
        resolver
    }

    #[test]
    fn resolver_basic_resolution() {
        let resolver = resolver("#roads { line-color: #f00; line-width: 2; }");
        let passes = resolver.resolve(Some("roads"), &Feature::new());

        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].attachment, None);
        assert_eq!(
            passes[0].properties.get("line-width").and_then(|v| v.as_f64()),
            Some(2.0)
        );
        assert!(resolver.resolve(Some("rivers"), &Feature::new()).is_empty());
    }

    #[test]
    fn resolver_filters_and_nesting() {
        let resolver = resolver(
            "#roads { line-width: 1; [type = 'major'] { line-width: 4; } }",
        );
        let minor = Feature::new().with("type", "minor");
        let major = Feature::new().with("type", "major");

        let width = |f: &Feature| {
            resolver.resolve(Some("roads"), f)[0]
                .properties
                .get("line-width")
                .and_then(|v| v.as_f64())
        };
        assert_eq!(width(&minor), Some(1.0));
        assert_eq!(width(&major), Some(4.0));
    }

    #[test]
    fn resolver_attachments_become_passes() {
        let resolver = resolver(
            "#roads::casing { line-width: 5; } #roads::fill { line-width: 3; } * { opacity: 1; }",
        );
        let passes = resolver.resolve(Some("roads"), &Feature::new());
        let attachments: Vec<_> = passes.iter().map(|p| p.attachment.as_deref()).collect();
        assert_eq!(attachments, vec![Some("casing"), Some("fill"), None]);
    }

    #[test]
    fn later_stylesheets_win() {
        let mut resolver = resolver("#a { x: 1; y: 1; } Map { background-color: white; }");
        resolver.add_stylesheet(Stylesheet::parse("#a { x: 2; } Map { buffer: 8; }").unwrap());

        let passes = resolver.resolve(Some("a"), &Feature::new());
        assert_eq!(passes[0].properties.get("x").and_then(|v| v.as_f64()), Some(2.0));
        assert_eq!(passes[0].properties.get("y").and_then(|v| v.as_f64()), Some(1.0));

        let map = resolver.map();
        assert_eq!(map.len(), 2);
        assert_eq!(resolver.stylesheet_count(), 2);
        assert_eq!(resolver.rule_count(), 2);
    }

    #[test]
    fn fields_for_layer() {
        let resolver = resolver("#a[pop > 1] { text-name: [NAME]; } #b[kind = 'x'] { w: 1; }");
        let fields: Vec<_> = resolver.fields(Some("a")).into_iter().collect();
        assert_eq!(fields, vec!["NAME", "pop"]);
    }

    #[test]
    fn remove_by_path() {
        let mut sheet = Stylesheet::parse("#a { x: 1; }").unwrap();
        sheet.source_path = Some("a.mss".into());
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(sheet);
        resolver.add_stylesheet(Stylesheet::parse("#b { x: 1; }").unwrap());

        resolver.remove_stylesheet_by_path(Path::new("a.mss"));
        assert_eq!(resolver.stylesheet_count(), 1);
        resolver.clear_stylesheets();
        assert_eq!(resolver.rule_count(), 0);
    }

    #[test]
    fn replace_by_path_keeps_position() {
        let sheet = |text: &str, path: &str| {
            let mut sheet = Stylesheet::parse(text).unwrap();
            sheet.source_path = Some(path.into());
            sheet
        };
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(sheet("#a { w: 1; }", "base.mss"));
        resolver.add_stylesheet(sheet("#a { w: 2; }", "top.mss"));

        let reloaded = sheet("#a { w: 3; }", "base.mss");
        assert!(resolver.replace_stylesheet_by_path(Path::new("base.mss"), reloaded));
        assert_eq!(resolver.stylesheet_count(), 2);
        let passes = resolver.resolve(Some("a"), &Feature::new());
        assert_eq!(passes[0].properties.get("w").and_then(|v| v.as_f64()), Some(2.0));

        let added = sheet("#a { w: 4; }", "new.mss");
        assert!(!resolver.replace_stylesheet_by_path(Path::new("new.mss"), added));
        assert_eq!(resolver.stylesheet_count(), 3);
        let passes = resolver.resolve(Some("a"), &Feature::new());
        assert_eq!(passes[0].properties.get("w").and_then(|v| v.as_f64()), Some(4.0));
    }
}
