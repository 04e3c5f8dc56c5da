//! Records that stylesheets are resolved against.

use std::collections::{BTreeMap, HashMap};

use crate::Literal;

/// A record whose attributes can be read by predicates and attribute
/// references.
///
/// Missing attributes return `None`; predicate engines report them as
/// evaluation errors and the cascade engine treats those as "no match".
pub trait Candidate {
    /// Look up an attribute by name.
    fn attribute(&self, name: &str) -> Option<Literal>;
}

impl<C: Candidate + ?Sized> Candidate for &C {
    fn attribute(&self, name: &str) -> Option<Literal> {
        (**self).attribute(name)
    }
}

impl Candidate for HashMap<String, Literal> {
    fn attribute(&self, name: &str) -> Option<Literal> {
        self.get(name).cloned()
    }
}

impl Candidate for BTreeMap<String, Literal> {
    fn attribute(&self, name: &str) -> Option<Literal> {
        self.get(name).cloned()
    }
}

/// A simple attribute record, such as a map feature read from a data source.
///
/// # Example
///
/// ```
/// use cartograph_core::{Candidate, Feature, Literal};
///
/// let city = Feature::new().with("NAME", "Lisbon").with("pop", 545_000);
/// assert_eq!(city.attribute("pop"), Some(Literal::Integer(545_000)));
/// assert_eq!(city.attribute("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    id: Option<String>,
    attributes: BTreeMap<String, Literal>,
}

impl Feature {
    /// Create an empty feature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feature identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add an attribute.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Literal>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Get an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.attributes.get(name)
    }

    /// The feature identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Iterate over attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Candidate for Feature {
    fn attribute(&self, name: &str) -> Option<Literal> {
        self.attributes.get(name).cloned()
    }
}
