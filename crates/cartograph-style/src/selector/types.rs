//! Selector types.

use std::fmt;

use super::Filter;

/// What a selector primarily targets.
///
/// Id takes precedence over name, name over class, class over wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Name,
    Id,
    Class,
    Wildcard,
}

/// One comma-separated alternative in a rule's selector list.
///
/// A selector like `#roads.major[kind = 'highway']::casing` has an id, a
/// class, a filter and an attachment. An absent filter always matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    /// Name selector, e.g. `Map` or `Layer`.
    pub name: Option<String>,
    /// Id selector without the leading `#`.
    pub id: Option<String>,
    /// Class selectors without the leading `.`, in source order.
    pub classes: Vec<String>,
    /// Set by `*`.
    pub wildcard: bool,
    pub filter: Option<Filter>,
    /// Z-order band, written `::tag`.
    pub attachment: Option<String>,
}

impl Selector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a name selector.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    /// Create an id selector.
    pub fn id(id: impl Into<String>) -> Self {
        Self::new().with_id(id)
    }

    /// Create a class selector.
    pub fn class(class: impl Into<String>) -> Self {
        Self::new().with_class(class)
    }

    /// Create a wildcard selector.
    pub fn wildcard() -> Self {
        Self {
            wildcard: true,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    /// AND `filter` into this selector's filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.and_filter(filter);
        self
    }

    /// AND `filter` into this selector's filter.
    pub fn and_filter(&mut self, filter: Filter) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
    }

    /// OR `filter` into this selector's filter.
    pub fn or_filter(&mut self, filter: Filter) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.or(filter),
            None => filter,
        });
    }

    /// The selector kind, or `None` for a selector with only a filter or
    /// attachment.
    pub fn kind(&self) -> Option<SelectorKind> {
        if self.id.is_some() {
            Some(SelectorKind::Id)
        } else if self.name.is_some() {
            Some(SelectorKind::Name)
        } else if !self.classes.is_empty() {
            Some(SelectorKind::Class)
        } else if self.wildcard {
            Some(SelectorKind::Wildcard)
        } else {
            None
        }
    }

    /// Returns true if nothing has been set on this selector.
    pub fn is_empty(&self) -> bool {
        self.kind().is_none() && self.filter.is_none() && self.attachment.is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        if self.wildcard {
            f.write_str("*")?;
        }
        if let Some(filter) = &self.filter {
            write!(f, "[{filter}]")?;
        }
        if let Some(attachment) = &self.attachment {
            write!(f, "::{attachment}")?;
        }
        Ok(())
    }
}
