//! Ordered property maps.

use indexmap::IndexMap;
use indexmap::map::Entry;

use super::Value;

/// An insertion-ordered map of property names to values.
///
/// [`set`](Self::set) replaces existing values in place, so a key keeps the
/// position of its first declaration. [`append`](Self::append) accumulates
/// repeated declarations into a [`Value::Composite`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: IndexMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property. The last assignment wins.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Add a value under `key`, accumulating with any existing value.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Composite(parts) => parts.push(value),
                existing => {
                    let first = std::mem::replace(existing, Value::Composite(Vec::new()));
                    *existing = Value::Composite(vec![first, value]);
                }
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_last_write_wins_in_first_position() {
        let mut props = Properties::new();
        props.set("a", 1);
        props.set("b", 2);
        props.set("a", 3);
        assert_eq!(props.get("a"), Some(&Value::from(3)));
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn append_accumulates() {
        let mut props = Properties::new();
        props.append("a", 1);
        assert_eq!(props.get("a"), Some(&Value::from(1)));
        props.append("a", 2);
        props.append("a", 3);
        assert_eq!(
            props.get("a"),
            Some(&Value::Composite(vec![
                Value::from(1),
                Value::from(2),
                Value::from(3)
            ]))
        );
    }
}
