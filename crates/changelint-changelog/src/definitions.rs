//! Link reference definitions of a changelog

use crate::markdown::Definition;
use crate::version;

/// Definitions keyed by lower-cased identifier, in insertion order
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    entries: Vec<(String, Definition)>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Definition> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, definition)| definition)
    }

    /// Insert a definition under its lower-cased identifier
    pub fn insert(&mut self, definition: Definition) {
        let key = definition.identifier.to_lowercase();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = definition,
            None => self.entries.push((key, definition)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Definition> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Whether keys are in latest-first version order
    pub fn is_sorted(&self) -> bool {
        version::is_sorted(self.keys())
    }

    /// Reorder keys latest-first; keys that are not versions go last
    pub fn sort(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| version::compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(identifier: &str, url: &str) -> Definition {
        Definition {
            identifier: identifier.to_string(),
            label: identifier.to_string(),
            url: url.to_string(),
            title: None,
        }
    }

    #[test]
    fn test_insert_keeps_position_on_replace() {
        let mut definitions = Definitions::new();
        definitions.insert(definition("1.0.0", "a"));
        definitions.insert(definition("homepage", "b"));
        definitions.insert(definition("1.0.0", "c"));

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions.keys().collect::<Vec<_>>(), vec!["1.0.0", "homepage"]);
        assert_eq!(definitions.get("1.0.0").unwrap().url, "c");
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut definitions = Definitions::new();
        definitions.insert(definition("1.0.0-RC.1", "a"));

        assert!(definitions.get("1.0.0-rc.1").is_some());
        assert!(definitions.get("1.0.0-RC.1").is_some());
    }

    #[test]
    fn test_sort_latest_first() {
        let mut definitions = Definitions::new();
        definitions.insert(definition("1.0.0", "a"));
        definitions.insert(definition("homepage", "b"));
        definitions.insert(definition("2.0.0", "c"));
        assert!(!definitions.is_sorted());

        definitions.sort();
        assert!(definitions.is_sorted());
        assert_eq!(
            definitions.keys().collect::<Vec<_>>(),
            vec!["2.0.0", "1.0.0", "homepage"]
        );
    }
}
