//! Translation maps and the atomically swapped active map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Key → template associations for one locale.
///
/// Serialized as a flat JSON object of strings, which is also the wire format
/// of a fetched locale payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMap(HashMap<String, String>);

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.0.insert(key.into(), template.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// A new map with `other` layered on top; keys in `other` win.
    pub fn merged_with(&self, other: &TranslationMap) -> TranslationMap {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        TranslationMap(merged)
    }
}

impl From<HashMap<String, String>> for TranslationMap {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for TranslationMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// The active translation map of a store.
///
/// Readers take an `Arc` snapshot, so a replacement is never observed half
/// applied: a snapshot is either entirely the old map or entirely the new one.
#[derive(Debug, Default)]
pub struct Translations {
    active: RwLock<Arc<TranslationMap>>,
}

impl Translations {
    pub fn new(initial: TranslationMap) -> Self {
        Self {
            active: RwLock::new(Arc::new(initial)),
        }
    }

    /// Current map snapshot.
    pub fn snapshot(&self) -> Arc<TranslationMap> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the active map wholesale. Keys absent from `map` are gone.
    pub fn load(&self, map: TranslationMap) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(map);
    }

    /// Merge `entries` over the active map and load the result.
    pub fn add(&self, entries: &TranslationMap) {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *active = Arc::new(active.merged_with(entries));
    }

    pub fn has(&self, key: &str) -> bool {
        self.snapshot().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_flat_json_payload() {
        let map: TranslationMap =
            serde_json::from_str(r#"{"GREETING": "Hello, {name}", "BYE": "Bye"}"#)
                .expect("Should deserialize");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("GREETING"), Some("Hello, {name}"));
    }

    #[test]
    fn test_nested_payload_is_rejected() {
        let result: Result<TranslationMap, _> =
            serde_json::from_str(r#"{"MENU": {"OPEN": "Open"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_replaces_previous_entries() {
        let translations = Translations::new(TranslationMap::from([("A", "1")]));

        translations.load(TranslationMap::from([("B", "2")]));

        assert!(!translations.has("A"));
        assert!(translations.has("B"));
    }

    #[test]
    fn test_add_keeps_previous_entries() {
        let translations = Translations::default();
        translations.load(TranslationMap::from([("A", "1")]));

        translations.add(&TranslationMap::from([("B", "2")]));

        assert!(translations.has("A"));
        assert!(translations.has("B"));
    }

    #[test]
    fn test_add_overrides_existing_values() {
        let translations = Translations::new(TranslationMap::from([("A", "old"), ("B", "keep")]));

        translations.add(&TranslationMap::from([("A", "new")]));

        let snapshot = translations.snapshot();
        assert_eq!(snapshot.get("A"), Some("new"));
        assert_eq!(snapshot.get("B"), Some("keep"));
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_load() {
        let translations = Translations::new(TranslationMap::from([("A", "1")]));
        let before = translations.snapshot();

        translations.load(TranslationMap::new());

        assert_eq!(before.get("A"), Some("1"));
        assert!(translations.snapshot().is_empty());
    }

    #[test]
    fn test_has_is_exact_match() {
        let translations = Translations::new(TranslationMap::from([("KEY", "v")]));
        assert!(translations.has("KEY"));
        assert!(!translations.has("key"));
        assert!(!translations.has("KEY.other"));
    }
}
