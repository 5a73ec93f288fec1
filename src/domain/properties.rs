use super::{Binder, Module};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Flat configuration properties keyed by dotted path.
///
/// Values stay opaque strings; coercion happens when configuration is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    entries: BTreeMap<String, String>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for PropertyStore {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.set(key, value);
        }
        store
    }
}

/// Synthetic module exposing test properties as a configuration source.
///
/// Appended last at finalization and never a valid override target.
#[derive(Debug, Clone)]
pub struct PropertiesModule {
    properties: PropertyStore,
}

impl PropertiesModule {
    pub const NAME: &'static str = "TestRuntimeBuilder:properties";

    pub fn new(properties: PropertyStore) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }
}

impl Module for PropertiesModule {
    fn configure(&self, binder: &mut Binder) {
        binder.contribute_properties(self.properties.clone());
    }
}
