use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved key naming the device-type template a dictionary extends.
pub const EXTENDS_KEY: &str = "extends";

/// Key/value overrides for one device, layered on a device-type template.
///
/// Keys are kept sorted so every serialization of a dictionary is
/// deterministic. The `extends` entry lives in the same map as the
/// overrides, mirroring how the server stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceDictionary {
    values: BTreeMap<String, String>,
}

impl DeviceDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the device-type template this dictionary extends, if any.
    pub fn extends(&self) -> Option<&str> {
        self.get(EXTENDS_KEY)
    }

    pub fn set_extends(&mut self, template: impl Into<String>) {
        self.values.insert(EXTENDS_KEY.to_string(), template.into());
    }

    /// Bind `key` to `value`. A later binding of the same key wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterates over the override bindings in key order, skipping `extends`.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != EXTENDS_KEY)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeviceDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}
