//! Style/property bags attached to nodes, edges and the graph

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of an [`ElementData`]: either `key=value` or a bare atom such as `->`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Property {
    pub fn is_atom(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

/// Ordered key/value properties. Keys are unique; insertion order is kept
/// because it is significant in TikZ option lists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementData {
    properties: Vec<Property>,
}

impl ElementData {
    pub fn new() -> Self {
        ElementData::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.key == key)
    }

    /// Set `key=value`, replacing any existing entry in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key.into(), Some(value.into()));
    }

    /// Set a bare atom (a key with no value).
    pub fn set_atom(&mut self, key: impl Into<String>) {
        self.put(key.into(), None);
    }

    fn put(&mut self, key: String, value: Option<String>) {
        match self.position(&key) {
            Some(i) => self.properties[i].value = value,
            None => self.properties.push(Property { key, value }),
        }
    }

    /// Value for `key`; `None` for atoms and missing keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .and_then(|i| self.properties[i].value.as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn is_atom(&self, key: &str) -> bool {
        self.position(key)
            .is_some_and(|i| self.properties[i].is_atom())
    }

    /// Remove `key`, returning whether it was present.
    pub fn unset(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.properties.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// TikZ option list, e.g. `[style=red, ->]`. Empty string when there are no properties.
    pub fn tikz_list(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self.properties.iter().map(ToString::to_string).collect();
        format!("[{}]", items.join(", "))
    }
}

impl fmt::Display for ElementData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tikz_list())
    }
}

impl<K, V> FromIterator<(K, V)> for ElementData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut data = ElementData::new();
        for (key, value) in iter {
            data.set(key, value);
        }
        data
    }
}
