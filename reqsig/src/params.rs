use indexmap::IndexMap;
use std::collections::BTreeMap;

/* ---------------------------------------- */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Request parameters as given by the caller.
///
/// Keys are kept as they were written, in write order: re-inserting a key moves it to the end,
/// so that keys colliding after lowercasing resolve to the latest write.
/// Lowercasing happens only in [`ParameterMap::normalized`].
pub struct ParameterMap {
  inner: IndexMap<String, String>,
}

impl ParameterMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a parameter, returning the previous value written under exactly the same key
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    let key = key.into();
    let previous = self.inner.shift_remove(&key);
    self.inner.insert(key, value.into());
    previous
  }

  /// Get a parameter by its exact key
  pub fn get(&self, key: &str) -> Option<&str> {
    self.inner.get(key).map(|v| v.as_str())
  }

  /// Get a parameter by its lowercased key, as the canonicalizer would see it
  pub fn get_normalized(&self, key: &str) -> Option<&str> {
    let key = key.to_lowercase();
    self
      .inner
      .iter()
      .rev()
      .find(|(k, _)| k.to_lowercase() == key)
      .map(|(_, v)| v.as_str())
  }

  pub fn remove(&mut self, key: &str) -> Option<String> {
    self.inner.shift_remove(key)
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Keys lowercased and sorted in byte order, values untouched
  pub fn normalized(&self) -> BTreeMap<String, String> {
    self.inner.iter().map(|(k, v)| (k.to_lowercase(), v.clone())).collect()
  }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ParameterMap {
  fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
    iter.into_iter().for_each(|(k, v)| {
      self.insert(k, v);
    });
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterMap {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut map = Self::new();
    map.extend(iter);
    map
  }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ParameterMap {
  fn from(value: [(K, V); N]) -> Self {
    value.into_iter().collect()
  }
}

impl IntoIterator for ParameterMap {
  type Item = (String, String);
  type IntoIter = indexmap::map::IntoIter<String, String>;

  fn into_iter(self) -> Self::IntoIter {
    self.inner.into_iter()
  }
}
