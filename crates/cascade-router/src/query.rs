//! Query string values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decoded query-string values
///
/// Repeated keys keep the last value, matching how the values are consumed:
/// one value per key, overridable by ambient values.
///
/// # Examples
///
/// ```
/// use cascade_router::SearchValues;
///
/// let values = SearchValues::parse("page=2&sort=name&page=3");
/// assert_eq!(values.get("page"), Some("3"));
/// assert_eq!(values.get("sort"), Some("name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchValues(BTreeMap<String, String>);

impl SearchValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query (leading `?` allowed)
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overrides entries with `other`'s values
    pub fn merge(&mut self, other: &SearchValues) {
        self.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes back to a query string (without `?`)
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_and_strips_marker() {
        let values = SearchValues::parse("?q=hello+world&tag=a%26b");
        assert_eq!(values.get("q"), Some("hello world"));
        assert_eq!(values.get("tag"), Some("a&b"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_parse_empty() {
        assert!(SearchValues::parse("").is_empty());
        assert!(SearchValues::parse("?").is_empty());
    }

    #[test]
    fn test_merge_overrides() {
        let mut values = SearchValues::parse("a=1&b=2");
        values.merge(&SearchValues::new().with("b", "3").with("c", "4"));
        assert_eq!(values.get("a"), Some("1"));
        assert_eq!(values.get("b"), Some("3"));
        assert_eq!(values.get("c"), Some("4"));
    }

    #[test]
    fn test_to_query_string() {
        let values: SearchValues = [("b", "2"), ("a", "x y")].into_iter().collect();
        assert_eq!(values.to_query_string(), "a=x+y&b=2");
    }
}
