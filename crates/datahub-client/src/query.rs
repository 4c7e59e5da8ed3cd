//! Query parameters forwarded to the catalogue endpoints.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Key/value query parameters.
///
/// Keys are kept sorted so a given set always serializes to the same
/// query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameters every catalogue request carries.
    pub fn data_spec() -> Self {
        Self::new().with("dataSpec", "1.1.0")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: &QueryParams) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
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

    /// Form-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_keys() {
        let params = QueryParams::new()
            .with("styleName", "iso_fill_bu_gn_30_100_pc")
            .with("dataSpec", "1.1.0");
        assert_eq!(
            params.to_query_string(),
            "dataSpec=1.1.0&styleName=iso_fill_bu_gn_30_100_pc"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let params: QueryParams = [("q", "a b&c")].into_iter().collect();
        assert_eq!(params.to_query_string(), "q=a+b%26c");
    }

    #[test]
    fn test_empty() {
        assert_eq!(QueryParams::new().to_query_string(), "");
        assert!(QueryParams::new().is_empty());
    }

    #[test]
    fn test_merge_overrides() {
        let mut params = QueryParams::data_spec();
        params.merge(&QueryParams::new().with("dataSpec", "2.0.0").with("x", "1"));
        assert_eq!(params.get("dataSpec"), Some("2.0.0"));
        assert_eq!(params.len(), 2);
    }
}
