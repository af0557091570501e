//! Query parameters and the precedence rules used to merge them.
//!
//! A request's query string is assembled in three layers, each one
//! overwriting same-named entries of the previous:
//!
//! 1. parameters supplied by the caller, in order;
//! 2. parameters reserved by the operation (`email`, `machineCode`, ...);
//! 3. the `token` parameter from the client configuration.
//!
//! An overwritten name is moved to the end, so reserved parameters follow
//! the caller's and `token` always comes last.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Name of the authentication query parameter
pub const TOKEN_PARAM: &str = "token";

/// A single `name=value` query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        QueryParam {
            name: name.into(),
            value: value.to_string(),
        }
    }

    /// Entries with an empty name or value never reach the URL
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() || self.value.is_empty()
    }
}

/// Ordered query parameters, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: IndexMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        QueryParams::default()
    }

    /// Merge caller parameters, operation-reserved parameters and the token.
    pub fn merge(caller: &[QueryParam], reserved: &[QueryParam], token: &str) -> Self {
        let mut params = QueryParams::new();
        for param in caller.iter().chain(reserved) {
            params.set(param.name.clone(), param.value.clone());
        }
        params.set(TOKEN_PARAM, token);
        params
    }

    /// Set a parameter, replacing any previous value and moving it last
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.shift_remove(&name);
        self.entries.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|v| v.as_str())
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

    /// URL-encoded `?k1=v1&k2=v2`, or an empty string when nothing survives
    /// the blank filter.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut written = 0;

        for (name, value) in self.iter() {
            if name.is_empty() || value.is_empty() {
                continue;
            }
            serializer.append_pair(name, value);
            written += 1;
        }

        if written == 0 {
            return String::new();
        }
        format!("?{}", serializer.finish())
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<I: IntoIterator<Item = QueryParam>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for param in iter {
            params.set(param.name, param.value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_injected_last() {
        let caller = vec![QueryParam::new("page", 2), QueryParam::new("token", "caller")];
        let params = QueryParams::merge(&caller, &[], "secret");

        assert_eq!(params.to_query_string(), "?page=2&token=secret");
        assert_eq!(params.get("token"), Some("secret"));
    }

    #[test]
    fn test_reserved_params_override_caller() {
        let caller = vec![
            QueryParam::new("email", "caller@y.com"),
            QueryParam::new("extra", "1"),
        ];
        let reserved = vec![QueryParam::new("email", "x@y.com")];
        let params = QueryParams::merge(&caller, &reserved, "t");

        assert_eq!(params.to_query_string(), "?extra=1&email=x%40y.com&token=t");
    }

    #[test]
    fn test_reserved_order_is_kept() {
        let caller = vec![
            QueryParam::new("sequenceCode", "9"),
            QueryParam::new("machineCode", "9"),
        ];
        let reserved = vec![
            QueryParam::new("machineCode", 1),
            QueryParam::new("sequenceCode", 2),
            QueryParam::new("email", "x@y.com"),
        ];
        let params = QueryParams::merge(&caller, &reserved, "t");
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();

        assert_eq!(names, vec!["machineCode", "sequenceCode", "email", "token"]);
    }

    #[test]
    fn test_blank_params_are_dropped() {
        let caller = vec![
            QueryParam::new("", "value"),
            QueryParam::new("name", ""),
            QueryParam::new("kept", "yes"),
        ];
        let params = QueryParams::merge(&caller, &[], "t");

        assert_eq!(params.to_query_string(), "?kept=yes&token=t");
    }

    #[test]
    fn test_empty_token_leaves_no_query_string() {
        let params = QueryParams::merge(&[], &[], "");
        assert_eq!(params.to_query_string(), "");
    }

    #[test]
    fn test_values_are_url_encoded() {
        let params: QueryParams = vec![QueryParam::new("q", "a b&c")].into_iter().collect();
        assert_eq!(params.to_query_string(), "?q=a+b%26c");
    }
}
