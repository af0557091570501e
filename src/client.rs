use crate::error::Result;
use reqwest::blocking::{Client, ClientBuilder};

/// Base URL of the Leadlovers web API
pub const API_URL: &str = "http://llapi.leadlovers.com/webapi";

/// Create the HTTP client for API requests.
///
/// Idle connections are not kept, so every exchange opens and releases its
/// own connection. Timeouts are left at the transport defaults.
pub fn create_rest_client() -> Result<Client> {
    Ok(ClientBuilder::new().pool_max_idle_per_host(0).build()?)
}

/// Configuration for the Leadlovers client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API token, sent as the `token` query parameter
    pub token: String,
    /// Attach transport diagnostics to every response
    pub debug: bool,
    /// Send request bodies as multipart/form-data
    pub upload: bool,
    /// JSON-decode successful responses
    pub decode: bool,
    /// API base URL
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token: String::new(),
            debug: false,
            upload: false,
            decode: true,
            base_url: API_URL.to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Config {
            token: token.into(),
            ..Config::default()
        }
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set upload mode
    pub fn with_upload(mut self, upload: bool) -> Self {
        self.upload = upload;
        self
    }

    /// Set decode mode
    pub fn with_decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Point the client at another host (staging, local mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base header set for every request: `Accept` plus the `Content-Type`
    /// matching the upload mode.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let content_type = if self.upload {
            "multipart/form-data"
        } else {
            "application/json"
        };

        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), content_type.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.token, "");
        assert!(!config.debug);
        assert!(!config.upload);
        assert!(config.decode);
        assert_eq!(config.base_url, "http://llapi.leadlovers.com/webapi");
    }

    #[test]
    fn test_builder() {
        let config = Config::new("abc")
            .with_debug(true)
            .with_upload(true)
            .with_decode(false)
            .with_base_url("http://localhost:8080/webapi/");

        assert_eq!(config.token, "abc");
        assert!(config.debug);
        assert!(config.upload);
        assert!(!config.decode);
        assert_eq!(config.base_url, "http://localhost:8080/webapi");
    }

    #[test]
    fn test_json_headers() {
        let headers = Config::default().default_headers();
        assert_eq!(header(&headers, "Accept"), vec!["application/json"]);
        assert_eq!(header(&headers, "Content-Type"), vec!["application/json"]);
    }

    #[test]
    fn test_upload_headers() {
        let headers = Config::default().with_upload(true).default_headers();
        assert_eq!(header(&headers, "Accept"), vec!["application/json"]);
        assert_eq!(header(&headers, "Content-Type"), vec!["multipart/form-data"]);
    }
}
