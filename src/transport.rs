//! HTTP transport seam.
//!
//! The executor describes each exchange as a plain [`HttpRequest`] and hands
//! it to a [`Transport`], which performs exactly one round trip. The default
//! implementation uses the blocking reqwest client; tests plug in their own.

use crate::client::create_rest_client;
use crate::error::{RestError, Result};
use crate::response::Info;
use crate::upload::Multipart;
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// HTTP verbs supported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Options => "OPTIONS",
        }
    }

    /// Only POST, PUT and PATCH carry a request body
    pub fn allows_body(&self) -> bool {
        matches!(self, Verb::Post | Verb::Put | Verb::Patch)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" => Ok(Verb::Delete),
            "OPTIONS" => Ok(Verb::Options),
            _ => Err(RestError::RequestBuild(format!(
                "Unsupported HTTP method: {}",
                s
            ))),
        }
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
            Verb::Options => Method::OPTIONS,
        }
    }
}

/// Encoded request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as-is
    Bytes(Vec<u8>),
    /// Sent as multipart/form-data; the transport sets the boundary
    Form(Multipart),
}

impl RequestBody {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Bytes(bytes) => Some(bytes),
            RequestBody::Form(_) => None,
        }
    }

    pub fn as_form(&self) -> Option<&Multipart> {
        match self {
            RequestBody::Form(form) => Some(form),
            RequestBody::Bytes(_) => None,
        }
    }
}

/// A fully composed request, ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub verb: Verb,
    /// Absolute URL including the query string
    pub url: String,
    /// Headers in sending order; names may repeat
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// What came back from the server
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    /// Diagnostics for debug mode
    pub info: Info,
}

/// The exchange could not be completed
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub message: String,
    pub info: Info,
}

/// Outcome of one round trip
pub type SendResult = std::result::Result<RawResponse, TransportFailure>;

/// Performs one HTTP round trip per call.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> SendResult;
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Ok(ReqwestTransport {
            client: create_rest_client()?,
        })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> SendResult {
        let mut info = Info::new();
        info.insert("url".into(), Value::String(request.url.clone()));
        info.insert("method".into(), Value::String(request.verb.to_string()));
        info.insert("started_at".into(), Value::String(Utc::now().to_rfc3339()));
        info.insert(
            "request_header".into(),
            Value::Array(
                request
                    .headers
                    .iter()
                    .map(|(k, v)| Value::String(format!("{}: {}", k, v)))
                    .collect(),
            ),
        );

        let start = Instant::now();
        let fail = |message: String, mut info: Info| {
            info.insert("http_code".into(), Value::from(0));
            info.insert(
                "total_time".into(),
                Value::from(start.elapsed().as_secs_f64()),
            );
            TransportFailure { message, info }
        };

        let form = match request.body.as_ref().and_then(RequestBody::as_form) {
            Some(form) => match form.to_form() {
                Ok(form) => Some(form),
                Err(e) => return Err(fail(format!("invalid multipart body: {}", e), info)),
            },
            None => None,
        };

        let mut builder = self.client.request(request.verb.into(), &request.url);
        for (name, value) in &request.headers {
            // reqwest writes the multipart Content-Type itself, boundary included
            if form.is_some() && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(form) = form {
            builder = builder.multipart(form);
        } else if let Some(bytes) = request.body.as_ref().and_then(RequestBody::as_bytes) {
            info.insert("size_upload".into(), Value::from(bytes.len()));
            builder = builder.body(bytes.to_vec());
        }

        let response = match builder.send() {
            Ok(response) => response,
            Err(e) => return Err(fail(e.to_string(), info)),
        };

        let status = response.status().as_u16();
        info.insert("http_code".into(), Value::from(status));
        info.insert("url".into(), Value::String(response.url().to_string()));
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            info.insert(
                "content_type".into(),
                Value::String(content_type.to_string()),
            );
        }
        if let Some(addr) = response.remote_addr() {
            info.insert("primary_ip".into(), Value::String(addr.ip().to_string()));
            info.insert("primary_port".into(), Value::from(addr.port()));
        }

        let body = match response.bytes() {
            Ok(body) => body,
            Err(e) => {
                return Err(fail(
                    format!("failed to read response body: {}", e),
                    info,
                ))
            }
        };

        info.insert("size_download".into(), Value::from(body.len()));
        info.insert(
            "total_time".into(),
            Value::from(start.elapsed().as_secs_f64()),
        );

        Ok(RawResponse {
            status,
            body: String::from_utf8_lossy(&body).to_string(),
            info,
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every request and answers with a canned reply
    pub(crate) struct MockTransport {
        requests: Mutex<Vec<HttpRequest>>,
        reply: std::result::Result<(u16, String), String>,
    }

    impl MockTransport {
        pub(crate) fn reply(status: u16, body: &str) -> Arc<Self> {
            Arc::new(MockTransport {
                requests: Mutex::new(Vec::new()),
                reply: Ok((status, body.to_string())),
            })
        }

        pub(crate) fn fail(message: &str) -> Arc<Self> {
            Arc::new(MockTransport {
                requests: Mutex::new(Vec::new()),
                reply: Err(message.to_string()),
            })
        }

        pub(crate) fn sent(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Query string of the only request sent
        pub(crate) fn last_query(&self) -> String {
            let sent = self.sent();
            assert_eq!(sent.len(), 1, "expected exactly one request");
            sent[0]
                .url
                .split_once('?')
                .map(|(_, q)| q.to_string())
                .unwrap_or_default()
        }
    }

    impl Transport for MockTransport {
        fn send(&self, request: &HttpRequest) -> SendResult {
            self.requests.lock().unwrap().push(request.clone());

            let mut info = Info::new();
            info.insert("url".into(), Value::String(request.url.clone()));
            match &self.reply {
                Ok((status, body)) => {
                    info.insert("http_code".into(), Value::from(*status));
                    Ok(RawResponse {
                        status: *status,
                        body: body.clone(),
                        info,
                    })
                }
                Err(message) => Err(TransportFailure {
                    message: message.clone(),
                    info,
                }),
            }
        }
    }
}
