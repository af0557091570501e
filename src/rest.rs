use crate::client::Config;
use crate::error::Result;
use crate::params::{QueryParam, QueryParams};
use crate::response::{decode_body, Info, Param, ResponseEnvelope};
use crate::transport::{HttpRequest, ReqwestTransport, RequestBody, Transport, Verb};
use crate::upload::Multipart;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Extra request headers, in sending order
pub type Headers = Vec<(String, String)>;

/// Request body
#[derive(Debug, Clone)]
pub enum Payload {
    /// JSON document; becomes multipart text fields in upload mode
    Json(Value),
    /// Multipart form built with [`Multipart`]
    Multipart(Multipart),
    /// Bytes passed through unmodified
    Raw(Vec<u8>),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<Param> for Payload {
    fn from(param: Param) -> Self {
        Payload::Json(Value::Object(param))
    }
}

impl From<Multipart> for Payload {
    fn from(form: Multipart) -> Self {
        Payload::Multipart(form)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Raw(bytes)
    }
}

impl Payload {
    fn encode(&self, upload: bool) -> RequestBody {
        match self {
            Payload::Json(Value::Object(fields)) if upload => {
                RequestBody::Form(Multipart::from_json_fields(fields))
            }
            Payload::Json(value) => RequestBody::Bytes(value.to_string().into_bytes()),
            Payload::Multipart(form) => RequestBody::Form(form.clone()),
            Payload::Raw(bytes) => RequestBody::Bytes(bytes.clone()),
        }
    }
}

/// Everything needed to perform one API call
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub verb: Verb,
    pub path: String,
    pub body: Option<Payload>,
    /// Extra headers, appended after the defaults
    pub headers: Headers,
    /// Caller-supplied query parameters
    pub query: Vec<QueryParam>,
    /// Parameters the operation injects itself; they override the caller's
    pub reserved: Vec<QueryParam>,
}

impl RequestSpec {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        RequestSpec {
            verb,
            path: path.into(),
            body: None,
            headers: Vec::new(),
            query: Vec::new(),
            reserved: Vec::new(),
        }
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn query(mut self, params: Vec<QueryParam>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn reserve(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.reserved.push(QueryParam::new(name, value));
        self
    }
}

/// Leadlovers API client.
///
/// Holds its own [`Config`]; setters take `&mut self`, so configuration can
/// never change underneath an in-flight request.
#[derive(Clone)]
pub struct Leadlovers {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl Leadlovers {
    /// Create a client for the given token with default settings
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(Config::new(token))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a client sending requests through the given transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Leadlovers { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.config.token = token.into();
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn set_upload(&mut self, upload: bool) {
        self.config.upload = upload;
    }

    pub fn set_decode(&mut self, decode: bool) {
        self.config.decode = decode;
    }

    pub fn token(&self) -> &str {
        &self.config.token
    }

    pub fn debug(&self) -> bool {
        self.config.debug
    }

    pub fn upload(&self) -> bool {
        self.config.upload
    }

    pub fn decode(&self) -> bool {
        self.config.decode
    }

    /// Compose the final request: URL with merged query string, default
    /// headers followed by the caller's, and the encoded body.
    pub fn build_request(&self, spec: &RequestSpec) -> HttpRequest {
        let path = if spec.path.starts_with('/') {
            spec.path.clone()
        } else {
            format!("/{}", spec.path)
        };

        let query = QueryParams::merge(&spec.query, &spec.reserved, &self.config.token);
        let url = format!(
            "{}{}{}",
            self.config.base_url,
            path,
            query.to_query_string()
        );

        let mut headers = self.config.default_headers();
        headers.extend(spec.headers.iter().cloned());

        let body = if spec.verb.allows_body() {
            spec.body
                .as_ref()
                .map(|payload| payload.encode(self.config.upload))
        } else {
            None
        };

        HttpRequest {
            verb: spec.verb,
            url,
            headers,
            body,
        }
    }

    /// Perform exactly one HTTP exchange.
    ///
    /// Never fails: transport problems come back as an envelope with
    /// `http_code == 0` and `error` set. Judging the status is left to the
    /// caller.
    pub fn execute(&self, spec: RequestSpec) -> ResponseEnvelope {
        let request = self.build_request(&spec);
        let start = Instant::now();

        let (http_code, raw, mut info, error) = match self.transport.send(&request) {
            Ok(response) => (response.status, response.body, response.info, None),
            Err(failure) => {
                warn!(
                    verb = %spec.verb,
                    path = %spec.path,
                    error = %failure.message,
                    "leadlovers request failed"
                );
                (0, String::new(), failure.info, Some(failure.message))
            }
        };

        debug!(
            verb = %spec.verb,
            path = %spec.path,
            status = http_code,
            elapsed = ?start.elapsed(),
            "leadlovers request"
        );

        let info = if self.config.debug {
            fill_info(&mut info, &request, http_code, start);
            Some(info)
        } else {
            None
        };

        ResponseEnvelope {
            body: decode_body(self.config.decode, http_code, raw),
            http_code,
            info,
            url: request.url,
            error,
        }
    }

    /// Execute a GET request
    pub fn get(&self, path: &str, params: Vec<QueryParam>, headers: Headers) -> ResponseEnvelope {
        let spec = RequestSpec::new(Verb::Get, path)
            .query(params)
            .headers(headers);
        self.execute(spec)
    }

    /// Execute a POST request
    pub fn post(
        &self,
        path: &str,
        body: impl Into<Payload>,
        params: Vec<QueryParam>,
        headers: Headers,
    ) -> ResponseEnvelope {
        let spec = RequestSpec::new(Verb::Post, path)
            .body(body)
            .query(params)
            .headers(headers);
        self.execute(spec)
    }

    /// Execute a PUT request
    pub fn put(
        &self,
        path: &str,
        body: impl Into<Payload>,
        params: Vec<QueryParam>,
        headers: Headers,
    ) -> ResponseEnvelope {
        let spec = RequestSpec::new(Verb::Put, path)
            .body(body)
            .query(params)
            .headers(headers);
        self.execute(spec)
    }

    /// Execute a PATCH request
    pub fn patch(
        &self,
        path: &str,
        body: impl Into<Payload>,
        params: Vec<QueryParam>,
        headers: Headers,
    ) -> ResponseEnvelope {
        let spec = RequestSpec::new(Verb::Patch, path)
            .body(body)
            .query(params)
            .headers(headers);
        self.execute(spec)
    }

    /// Execute a DELETE request
    pub fn delete(
        &self,
        path: &str,
        params: Vec<QueryParam>,
        headers: Headers,
    ) -> ResponseEnvelope {
        let spec = RequestSpec::new(Verb::Delete, path)
            .query(params)
            .headers(headers);
        self.execute(spec)
    }

    /// Execute an OPTIONS request
    pub fn options(
        &self,
        path: &str,
        params: Vec<QueryParam>,
        headers: Headers,
    ) -> ResponseEnvelope {
        let spec = RequestSpec::new(Verb::Options, path)
            .query(params)
            .headers(headers);
        self.execute(spec)
    }
}

impl std::fmt::Debug for Leadlovers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leadlovers")
            .field("base_url", &self.config.base_url)
            .field("debug", &self.config.debug)
            .field("upload", &self.config.upload)
            .field("decode", &self.config.decode)
            .finish_non_exhaustive()
    }
}

/// Make sure debug diagnostics always carry the basics, whatever the
/// transport reported.
fn fill_info(info: &mut Info, request: &HttpRequest, http_code: u16, start: Instant) {
    info.entry("url")
        .or_insert_with(|| Value::String(request.url.clone()));
    info.entry("method")
        .or_insert_with(|| Value::String(request.verb.to_string()));
    info.entry("http_code")
        .or_insert_with(|| Value::from(http_code));
    info.entry("total_time")
        .or_insert_with(|| Value::from(start.elapsed().as_secs_f64()));
}
