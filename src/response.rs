use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Param is a convenience type for request bodies sent to the API.
pub type Param = Map<String, Value>;

/// Diagnostics collected for one exchange when debug mode is on.
pub type Info = Map<String, Value>;

/// Response body, either JSON-decoded or kept as the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Parsed JSON; `Value::Null` when the payload was not valid JSON
    Json(Value),
    /// Undecoded response text
    Raw(String),
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Body::Json(value) => value.serialize(serializer),
            Body::Raw(text) => serializer.serialize_str(text),
        }
    }
}

impl Body {
    /// Parse a response payload as JSON, yielding `Null` on failure
    pub fn parse(raw: &str) -> Self {
        Body::Json(serde_json::from_str(raw).unwrap_or(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Body::Raw(text) => Some(text),
            Body::Json(_) => None,
        }
    }
}

/// Decide how a response payload is exposed to the caller.
///
/// | decode | status | result            |
/// |--------|--------|-------------------|
/// | true   | any    | JSON-parsed       |
/// | false  | 200    | raw text          |
/// | false  | other  | JSON-parsed       |
///
/// Non-200 payloads are error documents and are parsed regardless of the flag.
pub fn decode_body(decode: bool, http_code: u16, raw: String) -> Body {
    match (decode, http_code) {
        (true, _) => Body::parse(&raw),
        (false, 200) => Body::Raw(raw),
        (false, _) => Body::parse(&raw),
    }
}

/// Normalized result of one HTTP exchange: `{body, httpCode, info?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    /// Decoded or raw response body
    pub body: Body,

    /// HTTP status; `0` when no response was received
    #[serde(rename = "httpCode")]
    pub http_code: u16,

    /// Transport diagnostics, present only in debug mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    /// Final request URL (not serialized, it carries the token)
    #[serde(skip)]
    pub url: String,

    /// Transport failure description when `http_code` is `0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Whether the API answered with 200
    pub fn is_success(&self) -> bool {
        self.http_code == 200
    }

    /// Whether the exchange failed before any HTTP status was received
    pub fn is_transport_failure(&self) -> bool {
        self.http_code == 0
    }

    /// Get a value from a JSON body by a slash-separated path.
    /// For example, "Lead/Email" would access the "Email" field inside "Lead".
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = self.body.as_json()?;

        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from a JSON body by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Deserialize a JSON body into the provided type
    pub fn apply<T>(&self) -> crate::error::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = match &self.body {
            Body::Json(value) => value.clone(),
            Body::Raw(text) => serde_json::from_str(text)?,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Human-readable error text carried by the body.
    ///
    /// Looks at `message` first, then (if asked) at `mensagens`, whose entries
    /// are joined with CRLF.
    pub fn remote_message(&self, with_mensagens: bool) -> Option<String> {
        let body = self.body.as_json()?;

        match body.get("message") {
            None | Some(Value::Null) => {}
            Some(Value::String(text)) => return Some(text.clone()),
            Some(other) => return Some(other.to_string()),
        }

        if !with_mensagens {
            return None;
        }

        match body.get("mensagens")? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("\r\n"),
            ),
            Value::String(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Serialize the envelope as the API fallback error text
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{{\"httpCode\":{}}}", self.http_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn envelope(body: Body, http_code: u16) -> ResponseEnvelope {
        ResponseEnvelope {
            body,
            http_code,
            info: None,
            url: String::new(),
            error: None,
        }
    }

    #[test]
    fn test_decode_enabled_always_parses() {
        assert_eq!(decode_body(true, 200, r#"{"Id":1}"#.into()), Body::Json(json!({"Id": 1})));
        assert_eq!(decode_body(true, 500, r#"{"Id":1}"#.into()), Body::Json(json!({"Id": 1})));
    }

    #[test]
    fn test_decode_disabled_keeps_raw_on_200() {
        assert_eq!(decode_body(false, 200, r#"{"Id":1}"#.into()), Body::Raw(r#"{"Id":1}"#.into()));
    }

    #[test]
    fn test_decode_disabled_parses_errors() {
        assert_eq!(
            decode_body(false, 400, r#"{"message":"x"}"#.into()),
            Body::Json(json!({"message": "x"}))
        );
    }

    #[test]
    fn test_invalid_json_becomes_null() {
        assert_eq!(decode_body(true, 200, "<html>".into()), Body::Json(Value::Null));
        assert_eq!(decode_body(false, 502, String::new()), Body::Json(Value::Null));
    }

    #[test]
    fn test_envelope_get() {
        let response = envelope(
            Body::Json(json!({"Lead": {"Email": "x@y.com"}, "Items": [1, 2]})),
            200,
        );
        assert_eq!(response.get_string("Lead/Email"), Some("x@y.com".to_string()));
        assert_eq!(response.get("Items/1"), Some(&json!(2)));
        assert_eq!(response.get("Lead/Missing"), None);
    }

    #[test]
    fn test_envelope_apply_from_raw() {
        #[derive(Deserialize)]
        struct Created {
            #[serde(rename = "Id")]
            id: i64,
        }

        let response = envelope(Body::Raw(r#"{"Id":42}"#.into()), 200);
        let created: Created = response.apply().unwrap();
        assert_eq!(created.id, 42);
    }

    #[test]
    fn test_serialization_shape() {
        let response = envelope(Body::Raw("ok".into()), 200);
        assert_eq!(response.to_json_string(), r#"{"body":"ok","httpCode":200}"#);
    }

    #[test]
    fn test_remote_message_prefers_message() {
        let response = envelope(Body::Json(json!({"message": "m", "mensagens": ["a"]})), 400);
        assert_eq!(response.remote_message(true), Some("m".to_string()));
    }
}
