use crate::response::ResponseEnvelope;
use thiserror::Error;

/// Main error type for Leadlovers API operations
#[derive(Debug, Error)]
pub enum RestError {
    /// Required input fields were missing; raised before any network call
    #[error("{}", messages.join("\r\n"))]
    Validation { messages: Vec<String> },

    /// Error returned by the API (any non-200 response)
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        envelope: Box<ResponseEnvelope>,
    },

    /// The HTTP exchange itself failed (connection, timeout, unreadable body)
    #[error("transport error: {message}")]
    Transport { message: String, url: String },

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RestError {
    /// Create a validation error from the list of violated requirements
    pub fn validation(messages: Vec<String>) -> Self {
        RestError::Validation { messages }
    }

    /// Translate a non-200 envelope into the matching error.
    ///
    /// `mensagens` is only consulted when `with_mensagens` is set; read-only
    /// endpoints never report it. Envelopes without a recognizable error
    /// shape fall back to their JSON serialization.
    pub fn from_envelope(envelope: ResponseEnvelope, with_mensagens: bool) -> Self {
        if envelope.is_transport_failure() {
            return RestError::Transport {
                message: envelope
                    .error
                    .clone()
                    .unwrap_or_else(|| "no response received".to_string()),
                url: envelope.url.clone(),
            };
        }

        let message = envelope
            .remote_message(with_mensagens)
            .unwrap_or_else(|| envelope.to_json_string());

        RestError::Api {
            message,
            status: envelope.http_code,
            envelope: Box::new(envelope),
        }
    }

    /// Check if this error was raised before reaching the network
    pub fn is_validation(&self) -> bool {
        matches!(self, RestError::Validation { .. })
    }

    /// Check if this error is a connectivity failure rather than an API answer
    pub fn is_transport(&self) -> bool {
        matches!(self, RestError::Transport { .. })
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, RestError::Api { status: 404, .. })
    }

    /// Get the HTTP status code if the API answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Api { status, .. } => Some(*status),
            RestError::Transport { .. } => Some(0),
            _ => None,
        }
    }
}

/// Result type for Leadlovers operations
pub type Result<T> = std::result::Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Body;
    use serde_json::json;

    fn envelope(code: u16, body: serde_json::Value) -> ResponseEnvelope {
        ResponseEnvelope {
            body: Body::Json(body),
            http_code: code,
            info: None,
            url: "http://localhost/webapi/lead".to_string(),
            error: None,
        }
    }

    #[test]
    fn test_validation_joins_all_messages() {
        let error = RestError::validation(vec![
            "Email is required".into(),
            "MachineCode is required".into(),
        ]);
        assert_eq!(error.to_string(), "Email is required\r\nMachineCode is required");
        assert!(error.is_validation());
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_error_message_field() {
        let error =
            RestError::from_envelope(envelope(400, json!({"message": "duplicate email"})), true);
        assert_eq!(error.to_string(), "duplicate email");
        assert_eq!(error.status_code(), Some(400));
    }

    #[test]
    fn test_error_mensagens_field() {
        let error = RestError::from_envelope(envelope(400, json!({"mensagens": ["a", "b"]})), true);
        assert_eq!(error.to_string(), "a\r\nb");
    }

    #[test]
    fn test_mensagens_ignored_when_not_consulted() {
        let error = RestError::from_envelope(envelope(400, json!({"mensagens": ["a"]})), false);
        let text = error.to_string();
        assert!(text.contains("\"httpCode\":400"), "got {}", text);
        assert!(text.contains("mensagens"));
    }

    #[test]
    fn test_error_not_found() {
        let error = RestError::from_envelope(envelope(404, json!(null)), true);
        assert!(error.is_not_found());
    }

    #[test]
    fn test_transport_failure_envelope() {
        let mut failed = envelope(0, json!(null));
        failed.error = Some("connection refused".to_string());

        let error = RestError::from_envelope(failed, true);
        assert!(error.is_transport());
        assert_eq!(error.status_code(), Some(0));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_request_build_error_is_not_transport() {
        let source = reqwest::blocking::Client::new()
            .get("not a url")
            .send()
            .unwrap_err();
        let error: RestError = source.into();

        assert!(matches!(error, RestError::Reqwest(_)));
        assert!(!error.is_transport());
        assert_eq!(error.status_code(), None);
    }
}
