//! # leadlovers - Leadlovers API client for Rust
//!
//! A blocking client for the Leadlovers marketing-automation REST API.
//! It takes care of authentication, request construction, response decoding
//! and error reporting, so callers work with products, leads, e-mail
//! sequences and tags instead of HTTP details.
//!
//! ## Features
//!
//! - One HTTP exchange per call; no hidden retries, caching or pagination
//! - Token authentication via the `token` query parameter
//! - Predictable query-parameter precedence (caller, then operation, then token)
//! - Debug mode exposing transport diagnostics on every response
//! - Upload mode sending multipart/form-data bodies
//! - Distinct errors for validation, remote API and transport failures
//!
//! ## Basic Usage
//!
//! ```no_run
//! use leadlovers::{json, Leadlovers};
//!
//! fn main() -> Result<(), leadlovers::RestError> {
//!     let ll = Leadlovers::new("my-token")?;
//!
//!     let created = ll.create_lead(
//!         &json!({
//!             "Name": "Ana",
//!             "Email": "ana@example.com",
//!             "MachineCode": 123,
//!             "EmailSequenceCode": 456,
//!             "SequenceLevelCode": 1
//!         }),
//!         Vec::new(),
//!     )?;
//!
//!     println!("Lead: {:?}", created.get("Id"));
//!     Ok(())
//! }
//! ```
//!
//! ## Raw requests
//!
//! ```no_run
//! use leadlovers::{Config, Leadlovers, QueryParam};
//!
//! let ll = Leadlovers::with_config(Config::new("my-token").with_debug(true))?;
//! let envelope = ll.get("products", vec![QueryParam::new("page", 2)], Vec::new());
//!
//! if envelope.is_transport_failure() {
//!     eprintln!("no answer: {:?}", envelope.error);
//! }
//! # Ok::<(), leadlovers::RestError>(())
//! ```

pub mod client;
pub mod error;
pub mod params;
pub mod resources;
pub mod response;
pub mod rest;
pub mod transport;
pub mod upload;

// Re-export main types for convenience
pub use client::{Config, API_URL};
pub use error::{RestError, Result};
pub use params::{QueryParam, QueryParams};
pub use response::{decode_body, Body, Info, Param, ResponseEnvelope};
pub use rest::{Headers, Leadlovers, Payload, RequestSpec};
pub use transport::{
    HttpRequest, RawResponse, ReqwestTransport, RequestBody, SendResult, Transport,
    TransportFailure, Verb,
};
pub use upload::{FormField, Multipart};

// Re-export serde_json for convenience
pub use serde_json::json;
