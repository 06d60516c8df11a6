//! Form-POST dispatcher and NineML web application client.
//!
//! # Overview
//! `RequestDispatcher` sends a form-url-encoded POST and, when the response
//! completes with HTTP 200, replaces one document element's HTML with the
//! body. Anything else leaves the document untouched.
//!
//! # Design
//! - Requests and responses are plain data (`http`); a `Transport` performs
//!   the round trip and reports each `ReadyState` to a listener.
//! - The transport is chosen once per process (`transport::detect`), not
//!   per request.
//! - `Completion` is the single-shot subscription: it ignores non-terminal
//!   states and runs its handler at most once.
//! - `WebServiceClient` follows the same build/parse split for the NineML
//!   web application's actions; `Session` drives it over a transport.

pub mod config;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod form;
pub mod http;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;
#[cfg(feature = "http")]
pub mod ureq_transport;

pub use config::ServiceConfig;
pub use dispatcher::{DispatchHandle, DispatchOutcome, RequestDispatcher};
pub use document::{Document, MemoryDocument};
pub use error::{ConfigError, DispatchError, DocumentError, ServiceError, TransportError};
pub use form::FormBody;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::WebServiceClient;
pub use session::Session;
pub use transport::{Completion, ReadyState, ScriptedTransport, StateListener, Transport};
pub use types::{Action, ServiceContent};
#[cfg(feature = "http")]
pub use ureq_transport::HttpTransport;
