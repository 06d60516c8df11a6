//! Error types for the dispatcher, transports and the web-service client.
//!
//! # Design
//! The dispatcher itself never returns these to its caller: a failed
//! dispatch only shows up as a `DispatchOutcome` and a log line. The
//! web-service client, which has a real result to hand back, propagates
//! them with `?`.

/// A round trip could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    Io(String),

    /// The request is not something the transport can send.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport returned without ever reaching the terminal state.
    #[error("transport finished without a terminal state")]
    Incomplete,

    /// No HTTP client was compiled into this build.
    #[error("no HTTP transport available in this build")]
    Unavailable,
}

/// Element lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("no element with id `{0}`")]
    ElementNotFound(String),
}

/// Request construction failures in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Errors returned by `WebServiceClient` parse methods and `Session`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with something other than 200.
    #[error("the http request failed: {status} {body}")]
    HttpError { status: u16, body: String },

    /// A JSON response that is not a `success`/`error`/`content` envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// The envelope reported `success: false`.
    #[error("the NineML web application reported an error: {0}")]
    Application(String),

    #[error("unrecognized content type: `{0}`")]
    UnrecognizedContentType(String),

    /// The response was well formed but not the kind the action produces.
    #[error("expected {expected} content, received {found}")]
    UnexpectedContent {
        expected: &'static str,
        found: &'static str,
    },

    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {name}: `{value}`")]
    InvalidValue { name: &'static str, value: String },
}
