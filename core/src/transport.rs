//! The transport seam: "an HTTP client capable of POST + completion notification".
//!
//! # Design
//! A `Transport` runs one round trip on the calling thread and reports every
//! lifecycle transition to a `StateListener`, together with a snapshot of
//! the response received so far. Which transport a process uses is decided
//! once, by `detect()`, rather than per request.
//!
//! `Completion` turns the per-transition stream into a single-shot
//! subscription: it ignores everything before `ReadyState::Done` and runs
//! its handler at most once.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Lifecycle of a single round trip. Only `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadyState {
    Unsent,
    Opened,
    HeadersReceived,
    Loading,
    Done,
}

impl ReadyState {
    pub fn is_terminal(self) -> bool {
        self == ReadyState::Done
    }
}

/// Receives every state transition of a round trip.
pub trait StateListener {
    fn on_state_change(&mut self, state: ReadyState, snapshot: &HttpResponse);
}

impl<F> StateListener for F
where
    F: FnMut(ReadyState, &HttpResponse),
{
    fn on_state_change(&mut self, state: ReadyState, snapshot: &HttpResponse) {
        self(state, snapshot)
    }
}

/// Performs HTTP round trips.
///
/// `send` blocks until the round trip is over. Implementations report
/// `Done` exactly once on success; when they return `Err` they may have
/// reported some non-terminal states first.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &HttpRequest,
        listener: &mut dyn StateListener,
    ) -> Result<(), TransportError>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}

/// Single-shot completion handler.
pub struct Completion<F, T> {
    handler: Option<F>,
    outcome: Option<T>,
}

impl<F, T> Completion<F, T>
where
    F: FnOnce(&HttpResponse) -> T,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler: Some(handler),
            outcome: None,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.handler.is_none()
    }

    /// The handler's return value, or `None` if `Done` was never reported.
    pub fn into_outcome(self) -> Option<T> {
        self.outcome
    }
}

impl<F, T> StateListener for Completion<F, T>
where
    F: FnOnce(&HttpResponse) -> T,
{
    fn on_state_change(&mut self, state: ReadyState, snapshot: &HttpResponse) {
        if !state.is_terminal() {
            return;
        }
        if let Some(handler) = self.handler.take() {
            self.outcome = Some(handler(snapshot));
        }
    }
}

/// Run one round trip and return the terminal response.
pub fn execute(
    transport: &dyn Transport,
    request: &HttpRequest,
) -> Result<HttpResponse, TransportError> {
    let mut completion = Completion::new(|response: &HttpResponse| response.clone());
    transport.send(request, &mut completion)?;
    completion.into_outcome().ok_or(TransportError::Incomplete)
}

/// Pick the transport for this process.
///
/// Builds with the `http` feature get the ureq-backed `HttpTransport`;
/// anything else gets `OfflineTransport`.
#[cfg(feature = "http")]
pub fn detect() -> Arc<dyn Transport> {
    tracing::debug!("selected ureq http transport");
    Arc::new(crate::ureq_transport::HttpTransport::new())
}

#[cfg(not(feature = "http"))]
pub fn detect() -> Arc<dyn Transport> {
    tracing::warn!("no http transport compiled in; requests will fail");
    Arc::new(OfflineTransport)
}

/// Fails every request with `TransportError::Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn send(
        &self,
        _request: &HttpRequest,
        _listener: &mut dyn StateListener,
    ) -> Result<(), TransportError> {
        Err(TransportError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// In-memory transport that replays a fixed script.
///
/// Every request received is recorded. The canned response is reported
/// progressively: status appears at `HeadersReceived`, the body at `Done`.
#[derive(Debug)]
pub struct ScriptedTransport {
    states: Vec<ReadyState>,
    response: HttpResponse,
    failure: Option<TransportError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Full lifecycle ending in `Done` with the given status and body.
    pub fn respond(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::with_states(
            vec![
                ReadyState::Opened,
                ReadyState::HeadersReceived,
                ReadyState::Loading,
                ReadyState::Done,
            ],
            HttpResponse::new(status, body),
        )
    }

    /// Lifecycle that stops at `last` and never completes.
    pub fn stall_at(last: ReadyState, status: u16, body: impl Into<Vec<u8>>) -> Self {
        let states = [
            ReadyState::Opened,
            ReadyState::HeadersReceived,
            ReadyState::Loading,
        ]
        .into_iter()
        .filter(|state| *state <= last)
        .collect();
        Self::with_states(states, HttpResponse::new(status, body))
    }

    /// Reports `Opened`, then fails.
    pub fn fail(error: TransportError) -> Self {
        let mut transport = Self::with_states(vec![ReadyState::Opened], HttpResponse::default());
        transport.failure = Some(error);
        transport
    }

    pub fn with_states(states: Vec<ReadyState>, response: HttpResponse) -> Self {
        Self {
            states,
            response,
            failure: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before reporting `Done`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.response = self.response.with_header(name, value);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn snapshot(&self, state: ReadyState) -> HttpResponse {
        match state {
            ReadyState::Unsent | ReadyState::Opened => HttpResponse::default(),
            ReadyState::HeadersReceived | ReadyState::Loading => HttpResponse {
                status: self.response.status,
                headers: self.response.headers.clone(),
                body: Vec::new(),
            },
            ReadyState::Done => self.response.clone(),
        }
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &HttpRequest,
        listener: &mut dyn StateListener,
    ) -> Result<(), TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        for &state in &self.states {
            if state.is_terminal() {
                if let Some(delay) = self.delay {
                    std::thread::sleep(delay);
                }
            }
            listener.on_state_change(state, &self.snapshot(state));
        }

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
