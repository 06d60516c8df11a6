//! POST a form payload and load the answer into a document element.
//!
//! # Design
//! `RequestDispatcher` owns the transport chosen at startup and the
//! document it writes to. A dispatch is three steps:
//!
//! 1. `build_request` frames the call: POST, form-url-encoded content type,
//!    payload sent verbatim.
//! 2. The transport runs the round trip, reporting each state to a
//!    single-shot `Completion`.
//! 3. On `Done` with status 200 the completion replaces the target
//!    element's HTML with the body. Every other outcome leaves the document
//!    alone and is only logged.
//!
//! Asynchronous dispatches run on their own worker thread, so concurrent
//! dispatches to one element finish in arrival order and the last one wins.

use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, debug_span, warn};
use url::Url;

use crate::document::Document;
use crate::error::DispatchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{self, Completion, Transport};

/// The only status that updates the document.
pub const STATUS_OK: u16 = 200;

/// What happened to one dispatch. The document is only touched for `Applied`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The target element now holds the response body.
    Applied { bytes: usize },
    /// The server answered with a status other than 200.
    Ignored { status: u16 },
    /// 200 arrived but the target element does not exist.
    MissingElement,
    /// The transport returned without reaching `Done`.
    Incomplete,
    /// The request could not be built or sent.
    Failed { reason: String },
}

/// Join point for a dispatch.
///
/// Dropping the handle does not cancel anything; an asynchronous dispatch
/// keeps running and still updates the document.
#[derive(Debug)]
pub struct DispatchHandle {
    inner: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Finished(DispatchOutcome),
    Running(JoinHandle<DispatchOutcome>),
}

impl DispatchHandle {
    fn finished(outcome: DispatchOutcome) -> Self {
        Self {
            inner: HandleState::Finished(outcome),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.inner {
            HandleState::Finished(_) => true,
            HandleState::Running(handle) => handle.is_finished(),
        }
    }

    /// Block until the dispatch has completed.
    pub fn wait(self) -> DispatchOutcome {
        match self.inner {
            HandleState::Finished(outcome) => outcome,
            HandleState::Running(handle) => handle.join().unwrap_or_else(|_| DispatchOutcome::Failed {
                reason: "dispatch worker panicked".to_string(),
            }),
        }
    }
}

pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    document: Arc<dyn Document>,
    base_url: Option<Url>,
}

impl RequestDispatcher {
    /// Dispatcher using the transport picked by `transport::detect()`.
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self::with_transport(transport::detect(), document)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, document: Arc<dyn Document>) -> Self {
        Self {
            transport,
            document,
            base_url: None,
        }
    }

    /// Resolve relative endpoint addresses against `base_url`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Frame a dispatch request without sending it.
    pub fn build_request(&self, endpoint: &str, payload: &str) -> Result<HttpRequest, DispatchError> {
        let path = match &self.base_url {
            Some(base) => base
                .join(endpoint)
                .map_err(|e| DispatchError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?
                .to_string(),
            None if endpoint.is_empty() => {
                return Err(DispatchError::InvalidEndpoint {
                    endpoint: String::new(),
                    reason: "empty address and no base url".to_string(),
                })
            }
            None => endpoint.to_string(),
        };
        Ok(HttpRequest::form_post(path, payload))
    }

    /// POST `payload` to `endpoint` and load a 200 response into `target`.
    ///
    /// With `asynchronous` set the call returns immediately and the round
    /// trip runs on a worker thread. Otherwise it returns once the transport
    /// is finished and the returned handle is already complete.
    pub fn dispatch(
        &self,
        target: &str,
        endpoint: &str,
        payload: &str,
        asynchronous: bool,
    ) -> DispatchHandle {
        let request = match self.build_request(endpoint, payload) {
            Ok(request) => request,
            Err(error) => {
                warn!(%error, element = target, "dispatch rejected");
                return DispatchHandle::finished(DispatchOutcome::Failed {
                    reason: error.to_string(),
                });
            }
        };
        let span = debug_span!(
            "dispatch",
            element = target,
            url = %request.path,
            transport = self.transport.name(),
            asynchronous
        );

        if !asynchronous {
            let _entered = span.enter();
            return DispatchHandle::finished(run(
                self.transport.as_ref(),
                self.document.as_ref(),
                target,
                &request,
            ));
        }

        let transport = Arc::clone(&self.transport);
        let document = Arc::clone(&self.document);
        let target = target.to_string();
        let spawned = std::thread::Builder::new()
            .name("dispatch".to_string())
            .spawn(move || {
                let _entered = span.enter();
                run(transport.as_ref(), document.as_ref(), &target, &request)
            });
        match spawned {
            Ok(handle) => DispatchHandle {
                inner: HandleState::Running(handle),
            },
            Err(error) => {
                warn!(%error, "could not start dispatch worker");
                DispatchHandle::finished(DispatchOutcome::Failed {
                    reason: error.to_string(),
                })
            }
        }
    }
}

fn run(
    transport: &dyn Transport,
    document: &dyn Document,
    target: &str,
    request: &HttpRequest,
) -> DispatchOutcome {
    let mut completion =
        Completion::new(|response: &HttpResponse| apply_response(document, target, response));
    let sent = transport.send(request, &mut completion);
    match (sent, completion.into_outcome()) {
        (_, Some(outcome)) => outcome,
        (Ok(()), None) => {
            debug!("transport stopped before completion");
            DispatchOutcome::Incomplete
        }
        (Err(error), None) => {
            warn!(%error, "dispatch failed");
            DispatchOutcome::Failed {
                reason: error.to_string(),
            }
        }
    }
}

/// Apply a terminal response to `target`. Non-200 responses change nothing.
pub fn apply_response(document: &dyn Document, target: &str, response: &HttpResponse) -> DispatchOutcome {
    if response.status != STATUS_OK {
        debug!(status = response.status, "ignoring response");
        return DispatchOutcome::Ignored {
            status: response.status,
        };
    }
    match document.set_inner_html(target, &response.text()) {
        Ok(()) => {
            debug!(bytes = response.body.len(), "element updated");
            DispatchOutcome::Applied {
                bytes: response.body.len(),
            }
        }
        Err(error) => {
            warn!(%error, "response arrived for a missing element");
            DispatchOutcome::MissingElement
        }
    }
}
