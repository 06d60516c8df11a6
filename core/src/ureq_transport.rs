//! Blocking transport on top of `ureq`.
//!
//! Status codes are returned as data (`http_status_as_error(false)`), so a
//! 500 reaches the listener as a normal `Done` snapshot instead of an error.

use tracing::{debug, trace};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReadyState, StateListener, Transport};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &HttpRequest,
        listener: &mut dyn StateListener,
    ) -> Result<(), TransportError> {
        listener.on_state_change(ReadyState::Opened, &HttpResponse::default());
        debug!(method = request.method.as_str(), url = %request.path, "sending request");

        let mut builder = self.agent.post(&request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let result = match &request.body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        };
        let mut response = result.map_err(|e| TransportError::Io(e.to_string()))?;

        let mut snapshot = HttpResponse {
            status: response.status().as_u16(),
            headers: response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
            body: Vec::new(),
        };
        listener.on_state_change(ReadyState::HeadersReceived, &snapshot);
        listener.on_state_change(ReadyState::Loading, &snapshot);

        // ureq caps bodies at 10 MiB by default; the body is applied whole.
        snapshot.body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        trace!(status = snapshot.status, bytes = snapshot.body.len(), "response complete");
        listener.on_state_change(ReadyState::Done, &snapshot);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ureq"
    }
}
