//! Stateless request builder and response parser for the NineML web application.
//!
//! # Design
//! Mirrors the dispatcher's framing: every action is a form-url-encoded POST
//! to one endpoint. Each action is split into a `build_*` method producing an
//! `HttpRequest` and a `parse_*` method consuming the `HttpResponse`; the
//! round trip in between belongs to a `Transport` (see `session`).
//!
//! JSON responses are envelopes `{"success": .., "error": .., "content": ..}`
//! and all three keys must be present.

use tracing::trace;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::form::FormBody;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, FORM_CONTENT_TYPE};
use crate::types::{
    Action, ServiceContent, ACTION_FIELD, APPLICATION_ID_FIELD, COMPONENT_FIELD,
    INITIAL_VALUES_FIELD,
};

#[derive(Debug, Clone)]
pub struct WebServiceClient {
    endpoint: String,
    user_agent: String,
}

impl WebServiceClient {
    /// `endpoint` is the full URL of the web application, e.g. `http://localhost/nineml-webapp`.
    pub fn new(endpoint: &str, user_agent: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.endpoint_url(), &config.user_agent)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_get_application_id(&self) -> HttpRequest {
        self.build(FormBody::new().field(ACTION_FIELD, Action::GetApplicationId.as_str()))
    }

    pub fn build_get_available_components(&self) -> HttpRequest {
        self.build(FormBody::new().field(ACTION_FIELD, Action::GetAvailableComponents.as_str()))
    }

    pub fn build_set_component(&self, application_id: &str, component: &str) -> HttpRequest {
        self.build(
            session_form(Action::SetComponent, application_id).field(COMPONENT_FIELD, component),
        )
    }

    pub fn build_display_gui(&self, application_id: &str, initial_values: &str) -> HttpRequest {
        self.build(
            session_form(Action::DisplayGui, application_id)
                .field(INITIAL_VALUES_FIELD, initial_values),
        )
    }

    pub fn build_generate_report(&self, application_id: &str) -> HttpRequest {
        self.build(session_form(Action::GenerateReport, application_id))
    }

    pub fn build_download_pdf(&self, application_id: &str) -> HttpRequest {
        self.build(session_form(Action::DownloadPdf, application_id))
    }

    pub fn build_download_zip(&self, application_id: &str) -> HttpRequest {
        self.build(session_form(Action::DownloadZip, application_id))
    }

    pub fn parse_application_id(&self, response: HttpResponse) -> Result<String, ServiceError> {
        expect_json_string(parse_response(response)?)
    }

    pub fn parse_available_components(&self, response: HttpResponse) -> Result<Vec<String>, ServiceError> {
        match parse_response(response)? {
            ServiceContent::Json(value) => {
                serde_json::from_value(value).map_err(|e| ServiceError::Deserialization(e.to_string()))
            }
            other => Err(unexpected("json", &other)),
        }
    }

    pub fn parse_set_component(&self, response: HttpResponse) -> Result<String, ServiceError> {
        expect_json_string(parse_response(response)?)
    }

    /// GUI markup, delivered either inside an envelope or as plain `text/html`.
    pub fn parse_display_gui(&self, response: HttpResponse) -> Result<String, ServiceError> {
        match parse_response(response)? {
            ServiceContent::Html(html) => Ok(html),
            other => expect_json_string(other),
        }
    }

    pub fn parse_generate_report(&self, response: HttpResponse) -> Result<ServiceContent, ServiceError> {
        parse_response(response)
    }

    pub fn parse_download_pdf(&self, response: HttpResponse) -> Result<Vec<u8>, ServiceError> {
        match parse_response(response)? {
            ServiceContent::Pdf(bytes) => Ok(bytes),
            other => Err(unexpected("pdf", &other)),
        }
    }

    pub fn parse_download_zip(&self, response: HttpResponse) -> Result<Vec<u8>, ServiceError> {
        match parse_response(response)? {
            ServiceContent::Zip(bytes) => Ok(bytes),
            other => Err(unexpected("zip", &other)),
        }
    }

    fn build(&self, form: FormBody) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.endpoint.clone(),
            headers: vec![
                ("content-type".to_string(), FORM_CONTENT_TYPE.to_string()),
                ("user-agent".to_string(), self.user_agent.clone()),
                ("accept".to_string(), "text/plain".to_string()),
            ],
            body: Some(form.encode()),
        }
    }
}

fn session_form(action: Action, application_id: &str) -> FormBody {
    FormBody::new()
        .field(ACTION_FIELD, action.as_str())
        .field(APPLICATION_ID_FIELD, application_id)
}

/// Decode any response from the endpoint according to its content type.
pub fn parse_response(response: HttpResponse) -> Result<ServiceContent, ServiceError> {
    if response.status != 200 {
        return Err(ServiceError::HttpError {
            status: response.status,
            body: response.text(),
        });
    }
    let media_type = response.media_type().unwrap_or_default();
    trace!(%media_type, bytes = response.body.len(), "parsing service response");
    match media_type.as_str() {
        "application/json" => parse_envelope(&response.body).map(ServiceContent::Json),
        "application/pdf" => Ok(ServiceContent::Pdf(response.body)),
        "application/zip" => Ok(ServiceContent::Zip(response.body)),
        "text/html" => Ok(ServiceContent::Html(response.text())),
        _ => Err(ServiceError::UnrecognizedContentType(media_type)),
    }
}

fn parse_envelope(body: &[u8]) -> Result<serde_json::Value, ServiceError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ServiceError::InvalidEnvelope(e.to_string()))?;
    let serde_json::Value::Object(mut envelope) = value else {
        return Err(ServiceError::InvalidEnvelope("not a JSON object".to_string()));
    };
    for key in ["success", "error", "content"] {
        if !envelope.contains_key(key) {
            return Err(ServiceError::InvalidEnvelope(format!("missing `{key}`")));
        }
    }
    let success = envelope
        .get("success")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| ServiceError::InvalidEnvelope("`success` is not a boolean".to_string()))?;
    if !success {
        let message = match envelope.remove("error") {
            Some(serde_json::Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        return Err(ServiceError::Application(message));
    }
    Ok(envelope.remove("content").unwrap_or_default())
}

fn expect_json_string(content: ServiceContent) -> Result<String, ServiceError> {
    match content {
        ServiceContent::Json(serde_json::Value::String(s)) => Ok(s),
        ServiceContent::Json(_) => Err(ServiceError::UnexpectedContent {
            expected: "string",
            found: "json",
        }),
        other => Err(unexpected("json", &other)),
    }
}

fn unexpected(expected: &'static str, found: &ServiceContent) -> ServiceError {
    ServiceError::UnexpectedContent {
        expected,
        found: found.kind(),
    }
}
