//! A conversation with one NineML web application instance.
//!
//! Opening a session asks the server for an application id; every later
//! action carries that id.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ServiceError;
use crate::http::{HttpRequest, HttpResponse};
use crate::service::WebServiceClient;
use crate::transport::{self, Transport};
use crate::types::ServiceContent;

pub struct Session {
    client: WebServiceClient,
    transport: Arc<dyn Transport>,
    application_id: String,
}

impl Session {
    pub fn open(client: WebServiceClient, transport: Arc<dyn Transport>) -> Result<Self, ServiceError> {
        let request = client.build_get_application_id();
        let response = transport::execute(transport.as_ref(), &request)?;
        let application_id = client.parse_application_id(response)?;
        info!(%application_id, endpoint = client.endpoint(), "session opened");
        Ok(Self {
            client,
            transport,
            application_id,
        })
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn available_components(&self) -> Result<Vec<String>, ServiceError> {
        let response = self.round_trip(self.client.build_get_available_components())?;
        self.client.parse_available_components(response)
    }

    pub fn set_component(&self, component: &str) -> Result<String, ServiceError> {
        let response = self.round_trip(self.client.build_set_component(&self.application_id, component))?;
        self.client.parse_set_component(response)
    }

    pub fn display_gui(&self, initial_values: &str) -> Result<String, ServiceError> {
        let response =
            self.round_trip(self.client.build_display_gui(&self.application_id, initial_values))?;
        self.client.parse_display_gui(response)
    }

    pub fn generate_report(&self) -> Result<ServiceContent, ServiceError> {
        let response = self.round_trip(self.client.build_generate_report(&self.application_id))?;
        self.client.parse_generate_report(response)
    }

    pub fn download_pdf(&self) -> Result<Vec<u8>, ServiceError> {
        let response = self.round_trip(self.client.build_download_pdf(&self.application_id))?;
        self.client.parse_download_pdf(response)
    }

    pub fn download_zip(&self) -> Result<Vec<u8>, ServiceError> {
        let response = self.round_trip(self.client.build_download_zip(&self.application_id))?;
        self.client.parse_download_zip(response)
    }

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ServiceError> {
        debug!(body = request.body.as_deref().unwrap_or_default(), "service request");
        Ok(transport::execute(self.transport.as_ref(), &request)?)
    }
}
