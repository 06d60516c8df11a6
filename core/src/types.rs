//! Wire vocabulary of the NineML web application endpoint.
//!
//! # Design
//! The endpoint multiplexes every operation over one URL; the form field
//! `__NINEML_ACTION__` selects the action and `__NINEML_WEBAPP_ID__`
//! carries the application id once one has been issued.

use std::fmt;
use std::str::FromStr;

/// Form field naming the server-side action.
pub const ACTION_FIELD: &str = "__NINEML_ACTION__";

/// Form field carrying the application id.
pub const APPLICATION_ID_FIELD: &str = "__NINEML_WEBAPP_ID__";

pub const COMPONENT_FIELD: &str = "TestableComponent";

pub const INITIAL_VALUES_FIELD: &str = "InitialValues";

/// Default path of the endpoint on the server.
pub const ENDPOINT_PATH: &str = "/nineml-webapp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetApplicationId,
    GetAvailableComponents,
    SetComponent,
    DisplayGui,
    GenerateReport,
    DownloadPdf,
    DownloadZip,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::GetApplicationId,
        Action::GetAvailableComponents,
        Action::SetComponent,
        Action::DisplayGui,
        Action::GenerateReport,
        Action::DownloadPdf,
        Action::DownloadZip,
    ];

    /// Value sent in `__NINEML_ACTION__`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetApplicationId => "getApplicationID",
            Action::GetAvailableComponents => "getAvailableALComponents",
            Action::SetComponent => "setALComponent",
            Action::DisplayGui => "displayGUI",
            Action::GenerateReport => "generateReport",
            Action::DownloadPdf => "downloadPDF",
            Action::DownloadZip => "downloadZIP",
        }
    }

    /// Whether the server needs `__NINEML_WEBAPP_ID__` for this action.
    pub fn requires_application_id(&self) -> bool {
        !matches!(self, Action::GetApplicationId | Action::GetAvailableComponents)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Decoded body of a successful response, by content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceContent {
    /// `content` of an `application/json` envelope.
    Json(serde_json::Value),
    Html(String),
    Pdf(Vec<u8>),
    Zip(Vec<u8>),
}

impl ServiceContent {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceContent::Json(_) => "json",
            ServiceContent::Html(_) => "html",
            ServiceContent::Pdf(_) => "pdf",
            ServiceContent::Zip(_) => "zip",
        }
    }
}
