use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ACTION_FIELD: &str = "__NINEML_ACTION__";
pub const APPLICATION_ID_FIELD: &str = "__NINEML_WEBAPP_ID__";

/// Components every mock instance offers.
pub const COMPONENTS: [&str; 4] = [
    "hierachical_iaf_1coba",
    "iaf",
    "izhikevich",
    "hodgkin_huxley",
];

/// Body of every `application/json` answer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub error: String,
    pub content: serde_json::Value,
}

impl Envelope {
    pub fn ok(content: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            error: String::new(),
            content: content.into(),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            content: serde_json::Value::Null,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WebappSession {
    pub component: Option<String>,
    pub initial_values: String,
    pub report_ready: bool,
}

pub type Db = Arc<RwLock<HashMap<Uuid, WebappSession>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/nineml-webapp", post(webapp))
        .route("/api/components", post(components_fragment))
        .route("/api/echo", post(echo))
        .route("/api/fail", post(fail))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn webapp(State(db): State<Db>, Form(form): Form<HashMap<String, String>>) -> Response {
    let Some(action) = form.get(ACTION_FIELD) else {
        return (StatusCode::BAD_REQUEST, "missing __NINEML_ACTION__").into_response();
    };
    tracing::debug!(%action, "webapp request");

    match action.as_str() {
        "getApplicationID" => {
            let id = Uuid::new_v4();
            db.write().await.insert(id, WebappSession::default());
            Json(Envelope::ok(id.to_string())).into_response()
        }
        "getAvailableALComponents" => Json(Envelope::ok(COMPONENTS.to_vec())).into_response(),
        "setALComponent" | "displayGUI" | "generateReport" | "downloadPDF" | "downloadZIP" => {
            session_action(&db, action, &form).await
        }
        other => (StatusCode::BAD_REQUEST, format!("unknown action `{other}`")).into_response(),
    }
}

async fn session_action(db: &Db, action: &str, form: &HashMap<String, String>) -> Response {
    let id = match form.get(APPLICATION_ID_FIELD).map(|s| Uuid::parse_str(s)) {
        Some(Ok(id)) => id,
        _ => return Json(Envelope::err("missing or malformed application id")).into_response(),
    };
    let mut sessions = db.write().await;
    let Some(session) = sessions.get_mut(&id) else {
        return Json(Envelope::err(format!("unknown application id {id}"))).into_response();
    };

    match action {
        "setALComponent" => {
            let name = form.get("TestableComponent").cloned().unwrap_or_default();
            if !COMPONENTS.contains(&name.as_str()) {
                return Json(Envelope::err(format!("unknown component `{name}`"))).into_response();
            }
            session.component = Some(name.clone());
            session.report_ready = false;
            Json(Envelope::ok(name)).into_response()
        }
        "displayGUI" => {
            let Some(component) = &session.component else {
                return Json(Envelope::err("no component selected")).into_response();
            };
            session.initial_values = form.get("InitialValues").cloned().unwrap_or_default();
            let gui = format!(
                "<form id=\"{component}\"><textarea name=\"InitialValues\">{}</textarea></form>",
                session.initial_values
            );
            Json(Envelope::ok(gui)).into_response()
        }
        "generateReport" => {
            if session.component.is_none() {
                return Json(Envelope::err("no component selected")).into_response();
            }
            session.report_ready = true;
            Json(Envelope::ok("report generated")).into_response()
        }
        "downloadPDF" | "downloadZIP" => {
            if !session.report_ready {
                return Json(Envelope::err("no report has been generated")).into_response();
            }
            let component = session.component.clone().unwrap_or_default();
            if action == "downloadPDF" {
                let body = format!("%PDF-1.4\n% report for {component}\n%%EOF\n").into_bytes();
                ([(header::CONTENT_TYPE, "application/pdf")], body).into_response()
            } else {
                let mut body = b"PK\x03\x04".to_vec();
                body.extend_from_slice(component.as_bytes());
                ([(header::CONTENT_TYPE, "application/zip")], body).into_response()
            }
        }
        _ => (StatusCode::BAD_REQUEST, "unsupported action").into_response(),
    }
}

async fn components_fragment() -> Html<String> {
    let items: String = COMPONENTS.iter().map(|c| format!("<li>{c}</li>")).collect();
    Html(format!("<ul>{items}</ul>"))
}

async fn echo(headers: HeaderMap, body: String) -> Result<Html<String>, StatusCode> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    Ok(Html(body))
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
