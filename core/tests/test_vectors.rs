//! Verify the dispatcher and the web-service client against JSON test vectors in `test-vectors/`.
//!
//! Dispatch vectors replay a scripted transport and check the request sent,
//! the outcome, and the resulting element content. Service vectors check the
//! form fields of each `build_*` request and the `parse_*` result.

use std::sync::Arc;

use dispatch_core::{
    Action, Document, DispatchOutcome, FormBody, HttpMethod, HttpResponse, MemoryDocument,
    ReadyState, RequestDispatcher, ScriptedTransport, ServiceError, WebServiceClient,
};
use serde_json::Value;

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_state(s: &str) -> ReadyState {
    match s {
        "Unsent" => ReadyState::Unsent,
        "Opened" => ReadyState::Opened,
        "HeadersReceived" => ReadyState::HeadersReceived,
        "Loading" => ReadyState::Loading,
        "Done" => ReadyState::Done,
        other => panic!("unknown state: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn outcome_name(outcome: &DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Applied { .. } => "Applied",
        DispatchOutcome::Ignored { .. } => "Ignored",
        DispatchOutcome::MissingElement => "MissingElement",
        DispatchOutcome::Incomplete => "Incomplete",
        DispatchOutcome::Failed { .. } => "Failed",
    }
}

fn error_name(error: &ServiceError) -> &'static str {
    match error {
        ServiceError::Transport(_) => "Transport",
        ServiceError::HttpError { .. } => "HttpError",
        ServiceError::InvalidEnvelope(_) => "InvalidEnvelope",
        ServiceError::Application(_) => "Application",
        ServiceError::UnrecognizedContentType(_) => "UnrecognizedContentType",
        ServiceError::UnexpectedContent { .. } => "UnexpectedContent",
        ServiceError::Deserialization(_) => "Deserialization",
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn dispatch_test_vectors() {
    let raw = include_str!("../../test-vectors/dispatch.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let document = Arc::new(MemoryDocument::new());
        for (id, html) in case["document"].as_object().unwrap() {
            document.insert_element(id.clone(), html.as_str().unwrap());
        }

        let script = &case["script"];
        let states = script["states"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| parse_state(s.as_str().unwrap()))
            .collect();
        let response = HttpResponse::new(
            script["status"].as_u64().unwrap() as u16,
            script["body"].as_str().unwrap(),
        );
        let transport = Arc::new(ScriptedTransport::with_states(states, response));
        let dispatcher = RequestDispatcher::with_transport(transport.clone(), document.clone());

        let call = &case["call"];
        let target = call["target"].as_str().unwrap();
        let outcome = dispatcher
            .dispatch(
                target,
                call["endpoint"].as_str().unwrap(),
                call["payload"].as_str().unwrap(),
                call["asynchronous"].as_bool().unwrap(),
            )
            .wait();

        // Verify request
        let requests = transport.requests();
        assert_eq!(requests.len(), 1, "{name}: request count");
        let req = &requests[0];
        let expected_req = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, expected_req["path"].as_str().unwrap(), "{name}: path");
        assert_eq!(req.headers, pairs(&expected_req["headers"]), "{name}: headers");
        assert_eq!(req.body.as_deref(), expected_req["body"].as_str(), "{name}: body");

        // Verify effect
        assert_eq!(outcome_name(&outcome), case["expected_outcome"].as_str().unwrap(), "{name}: outcome");
        assert_eq!(
            document.inner_html(target).as_deref(),
            case["expected_content"].as_str(),
            "{name}: element content"
        );
    }
}

// ---------------------------------------------------------------------------
// Web service
// ---------------------------------------------------------------------------

fn run_service_case(
    client: &WebServiceClient,
    action: Action,
    args: &Value,
    response: HttpResponse,
) -> (dispatch_core::HttpRequest, Result<Value, ServiceError>) {
    let arg = |key: &str| args[key].as_str().unwrap_or_default().to_string();
    match action {
        Action::GetApplicationId => (
            client.build_get_application_id(),
            client.parse_application_id(response).map(Value::from),
        ),
        Action::GetAvailableComponents => (
            client.build_get_available_components(),
            client.parse_available_components(response).map(Value::from),
        ),
        Action::SetComponent => (
            client.build_set_component(&arg("application_id"), &arg("component")),
            client.parse_set_component(response).map(Value::from),
        ),
        Action::DisplayGui => (
            client.build_display_gui(&arg("application_id"), &arg("initial_values")),
            client.parse_display_gui(response).map(Value::from),
        ),
        Action::GenerateReport => (
            client.build_generate_report(&arg("application_id")),
            client.parse_generate_report(response).map(|c| Value::from(c.kind())),
        ),
        Action::DownloadPdf => (
            client.build_download_pdf(&arg("application_id")),
            client
                .parse_download_pdf(response)
                .map(|b| Value::from(String::from_utf8_lossy(&b).into_owned())),
        ),
        Action::DownloadZip => (
            client.build_download_zip(&arg("application_id")),
            client
                .parse_download_zip(response)
                .map(|b| Value::from(String::from_utf8_lossy(&b).into_owned())),
        ),
    }
}

#[test]
fn service_test_vectors() {
    let raw = include_str!("../../test-vectors/service.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let endpoint = vectors["endpoint"].as_str().unwrap();
    let client = WebServiceClient::new(endpoint, "NineML WebService Application/1.0");

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let action: Action = case["action"].as_str().unwrap().parse().unwrap();

        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        )
        .with_header("Content-Type", sim["content_type"].as_str().unwrap());

        let (req, result) = run_service_case(&client, action, &case["args"], response);

        // Verify build
        assert_eq!(req.method, HttpMethod::Post, "{name}: method");
        assert_eq!(req.path, endpoint, "{name}: path");
        let form = FormBody::parse(req.body.as_deref().unwrap());
        assert_eq!(form.fields(), pairs(&case["expected_fields"]).as_slice(), "{name}: fields");

        // Verify parse
        match (case.get("expected_result"), case.get("expected_error")) {
            (Some(expected), None) => {
                let value = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
                assert_eq!(&value, expected, "{name}: parsed result");
            }
            (None, Some(expected)) => {
                let err = result.expect_err(name);
                assert_eq!(error_name(&err), expected.as_str().unwrap(), "{name}: error kind");
            }
            _ => panic!("{name}: vector needs exactly one of expected_result / expected_error"),
        }
    }
}
