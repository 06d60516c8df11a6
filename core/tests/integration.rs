//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the dispatcher and
//! the web-service session over real HTTP with the ureq transport.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use dispatch_core::{
    Document, DispatchOutcome, HttpTransport, MemoryDocument, RequestDispatcher, ServiceError,
    Session, WebServiceClient,
};
use url::Url;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn dispatcher(addr: SocketAddr, document: Arc<MemoryDocument>) -> RequestDispatcher {
    RequestDispatcher::with_transport(Arc::new(HttpTransport::new()), document)
        .with_base_url(Url::parse(&format!("http://{addr}/")).unwrap())
}

#[test]
fn dispatch_loads_fragment_into_element() {
    let addr = start_server();
    let document = Arc::new(MemoryDocument::new().with_element("resultsPanel", ""));
    let dispatcher = dispatcher(addr, document.clone());

    let outcome = dispatcher
        .dispatch(
            "resultsPanel",
            "/api/components",
            "__NINEML_ACTION__=getAvailableALComponents",
            true,
        )
        .wait();

    assert!(matches!(outcome, DispatchOutcome::Applied { .. }));
    let html = document.inner_html("resultsPanel").unwrap();
    assert!(html.starts_with("<ul><li>hierachical_iaf_1coba</li>"));
    assert!(html.ends_with("</ul>"));
}

#[test]
fn dispatch_sends_payload_verbatim_as_form() {
    let addr = start_server();
    let document = Arc::new(MemoryDocument::new().with_element("out", "before"));
    let dispatcher = dispatcher(addr, document.clone());

    // The echo route answers 415 unless the content type is form-url-encoded.
    let payload = "a=%3Cb%3E&c=d+e";
    let outcome = dispatcher.dispatch("out", "/api/echo", payload, false).wait();

    assert_eq!(outcome, DispatchOutcome::Applied { bytes: payload.len() });
    assert_eq!(document.inner_html("out").as_deref(), Some(payload));
}

#[test]
fn dispatch_server_error_keeps_content() {
    let addr = start_server();
    let document = Arc::new(MemoryDocument::new().with_element("resultsPanel", "<p>prior</p>"));
    let dispatcher = dispatcher(addr, document.clone());

    let outcome = dispatcher.dispatch("resultsPanel", "/api/fail", "", true).wait();

    assert_eq!(outcome, DispatchOutcome::Ignored { status: 500 });
    assert_eq!(document.inner_html("resultsPanel").as_deref(), Some("<p>prior</p>"));
}

#[test]
fn dispatch_unknown_route_keeps_content() {
    let addr = start_server();
    let document = Arc::new(MemoryDocument::new().with_element("resultsPanel", "<p>prior</p>"));
    let dispatcher = dispatcher(addr, document.clone());

    let outcome = dispatcher.dispatch("resultsPanel", "/nothing-here", "", false).wait();

    assert_eq!(outcome, DispatchOutcome::Ignored { status: 404 });
    assert_eq!(document.inner_html("resultsPanel").as_deref(), Some("<p>prior</p>"));
}

/// Answers one request with `200 text/html` and `body`, then closes.
fn serve_once(body: Vec<u8>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        let header_end = loop {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "connection closed before request headers");
            request.extend_from_slice(&buf[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse::<usize>().unwrap())
            .unwrap_or(0);
        while request.len() < header_end + content_length {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
    });
    addr
}

#[test]
fn dispatch_applies_body_larger_than_ten_mebibytes() {
    let size = 11 * 1024 * 1024;
    let addr = serve_once(vec![b'x'; size]);
    let document = Arc::new(MemoryDocument::new().with_element("panel", "prior"));
    let dispatcher = RequestDispatcher::with_transport(Arc::new(HttpTransport::new()), document.clone());

    let outcome = dispatcher
        .dispatch("panel", &format!("http://{addr}/fragment"), "", false)
        .wait();

    assert_eq!(outcome, DispatchOutcome::Applied { bytes: size });
    let html = document.inner_html("panel").unwrap();
    assert_eq!(html.len(), size);
    assert!(html.bytes().all(|b| b == b'x'));
}

#[test]
fn service_workflow() {
    let addr = start_server();
    let client = WebServiceClient::new(
        &format!("http://{addr}/nineml-webapp"),
        "NineML WebService Application/1.0",
    );
    let session = Session::open(client, Arc::new(HttpTransport::new())).unwrap();
    assert!(!session.application_id().is_empty());

    let components = session.available_components().unwrap();
    assert!(components.iter().any(|c| c == "hierachical_iaf_1coba"));

    // Step 1: downloads before a report exist are rejected by the application.
    let err = session.download_pdf().unwrap_err();
    assert!(matches!(err, ServiceError::Application(_)));

    // Step 2: unknown component.
    let err = session.set_component("no_such_component").unwrap_err();
    assert!(matches!(err, ServiceError::Application(_)));

    // Step 3: select, render, report, download.
    assert_eq!(
        session.set_component("hierachical_iaf_1coba").unwrap(),
        "hierachical_iaf_1coba"
    );
    let gui = session.display_gui("").unwrap();
    assert!(gui.contains("hierachical_iaf_1coba"));
    session.generate_report().unwrap();

    let pdf = session.download_pdf().unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let zip = session.download_zip().unwrap();
    assert!(zip.starts_with(b"PK\x03\x04"));
}
