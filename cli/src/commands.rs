//! Command implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dispatch_core::{
    transport, Document, DispatchOutcome, MemoryDocument, RequestDispatcher, ServiceConfig,
    Session, WebServiceClient,
};
use tracing::info;
use url::Url;

use crate::cli::{DispatchArgs, RunArgs};

/// Defaults, then the config file, then the environment, then flags.
pub fn resolve_config(path: Option<&Path>, server: Option<&str>, port: Option<u16>) -> Result<ServiceConfig> {
    let config = match path {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    let mut config = config.with_env()?;
    if let Some(server) = server {
        config.server = server.to_string();
    }
    if let Some(port) = port {
        config.port = port;
    }
    Ok(config)
}

pub struct DispatchReport {
    pub outcome: DispatchOutcome,
    pub content: String,
}

pub fn run_dispatch(config: &ServiceConfig, args: &DispatchArgs) -> Result<DispatchReport> {
    let document = Arc::new(MemoryDocument::new().with_element(args.target.clone(), args.initial.clone()));
    let base_url = Url::parse(&format!("{}/", config.base_url()))
        .with_context(|| format!("invalid server address {}", config.base_url()))?;
    let dispatcher = RequestDispatcher::new(document.clone()).with_base_url(base_url);

    let outcome = dispatcher
        .dispatch(&args.target, &args.endpoint, &args.payload, !args.sync)
        .wait();
    info!(?outcome, "dispatch finished");

    Ok(DispatchReport {
        outcome,
        content: document.inner_html(&args.target).unwrap_or_default(),
    })
}

fn open_session(config: &ServiceConfig) -> Result<Session> {
    let client = WebServiceClient::from_config(config);
    Session::open(client, transport::detect())
        .with_context(|| format!("cannot open a session at {}", config.endpoint_url()))
}

pub fn run_components(config: &ServiceConfig) -> Result<Vec<String>> {
    let session = open_session(config)?;
    Ok(session.available_components()?)
}

pub struct RunSummary {
    pub application_id: String,
    pub component: String,
    pub gui: String,
    pub pdf_bytes: Option<usize>,
    pub zip_bytes: Option<usize>,
}

pub fn run_workflow(config: &ServiceConfig, args: &RunArgs) -> Result<RunSummary> {
    let session = open_session(config)?;
    let component = session
        .set_component(&args.component)
        .with_context(|| format!("cannot select component {}", args.component))?;
    let gui = session.display_gui(&args.initial_values)?;
    session.generate_report()?;
    info!(%component, "report generated");

    let pdf_bytes = match &args.pdf {
        Some(path) => Some(save(path, &session.download_pdf()?)?),
        None => None,
    };
    let zip_bytes = match &args.zip {
        Some(path) => Some(save(path, &session.download_zip()?)?),
        None => None,
    };

    Ok(RunSummary {
        application_id: session.application_id().to_string(),
        component,
        gui,
        pdf_bytes,
        zip_bytes,
    })
}

fn save(path: &Path, bytes: &[u8]) -> Result<usize> {
    std::fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "saved");
    Ok(bytes.len())
}
