//! CLI argument definitions for the NineML client.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "nineml-client",
    version,
    about = "Talk to a NineML web application",
    long_about = "Talk to a NineML web application.\n\n\
                  `dispatch` posts a form payload and prints what would be loaded into\n\
                  a page element; `components` and `run` drive the application's actions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// JSON config file with `server`, `port`, `path` and `user_agent`.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Server host name (overrides config and NINEML_SERVER).
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Server port (overrides config and NINEML_PORT).
    #[arg(long, global = true)]
    pub port: Option<u16>,
}

#[derive(Subcommand)]
pub enum Command {
    /// POST a payload and print the content the target element ends up with.
    Dispatch(DispatchArgs),

    /// List the components the application can test.
    Components,

    /// Select a component, render its GUI, generate the report and download it.
    Run(RunArgs),
}

#[derive(Parser)]
pub struct DispatchArgs {
    /// Id of the element to load the response into.
    #[arg(long)]
    pub target: String,

    /// Endpoint address; relative addresses resolve against the server.
    #[arg(long)]
    pub endpoint: String,

    /// Form-url-encoded body, sent verbatim.
    #[arg(long, default_value = "")]
    pub payload: String,

    /// Block on the request instead of running it on a worker thread.
    #[arg(long)]
    pub sync: bool,

    /// Content of the element before the response arrives.
    #[arg(long, value_name = "HTML", default_value = "")]
    pub initial: String,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Component to test, e.g. `hierachical_iaf_1coba`.
    #[arg(long)]
    pub component: String,

    /// Initial values passed to the GUI.
    #[arg(long = "initial-values", default_value = "")]
    pub initial_values: String,

    /// Write the PDF report here.
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Write the ZIP archive here.
    #[arg(long, value_name = "PATH")]
    pub zip: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
