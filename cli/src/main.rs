//! NineML web application client.

use clap::Parser;
use dispatch_core::DispatchOutcome;
use nineml_client::cli::{Cli, Command, LogFormatArg};
use nineml_client::commands::{resolve_config, run_components, run_dispatch, run_workflow};
use nineml_client::logging::{init_logging, LogFormat};

fn main() {
    let cli = Cli::parse();
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    if let Err(error) = init_logging(cli.verbosity.tracing_level_filter(), format) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config = match resolve_config(cli.config.as_deref(), cli.server.as_deref(), cli.port) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Command::Dispatch(args) => match run_dispatch(&config, &args) {
            Ok(report) => {
                println!("{}", report.content);
                match report.outcome {
                    DispatchOutcome::Applied { .. } => 0,
                    other => {
                        eprintln!("warning: element not updated ({other:?})");
                        2
                    }
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Components => match run_components(&config) {
            Ok(components) => {
                for component in components {
                    println!("{component}");
                }
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Run(args) => match run_workflow(&config, &args) {
            Ok(summary) => {
                println!("application id: {}", summary.application_id);
                println!("component:      {}", summary.component);
                println!("gui:            {} bytes", summary.gui.len());
                if let Some(bytes) = summary.pdf_bytes {
                    println!("pdf:            {bytes} bytes");
                }
                if let Some(bytes) = summary.zip_bytes {
                    println!("zip:            {bytes} bytes");
                }
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}
