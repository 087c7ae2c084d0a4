//! stadix - command-line statistics for the classroom
//!
//! Collects data from flags or files, sends it to the statistics service and
//! prints the result tables with an interpretation.

mod cli;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use stadix_client::{ClientConfig, StatsClient};
use stadix_core::{ExportConfig, PanelState, ReportExporter, Workspace};
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Job};
use error::{CliError, CliResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "command failed");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = ClientConfig::resolve(cli.api_url.as_deref(), cli.config.as_deref())?;
    let job = cli.command.job()?;
    let client = StatsClient::new(config)?;
    let mut workspace = Workspace::new();

    let screen = match job {
        Job::ShowConfig => {
            print!("{}", client.config().to_toml()?);
            return Ok(());
        }
        Job::Send { screen, request } => workspace.run(&client, screen, request).await?.screen(),
        Job::Upload { kind, file } => workspace.upload(&client, kind, &file).await?.screen(),
    };

    let panel = workspace.panel(screen);
    let response = match panel.state() {
        PanelState::Ready(response) => response,
        PanelState::Failed(message) => return Err(CliError::Analysis(message.clone())),
        PanelState::Idle | PanelState::Loading { .. } => {
            return Err(CliError::Analysis("No result was received.".to_string()))
        }
    };

    if cli.json {
        println!("{}", output::render_json(response)?);
    } else {
        print!("{}", output::render_text(response, panel.request()));
    }

    if let Some(dir) = cli.report {
        let panel = workspace.panel_mut(screen);
        if let Some(kind) = cli.command.frequency_chart() {
            panel.set_frequency_chart(kind);
        }
        panel.capture()?;
        let result = ReportExporter::new().export(workspace.panel(screen), &ExportConfig::new(dir))?;
        let summary = output::render_export(&result);
        if cli.json {
            eprint!("{summary}");
        } else {
            print!("\n{summary}");
        }
    }

    Ok(())
}
