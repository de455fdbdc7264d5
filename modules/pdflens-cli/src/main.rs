//! `pdflens` — upload a PDF, run the backend analysis, fetch the report.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pdflens_client::{Config, PdfLensClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod progress;

#[derive(Parser, Debug)]
#[command(name = "pdflens")]
#[command(about = "Analyze PDFs with the pdflens backend")]
#[command(version)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "PDFLENS_API_URL")]
    api_url: Option<String>,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the backend is reachable
    Health,

    /// Upload a PDF and print the assigned file id
    Upload { file: PathBuf },

    /// Analyze a previously uploaded file
    Analyze { file_id: String },

    /// Print the report download URL (no request is made)
    ReportUrl { file_id: String },

    /// Ask the backend to generate the report
    GenerateReport { file_id: String },

    /// Download the report PDF
    DownloadReport {
        file_id: String,

        /// Where to write the PDF
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Upload, analyze and show the result in one go
    Run {
        file: PathBuf,

        /// Generate the report once analysis succeeds
        #[arg(long)]
        generate_report: bool,

        /// Download the report PDF to this path once analysis succeeds
        #[arg(long)]
        download: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.json_logs) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("pdflens=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(cli.api_url);
    info!(api_url = %config.api_url, "Using backend");
    let client = PdfLensClient::from_config(&config);

    match cli.command {
        Commands::Health => commands::health(&client).await,
        Commands::Upload { file } => commands::upload(&client, &file).await,
        Commands::Analyze { file_id } => commands::analyze(&client, &file_id).await,
        Commands::ReportUrl { file_id } => commands::report_url(&client, &file_id),
        Commands::GenerateReport { file_id } => commands::generate_report(&client, &file_id).await,
        Commands::DownloadReport { file_id, output } => {
            commands::download_report(&client, &file_id, &output).await
        }
        Commands::Run {
            file,
            generate_report,
            download,
        } => {
            let options = commands::RunOptions {
                generate_report,
                download,
                quiet: cli.quiet,
            };
            commands::run_flow(client, &file, options).await
        }
    }
}

/// `--api-url` wins over the environment; both fall back to the local default.
fn resolve_config(api_url: Option<String>) -> Config {
    match api_url.map(|url| url.trim().to_string()) {
        Some(url) if !url.is_empty() => Config { api_url: url },
        _ => Config::from_env(),
    }
}
