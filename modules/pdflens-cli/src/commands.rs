use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use pdflens_client::{PdfLensClient, PdfUpload};
use pdflens_flow::{AnalysisFlow, FlowState};
use tracing::{info, warn};

use crate::progress;

pub struct RunOptions {
    pub generate_report: bool,
    pub download: Option<PathBuf>,
    pub quiet: bool,
}

pub async fn health(client: &PdfLensClient) -> Result<ExitCode> {
    if client.health_check().await {
        println!("healthy: {}", client.base_url());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("unreachable: {}", client.base_url());
        Ok(ExitCode::from(1))
    }
}

pub async fn upload(client: &PdfLensClient, path: &Path) -> Result<ExitCode> {
    let uploaded = client.upload_path(path).await?;
    println!("{}", serde_json::to_string_pretty(&uploaded)?);
    Ok(ExitCode::SUCCESS)
}

pub async fn analyze(client: &PdfLensClient, file_id: &str) -> Result<ExitCode> {
    let result = client.analyze_file(file_id).await?;
    println!("{}", serde_json::to_string_pretty(result.as_json())?);
    Ok(ExitCode::SUCCESS)
}

pub fn report_url(client: &PdfLensClient, file_id: &str) -> Result<ExitCode> {
    println!("{}", client.report_url(file_id));
    Ok(ExitCode::SUCCESS)
}

pub async fn generate_report(client: &PdfLensClient, file_id: &str) -> Result<ExitCode> {
    let report = client.generate_report(file_id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

pub async fn download_report(
    client: &PdfLensClient,
    file_id: &str,
    output: &Path,
) -> Result<ExitCode> {
    let bytes = client.download_report(file_id).await?;
    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("writing report to {}", output.display()))?;
    info!(path = %output.display(), bytes = bytes.len(), "Report saved");
    println!("{}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// Drive the flow controller end to end, rendering each phase.
pub async fn run_flow(client: PdfLensClient, path: &Path, options: RunOptions) -> Result<ExitCode> {
    let file = read_pdf(path).await?;
    let mut flow = AnalysisFlow::new(client);

    let upload_view = progress::track_upload(flow.subscribe(), options.quiet);
    flow.select_file(file).await;
    upload_view.await.context("upload progress renderer panicked")?;

    let ready = flow
        .state()
        .upload_stage()
        .is_some_and(|stage| stage.can_start_analysis());
    if !ready {
        let state = flow.state();
        let message = state.error().map(|e| e.message.as_str()).unwrap_or("Upload failed");
        eprintln!("Upload failed: {message}");
        return Ok(ExitCode::from(1));
    }

    let analysis_view = progress::track_analysis(flow.subscribe(), options.quiet);
    flow.start_analysis().await;
    analysis_view.await.context("analysis progress renderer panicked")?;

    let (file_id, result) = match flow.state() {
        FlowState::Results { file, result } => (file.file_id, result),
        FlowState::Error { error } => {
            eprintln!("Analysis failed: {error}");
            flow.retry();
            return Ok(ExitCode::from(1));
        }
        other => anyhow::bail!("analysis ended in unexpected phase: {}", other.phase()),
    };

    println!("{}", serde_json::to_string_pretty(result.as_json())?);
    eprintln!("Report: {}", flow.backend().report_url(&file_id));

    let mut code = ExitCode::SUCCESS;
    if options.generate_report {
        let report = flow.backend().generate_report(&file_id).await?;
        if report.success {
            eprintln!(
                "Report generated: {}",
                report.pdf_path.as_deref().unwrap_or(&report.message)
            );
        } else {
            warn!(file_id = %file_id, message = %report.message, "Report generation unsuccessful");
            eprintln!("Report generation unsuccessful: {}", report.message);
            code = ExitCode::from(1);
        }
    }

    if let Some(output) = options.download.as_deref() {
        download_report(flow.backend(), &file_id, output).await?;
    }

    flow.reset();
    Ok(code)
}

async fn read_pdf(path: &Path) -> Result<PdfUpload> {
    PdfUpload::from_path(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}
