//! Client for the PDF analysis backend.
//!
//! Wraps upload, analysis, report retrieval and a liveness probe. Every
//! operation except [`PdfLensClient::health_check`] turns a non-success
//! status into [`ClientError::Server`] whose message is the body's `detail`
//! field, or a fixed per-operation fallback.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ClientError, Result};
pub use types::{AnalysisResult, PdfUpload, ReportGeneration, UploadResult};

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use error::detail_message;

const UPLOAD_FAILED: &str = "Upload failed";
const ANALYSIS_FAILED: &str = "Analysis failed";
const REPORT_GENERATION_FAILED: &str = "Report generation failed";
const REPORT_DOWNLOAD_FAILED: &str = "Report download failed";

#[derive(Debug, Clone)]
pub struct PdfLensClient {
    client: reqwest::Client,
    base_url: String,
}

impl PdfLensClient {
    /// No request timeout is configured: an in-flight call runs to completion.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a PDF as multipart form data (field `file`).
    pub async fn upload_pdf(&self, file: &PdfUpload) -> Result<UploadResult> {
        let url = format!("{}/api/uploads/", self.base_url);
        debug!(filename = %file.filename, bytes = file.bytes.len(), "Uploading PDF");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        let upload: UploadResult = decode(check(resp, UPLOAD_FAILED).await?).await?;

        info!(file_id = %upload.file_id, filename = %upload.filename, "PDF uploaded");
        Ok(upload)
    }

    /// Read a PDF from disk and upload it.
    pub async fn upload_path(&self, path: impl AsRef<Path>) -> Result<UploadResult> {
        let file = PdfUpload::from_path(path).await?;
        self.upload_pdf(&file).await
    }

    /// Run the backend analysis for a previously uploaded file.
    pub async fn analyze_file(&self, file_id: &str) -> Result<AnalysisResult> {
        let url = format!("{}/api/analyze/", self.base_url);
        debug!(file_id, "Requesting analysis");

        let resp = self
            .client
            .post(&url)
            .query(&[("file_id", file_id)])
            .send()
            .await?;
        let result = decode(check(resp, ANALYSIS_FAILED).await?).await?;

        info!(file_id, "Analysis complete");
        Ok(result)
    }

    /// URL of the downloadable report. Pure; performs no I/O.
    pub fn report_url(&self, file_id: &str) -> String {
        format!("{}/api/report/{}", self.base_url, file_id)
    }

    /// Ask the backend to render the report for a file.
    pub async fn generate_report(&self, file_id: &str) -> Result<ReportGeneration> {
        let url = format!("{}/api/report/generate/{}", self.base_url, file_id);
        debug!(file_id, "Requesting report generation");

        let resp = self.client.post(&url).send().await?;
        let report: ReportGeneration = decode(check(resp, REPORT_GENERATION_FAILED).await?).await?;

        info!(
            file_id,
            success = report.success,
            pdf_path = report.pdf_path.as_deref().unwrap_or(""),
            "Report generation finished"
        );
        Ok(report)
    }

    /// Fetch the report PDF bytes from [`Self::report_url`].
    pub async fn download_report(&self, file_id: &str) -> Result<Vec<u8>> {
        let url = self.report_url(file_id);
        debug!(file_id, "Downloading report");

        let resp = self.client.get(&url).send().await?;
        let bytes = check(resp, REPORT_DOWNLOAD_FAILED).await?.bytes().await?;

        info!(file_id, bytes = bytes.len(), "Report downloaded");
        Ok(bytes.to_vec())
    }

    /// `true` only if `GET /` completes with a success status. Never errors.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => {
                let healthy = resp.status().is_success();
                debug!(status = resp.status().as_u16(), healthy, "Health check");
                healthy
            }
            Err(err) => {
                debug!(error = %err, "Health check failed");
                false
            }
        }
    }
}

/// Pass success responses through; turn anything else into `ClientError::Server`.
async fn check(resp: Response, fallback: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = detail_message(&body, fallback);
    warn!(status = status.as_u16(), %message, "Backend returned an error");
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}
