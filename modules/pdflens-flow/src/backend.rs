use async_trait::async_trait;
use pdflens_client::{AnalysisResult, ClientError, PdfLensClient, PdfUpload, UploadResult};

/// The two backend calls the flow needs.
///
/// Implemented by [`PdfLensClient`]; tests substitute an in-memory backend.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn upload_pdf(&self, file: &PdfUpload) -> Result<UploadResult, ClientError>;
    async fn analyze_file(&self, file_id: &str) -> Result<AnalysisResult, ClientError>;
}

#[async_trait]
impl AnalysisBackend for PdfLensClient {
    async fn upload_pdf(&self, file: &PdfUpload) -> Result<UploadResult, ClientError> {
        PdfLensClient::upload_pdf(self, file).await
    }

    async fn analyze_file(&self, file_id: &str) -> Result<AnalysisResult, ClientError> {
        PdfLensClient::analyze_file(self, file_id).await
    }
}
