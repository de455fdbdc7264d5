use std::path::Path;

use serde::{Deserialize, Serialize};

/// Returned by a successful upload. `file_id` is opaque and server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub file_id: String,
    pub filename: String,
}

/// Analysis payload. The backend owns its shape; it is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub serde_json::Value);

impl AnalysisResult {
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }
}

/// Response of `POST /api/report/generate/{file_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportGeneration {
    pub success: bool,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub message: String,
}

const PDF_MAGIC: &[u8] = b"%PDF";

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping its base name as the upload filename.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        Ok(Self { filename, bytes })
    }

    /// Non-empty, and either named `*.pdf` or starting with the PDF magic.
    pub fn looks_like_pdf(&self) -> bool {
        if self.bytes.is_empty() {
            return false;
        }
        self.filename.to_ascii_lowercase().ends_with(".pdf") || self.bytes.starts_with(PDF_MAGIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_detection_accepts_extension_or_magic() {
        assert!(PdfUpload::new("report.PDF", b"anything".to_vec()).looks_like_pdf());
        assert!(PdfUpload::new("scan", b"%PDF-1.7\n".to_vec()).looks_like_pdf());
        assert!(!PdfUpload::new("notes.txt", b"hello".to_vec()).looks_like_pdf());
        assert!(!PdfUpload::new("empty.pdf", Vec::new()).looks_like_pdf());
    }

    #[test]
    fn report_generation_tolerates_missing_fields() {
        let parsed: ReportGeneration = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.pdf_path, None);
        assert!(parsed.message.is_empty());
    }

    #[test]
    fn analysis_result_keeps_payload_verbatim() {
        let json = serde_json::json!({"pages": 3, "findings": [{"kind": "table"}]});
        let parsed: AnalysisResult = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(parsed.as_json(), &json);
        assert_eq!(serde_json::to_value(&parsed).unwrap(), json);
    }
}
