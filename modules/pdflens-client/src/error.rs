use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure of a backend operation. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP exchange never completed (connection refused, DNS, reset).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Human-readable message, as shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Pull the user-facing message out of an error body.
///
/// A string `detail` is used verbatim; any other non-null `detail` is
/// rendered as compact JSON. Everything else yields `fallback`.
pub(crate) fn detail_message(body: &str, fallback: &str) -> String {
    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return fallback.to_string(),
    };

    match parsed.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        assert_eq!(detail_message(r#"{"detail":"OCR failed"}"#, "x"), "OCR failed");
    }

    #[test]
    fn unparsable_body_falls_back() {
        assert_eq!(detail_message("<html>502</html>", "Upload failed"), "Upload failed");
        assert_eq!(detail_message("", "Upload failed"), "Upload failed");
    }

    #[test]
    fn missing_or_null_detail_falls_back() {
        assert_eq!(detail_message(r#"{"error":"nope"}"#, "Analysis failed"), "Analysis failed");
        assert_eq!(detail_message(r#"{"detail":null}"#, "Analysis failed"), "Analysis failed");
        assert_eq!(detail_message(r#"["detail"]"#, "Analysis failed"), "Analysis failed");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let body = r#"{"detail":[{"loc":["query","file_id"],"msg":"field required"}]}"#;
        assert_eq!(
            detail_message(body, "Analysis failed"),
            r#"[{"loc":["query","file_id"],"msg":"field required"}]"#
        );
    }

    #[test]
    fn server_error_displays_only_the_message() {
        let err = ClientError::Server {
            status: 500,
            message: "OCR failed".into(),
        };
        assert_eq!(err.message(), "OCR failed");
        assert_eq!(err.status(), Some(500));
    }
}
