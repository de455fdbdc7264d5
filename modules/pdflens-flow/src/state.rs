//! Flow state and its transitions. No I/O.

use std::fmt;

use pdflens_client::{AnalysisResult, ClientError, UploadResult};

/// Progress added per tick while an upload is in flight.
pub const PROGRESS_STEP: u8 = 10;
/// Simulated progress never passes this until the upload is confirmed.
pub const PROGRESS_CAP: u8 = 90;
pub const PROGRESS_DONE: u8 = 100;

const UNKNOWN_ERROR: &str = "Something went wrong";

/// Message shown to the user. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub message: String,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self {
                message: UNKNOWN_ERROR.to_string(),
            };
        }
        Self { message }
    }
}

impl From<&ClientError> for ErrorValue {
    fn from(err: &ClientError) -> Self {
        Self::new(err.message())
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Everything held while in the upload phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadStage {
    /// Set once an upload has been confirmed by the backend.
    pub file: Option<UploadResult>,
    pub is_uploading: bool,
    pub progress: u8,
    pub error: Option<ErrorValue>,
}

impl UploadStage {
    pub fn file_id(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.file_id.as_str())
    }

    pub fn can_start_analysis(&self) -> bool {
        self.file.is_some() && !self.is_uploading
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Upload(UploadStage),
    Analyzing {
        file: UploadResult,
    },
    Results {
        file: UploadResult,
        result: AnalysisResult,
    },
    Error {
        error: ErrorValue,
    },
}

impl Default for FlowState {
    fn default() -> Self {
        FlowState::Upload(UploadStage::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Upload,
    Analyzing,
    Results,
    Error,
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowPhase::Upload => "upload",
            FlowPhase::Analyzing => "analyzing",
            FlowPhase::Results => "results",
            FlowPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Inputs to the state machine: user actions and backend outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    UploadStarted,
    UploadProgressed,
    UploadSucceeded(UploadResult),
    /// Also used when a selected file is rejected before any request.
    UploadFailed(ErrorValue),
    AnalysisStarted,
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed(ErrorValue),
    /// Reset from results, retry from error.
    Reset,
}

impl FlowState {
    pub fn phase(&self) -> FlowPhase {
        match self {
            FlowState::Upload(_) => FlowPhase::Upload,
            FlowState::Analyzing { .. } => FlowPhase::Analyzing,
            FlowState::Results { .. } => FlowPhase::Results,
            FlowState::Error { .. } => FlowPhase::Error,
        }
    }

    pub fn upload_stage(&self) -> Option<&UploadStage> {
        match self {
            FlowState::Upload(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            FlowState::Results { result, .. } => Some(result),
            _ => None,
        }
    }

    /// The error currently shown, either the upload error or the terminal one.
    pub fn error(&self) -> Option<&ErrorValue> {
        match self {
            FlowState::Upload(stage) => stage.error.as_ref(),
            FlowState::Error { error } => Some(error),
            _ => None,
        }
    }

    /// File id of the confirmed upload, if one is held.
    pub fn file_id(&self) -> Option<&str> {
        match self {
            FlowState::Upload(stage) => stage.file_id(),
            FlowState::Analyzing { file } | FlowState::Results { file, .. } => {
                Some(file.file_id.as_str())
            }
            FlowState::Error { .. } => None,
        }
    }

    /// True while a request is outstanding; the view disables submissions.
    pub fn is_busy(&self) -> bool {
        match self {
            FlowState::Upload(stage) => stage.is_uploading,
            FlowState::Analyzing { .. } => true,
            _ => false,
        }
    }

    /// Apply an event. Returns whether the state changed; events that do not
    /// fit the current phase are ignored.
    pub fn apply(&mut self, event: FlowEvent) -> bool {
        let next = match (&*self, event) {
            (FlowState::Upload(stage), FlowEvent::UploadStarted) if !stage.is_uploading => {
                FlowState::Upload(UploadStage {
                    is_uploading: true,
                    ..UploadStage::default()
                })
            }
            (FlowState::Upload(stage), FlowEvent::UploadProgressed) if stage.is_uploading => {
                let progress = stage.progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                if progress == stage.progress {
                    return false;
                }
                FlowState::Upload(UploadStage {
                    progress,
                    ..stage.clone()
                })
            }
            (FlowState::Upload(stage), FlowEvent::UploadSucceeded(file)) if stage.is_uploading => {
                FlowState::Upload(UploadStage {
                    file: Some(file),
                    is_uploading: false,
                    progress: PROGRESS_DONE,
                    error: None,
                })
            }
            (FlowState::Upload(_), FlowEvent::UploadFailed(error)) => {
                FlowState::Upload(UploadStage {
                    error: Some(error),
                    ..UploadStage::default()
                })
            }
            (FlowState::Upload(stage), FlowEvent::AnalysisStarted)
                if stage.can_start_analysis() =>
            {
                match &stage.file {
                    Some(file) => FlowState::Analyzing { file: file.clone() },
                    None => return false,
                }
            }
            (FlowState::Analyzing { file }, FlowEvent::AnalysisSucceeded(result)) => {
                FlowState::Results {
                    file: file.clone(),
                    result,
                }
            }
            (FlowState::Analyzing { .. }, FlowEvent::AnalysisFailed(error)) => {
                FlowState::Error { error }
            }
            (FlowState::Results { .. } | FlowState::Error { .. }, FlowEvent::Reset) => {
                FlowState::default()
            }
            _ => return false,
        };

        *self = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(id: &str) -> UploadResult {
        UploadResult {
            file_id: id.to_string(),
            filename: format!("{id}.pdf"),
        }
    }

    fn state_with_upload(id: &str) -> FlowState {
        let mut state = FlowState::default();
        assert!(state.apply(FlowEvent::UploadStarted));
        assert!(state.apply(FlowEvent::UploadSucceeded(uploaded(id))));
        state
    }

    #[test]
    fn starts_in_upload_with_nothing_held() {
        let state = FlowState::default();
        assert_eq!(state.phase(), FlowPhase::Upload);
        assert_eq!(state.file_id(), None);
        assert_eq!(state.result(), None);
        assert_eq!(state.error(), None);
        assert!(!state.is_busy());
    }

    #[test]
    fn analysis_without_upload_is_noop() {
        let mut state = FlowState::default();
        assert!(!state.apply(FlowEvent::AnalysisStarted));
        assert_eq!(state, FlowState::default());
    }

    #[test]
    fn analysis_while_uploading_is_noop() {
        let mut state = FlowState::default();
        state.apply(FlowEvent::UploadStarted);
        assert!(!state.apply(FlowEvent::AnalysisStarted));
        assert_eq!(state.phase(), FlowPhase::Upload);
    }

    #[test]
    fn progress_is_capped_until_success() {
        let mut state = FlowState::default();
        state.apply(FlowEvent::UploadStarted);

        let mut last = 0;
        for _ in 0..20 {
            state.apply(FlowEvent::UploadProgressed);
            let progress = state.upload_stage().unwrap().progress;
            assert!(progress >= last);
            assert!(progress <= PROGRESS_CAP);
            last = progress;
        }
        assert_eq!(last, PROGRESS_CAP);
        assert!(!state.apply(FlowEvent::UploadProgressed));

        state.apply(FlowEvent::UploadSucceeded(uploaded("abc123")));
        let stage = state.upload_stage().unwrap();
        assert_eq!(stage.progress, PROGRESS_DONE);
        assert!(!stage.is_uploading);
        assert_eq!(stage.file_id(), Some("abc123"));
    }

    #[test]
    fn progress_ignored_when_not_uploading() {
        let mut state = FlowState::default();
        assert!(!state.apply(FlowEvent::UploadProgressed));
        assert_eq!(state.upload_stage().unwrap().progress, 0);
    }

    #[test]
    fn upload_failure_resets_progress_and_keeps_upload_phase() {
        let mut state = FlowState::default();
        state.apply(FlowEvent::UploadStarted);
        state.apply(FlowEvent::UploadProgressed);
        state.apply(FlowEvent::UploadFailed(ErrorValue::new("Upload failed")));

        let stage = state.upload_stage().unwrap();
        assert_eq!(stage.progress, 0);
        assert!(!stage.is_uploading);
        assert_eq!(stage.file, None);
        assert_eq!(state.error().unwrap().message, "Upload failed");
    }

    #[test]
    fn new_upload_clears_previous_error_and_file() {
        let mut state = state_with_upload("first");
        state.apply(FlowEvent::UploadFailed(ErrorValue::new("bad")));
        state.apply(FlowEvent::UploadStarted);

        let stage = state.upload_stage().unwrap();
        assert_eq!(stage.error, None);
        assert_eq!(stage.file, None);
        assert_eq!(stage.progress, 0);
    }

    #[test]
    fn analysis_success_carries_exact_payload() {
        let mut state = state_with_upload("abc123");
        assert!(state.apply(FlowEvent::AnalysisStarted));
        assert_eq!(state.phase(), FlowPhase::Analyzing);
        assert!(state.is_busy());

        let payload = AnalysisResult(serde_json::json!({"pages": 2}));
        assert!(state.apply(FlowEvent::AnalysisSucceeded(payload.clone())));
        assert_eq!(state.phase(), FlowPhase::Results);
        assert_eq!(state.result(), Some(&payload));
        assert_eq!(state.error(), None);
        assert_eq!(state.file_id(), Some("abc123"));
    }

    #[test]
    fn analysis_failure_carries_error() {
        let mut state = state_with_upload("abc123");
        state.apply(FlowEvent::AnalysisStarted);
        state.apply(FlowEvent::AnalysisFailed(ErrorValue::new("OCR failed")));

        assert_eq!(state.phase(), FlowPhase::Error);
        assert_eq!(state.error().unwrap().message, "OCR failed");
        assert_eq!(state.result(), None);
        assert_eq!(state.file_id(), None);
    }

    #[test]
    fn reset_from_results_and_error_clears_everything() {
        let mut results = state_with_upload("abc123");
        results.apply(FlowEvent::AnalysisStarted);
        results.apply(FlowEvent::AnalysisSucceeded(AnalysisResult(serde_json::json!({}))));
        assert!(results.apply(FlowEvent::Reset));
        assert_eq!(results, FlowState::default());

        let mut error = state_with_upload("abc123");
        error.apply(FlowEvent::AnalysisStarted);
        error.apply(FlowEvent::AnalysisFailed(ErrorValue::new("boom")));
        assert!(error.apply(FlowEvent::Reset));
        assert_eq!(error, FlowState::default());
    }

    #[test]
    fn reset_is_ignored_mid_flow() {
        let mut state = state_with_upload("abc123");
        state.apply(FlowEvent::AnalysisStarted);
        assert!(!state.apply(FlowEvent::Reset));
        assert_eq!(state.phase(), FlowPhase::Analyzing);
    }

    #[test]
    fn analysis_outcomes_ignored_outside_analyzing() {
        let mut state = FlowState::default();
        assert!(!state.apply(FlowEvent::AnalysisFailed(ErrorValue::new("late"))));
        assert!(!state.apply(FlowEvent::AnalysisSucceeded(AnalysisResult(
            serde_json::Value::Null
        ))));
        assert_eq!(state, FlowState::default());
    }

    #[test]
    fn blank_error_message_is_replaced() {
        assert_eq!(ErrorValue::new("  ").message, "Something went wrong");
        assert_eq!(ErrorValue::new("OCR failed").to_string(), "OCR failed");
    }
}
