use std::time::Duration;

use pdflens_client::PdfUpload;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::AnalysisBackend;
use crate::state::{ErrorValue, FlowEvent, FlowState};

const DEFAULT_PROGRESS_TICK: Duration = Duration::from_millis(200);
const NOT_A_PDF: &str = "Please select a PDF file";

/// Drives one upload → analyze session against a backend.
///
/// Operations take `&mut self`, so two of them never overlap on the same
/// flow. Observers get every state change through [`AnalysisFlow::subscribe`].
pub struct AnalysisFlow<B> {
    backend: B,
    state: watch::Sender<FlowState>,
    progress_tick: Duration,
}

impl<B: AnalysisBackend> AnalysisFlow<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(FlowState::default());
        Self {
            backend,
            state,
            progress_tick: DEFAULT_PROGRESS_TICK,
        }
    }

    /// Interval at which simulated upload progress advances.
    pub fn with_progress_tick(mut self, tick: Duration) -> Self {
        self.progress_tick = tick;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> FlowState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    /// Validate and upload a file. Stays in the upload phase either way;
    /// on failure the upload error is set and progress drops back to 0.
    pub async fn select_file(&mut self, file: PdfUpload) {
        let ready = self
            .state
            .borrow()
            .upload_stage()
            .is_some_and(|stage| !stage.is_uploading);
        if !ready {
            debug!(phase = %self.state.borrow().phase(), "Ignoring file selection");
            return;
        }

        if !file.looks_like_pdf() {
            warn!(filename = %file.filename, "Rejected non-PDF file");
            self.dispatch(FlowEvent::UploadFailed(ErrorValue::new(NOT_A_PDF)));
            return;
        }

        self.dispatch(FlowEvent::UploadStarted);

        let upload = self.backend.upload_pdf(&file);
        tokio::pin!(upload);

        let mut ticker = interval_at(Instant::now() + self.progress_tick, self.progress_tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                result = &mut upload => break result,
                _ = ticker.tick() => {
                    self.dispatch(FlowEvent::UploadProgressed);
                }
            }
        };

        match outcome {
            Ok(uploaded) => {
                info!(file_id = %uploaded.file_id, "Upload confirmed");
                self.dispatch(FlowEvent::UploadSucceeded(uploaded));
            }
            Err(err) => {
                warn!(error = %err, "Upload failed");
                self.dispatch(FlowEvent::UploadFailed(ErrorValue::from(&err)));
            }
        }
    }

    /// Analyze the uploaded file. A no-op unless an upload has been confirmed.
    pub async fn start_analysis(&mut self) {
        if !self.dispatch(FlowEvent::AnalysisStarted) {
            debug!(phase = %self.state.borrow().phase(), "No uploaded file to analyze");
            return;
        }

        let Some(file_id) = self.state.borrow().file_id().map(str::to_owned) else {
            return;
        };

        match self.backend.analyze_file(&file_id).await {
            Ok(result) => {
                info!(file_id = %file_id, "Analysis ready");
                self.dispatch(FlowEvent::AnalysisSucceeded(result));
            }
            Err(err) => {
                warn!(file_id = %file_id, error = %err, "Analysis failed");
                self.dispatch(FlowEvent::AnalysisFailed(ErrorValue::from(&err)));
            }
        }
    }

    /// Leave the results panel for a fresh upload.
    pub fn reset(&mut self) {
        self.dispatch(FlowEvent::Reset);
    }

    /// Leave the error panel for a fresh upload.
    pub fn retry(&mut self) {
        self.dispatch(FlowEvent::Reset);
    }

    fn dispatch(&self, event: FlowEvent) -> bool {
        self.state.send_if_modified(|state| state.apply(event))
    }
}
