//! Analysis flow controller.
//!
//! Four phases: upload → analyzing → results | error. [`FlowState`] is a sum
//! type, so a result and an error can never be held at once. Transitions are
//! pure ([`FlowState::apply`]); [`AnalysisFlow`] drives them from backend
//! calls and publishes every change on a watch channel for the view layer.

pub mod backend;
pub mod controller;
pub mod state;

pub use backend::AnalysisBackend;
pub use controller::AnalysisFlow;
pub use state::{ErrorValue, FlowEvent, FlowPhase, FlowState, UploadStage};
