//! Renders flow state changes as terminal progress.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pdflens_flow::{FlowPhase, FlowState};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const UPLOAD_TEMPLATE: &str = "{msg:>10} [{bar:40.cyan/blue}] {pos:>3}%";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

/// Follow the upload stage until it settles (confirmed, failed, or left).
pub fn track_upload(mut rx: watch::Receiver<FlowState>, quiet: bool) -> JoinHandle<()> {
    let bar = upload_bar(quiet);

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let Some(stage) = state.upload_stage() else {
                bar.finish_and_clear();
                return;
            };

            bar.set_position(u64::from(stage.progress));
            if stage.is_uploading {
                continue;
            }
            if stage.file.is_some() {
                bar.finish_with_message("uploaded");
            } else {
                bar.abandon_with_message("failed");
            }
            return;
        }
        bar.finish_and_clear();
    })
}

/// Spin while the flow is analyzing.
pub fn track_analysis(mut rx: watch::Receiver<FlowState>, quiet: bool) -> JoinHandle<()> {
    let spinner = analysis_spinner(quiet);

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().phase() != FlowPhase::Analyzing {
                break;
            }
        }
        spinner.finish_and_clear();
    })
}

fn upload_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template(UPLOAD_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message("uploading");
    bar
}

fn analysis_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message("analyzing");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
