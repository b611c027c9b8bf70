//! The upload-and-analyze widget.
//!
//! [`UploadWidget`] holds the transient state of one widget instance and
//! exposes the three user actions: [`select_file`](UploadWidget::select_file),
//! [`upload`](UploadWidget::upload) and
//! [`generate_report`](UploadWidget::generate_report).
//!
//! ## State
//!
//! ```text
//! SelectedFile ──upload──▶ ExtractedText ──(non-empty)──▶ AnalysisResult ──report──▶ PDF
//! ```
//!
//! plus a single [`UiStatus`]. Status changes are pushed to the configured
//! [`crate::observer::WidgetObserver`].
//!
//! ## Concurrency
//!
//! At most one upload or report request is outstanding per widget. A
//! second call while one is in flight returns [`AdvisorError::Busy`]
//! straight away and leaves state and network alone. The internal state
//! lock is never held across an `.await`.

use crate::backend::SharedBackend;
use crate::clock::SharedClock;
use crate::config::AdvisorConfig;
use crate::download::SharedSink;
use crate::error::{AdvisorError, Stage, StageError, NO_FILE_MESSAGE, REPORT_FAILED_MESSAGE};
use crate::observer::{NoopObserver, SharedObserver};
use crate::output::SavedReport;
use crate::pipeline::input::SelectedFile;
use crate::pipeline::{analyze, extract, report, PipelineOutcome};
use crate::view::WidgetView;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Shown after a report has been saved.
pub const REPORT_DONE_MESSAGE: &str = "PDF generation complete";

/// The widget's single status line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum UiStatus {
    #[default]
    Idle,
    /// A request is outstanding; results are not rendered meanwhile.
    Loading,
    Error(String),
    Info(String),
}

impl UiStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(m) => Some(m),
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&str> {
        match self {
            Self::Info(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct WidgetState {
    pub(crate) selected: Option<Arc<SelectedFile>>,
    pub(crate) extracted_text: String,
    pub(crate) analysis: String,
    pub(crate) status: UiStatus,
}

/// One upload-and-analyze widget instance.
pub struct UploadWidget {
    state: Mutex<WidgetState>,
    in_flight: tokio::sync::Mutex<()>,
    backend: SharedBackend,
    sink: SharedSink,
    clock: SharedClock,
    observer: SharedObserver,
}

impl UploadWidget {
    /// Create a widget wired to the collaborators in `config`.
    pub fn new(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        Ok(Self {
            state: Mutex::new(WidgetState::default()),
            in_flight: tokio::sync::Mutex::new(()),
            backend: config.resolve_backend()?,
            sink: config.resolve_sink(),
            clock: Arc::clone(&config.clock),
            observer: config
                .observer
                .clone()
                .unwrap_or_else(|| Arc::new(NoopObserver)),
        })
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Remember `file` for the next upload and clear any error or info line.
    ///
    /// A `Loading` status is left alone: selecting a new file does not
    /// affect a request already in flight.
    pub fn select_file(&self, file: SelectedFile) {
        info!("File selected: {}", file.name());
        let cleared = {
            let mut s = self.lock();
            s.selected = Some(Arc::new(file));
            if matches!(s.status, UiStatus::Error(_) | UiStatus::Info(_)) {
                s.status = UiStatus::Idle;
                true
            } else {
                false
            }
        };
        if cleared {
            self.observer.on_status_change(&UiStatus::Idle);
        }
    }

    /// Upload the selected file, then analyze the extracted text.
    ///
    /// On return the status is never `Loading`: it is `Idle` on success and
    /// `Error` on failure. A failed analysis leaves the extracted text in
    /// place.
    pub async fn upload(&self) -> Result<PipelineOutcome, AdvisorError> {
        let _op = self
            .in_flight
            .try_lock()
            .map_err(|_| AdvisorError::Busy { operation: "upload" })?;

        let selected = self.lock().selected.clone();
        let Some(file) = selected else {
            warn!("Upload requested with no file selected");
            self.set_status(UiStatus::Error(NO_FILE_MESSAGE.to_string()));
            return Err(AdvisorError::NoFileSelected);
        };

        self.set_status(UiStatus::Loading);
        let _loading = LoadingGuard { widget: self };

        // ── Stage 1: extract ─────────────────────────────────────────────
        self.observer.on_stage_start(Stage::Upload);
        let extraction = match extract::run(self.backend.as_ref(), &file).await {
            Ok(e) => e,
            Err(e) => {
                // Results of an earlier file must not sit next to the new name.
                {
                    let mut s = self.lock();
                    s.extracted_text.clear();
                    s.analysis.clear();
                }
                return Err(self.fail(e));
            }
        };
        self.observer
            .on_stage_complete(Stage::Upload, extraction.text.len(), extraction.duration_ms);
        {
            let mut s = self.lock();
            s.extracted_text = extraction.text.clone();
            s.analysis.clear();
        }

        // ── Stage 2: analyze (only when there is text) ──────────────────
        let analysis = if extraction.is_empty() {
            None
        } else {
            self.observer.on_stage_start(Stage::Analyze);
            match analyze::run(self.backend.as_ref(), &extraction).await {
                Ok(a) => a,
                Err(e) => return Err(self.fail(e)),
            }
        };
        if let Some(ref a) = analysis {
            self.observer
                .on_stage_complete(Stage::Analyze, a.text.len(), a.duration_ms);
            self.lock().analysis = a.text.clone();
        }

        Ok(PipelineOutcome {
            extraction,
            analysis,
        })
    }

    /// Ask the backend for a PDF of the current analysis and save it.
    ///
    /// Any failure, including writing the file, shows the fixed
    /// [`REPORT_FAILED_MESSAGE`]; the returned error carries the detail.
    pub async fn generate_report(&self) -> Result<SavedReport, AdvisorError> {
        let _op = self.in_flight.try_lock().map_err(|_| AdvisorError::Busy {
            operation: "report generation",
        })?;

        let analysis = self.lock().analysis.clone();
        if analysis.is_empty() {
            let err = AdvisorError::NoAnalysis;
            self.set_status(UiStatus::Error(err.user_message()));
            return Err(err);
        }

        self.observer.on_stage_start(Stage::Report);
        let report = match report::run(self.backend.as_ref(), &analysis, self.clock.as_ref()).await {
            Ok(r) => r,
            Err(e) => {
                error!("PDF generation failed: {}", e);
                self.observer.on_stage_error(&e);
                self.set_status(UiStatus::Error(REPORT_FAILED_MESSAGE.to_string()));
                return Err(e.into());
            }
        };
        self.observer
            .on_stage_complete(Stage::Report, report.bytes.len(), report.duration_ms);

        let path = match self.sink.save(&report).await {
            Ok(p) => p,
            Err(e) => {
                error!("Saving PDF '{}' failed: {}", report.filename, e);
                self.set_status(UiStatus::Error(REPORT_FAILED_MESSAGE.to_string()));
                return Err(e);
            }
        };
        self.observer.on_report_saved(&path);
        self.set_status(UiStatus::Info(REPORT_DONE_MESSAGE.to_string()));

        Ok(SavedReport {
            filename: report.filename,
            path,
            size_bytes: report.bytes.len(),
            server_filename: report.server_filename,
            duration_ms: report.duration_ms,
        })
    }

    // ── Read accessors ───────────────────────────────────────────────────

    pub fn selected_file(&self) -> Option<Arc<SelectedFile>> {
        self.lock().selected.clone()
    }

    pub fn extracted_text(&self) -> String {
        self.lock().extracted_text.clone()
    }

    pub fn analysis(&self) -> String {
        self.lock().analysis.clone()
    }

    pub fn status(&self) -> UiStatus {
        self.lock().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().status.is_loading()
    }

    /// Whether an upload or report request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Snapshot of what a front end should display right now.
    pub fn view(&self) -> WidgetView {
        WidgetView::from_state(&self.lock())
    }

    // ── Internal ─────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: UiStatus) {
        {
            let mut s = self.lock();
            if s.status == status {
                return;
            }
            s.status = status.clone();
        }
        self.observer.on_status_change(&status);
    }

    /// Record an upload/analyze failure and convert it for the caller.
    fn fail(&self, e: StageError) -> AdvisorError {
        error!("{}", e);
        self.observer.on_stage_error(&e);
        let err = AdvisorError::from(e);
        self.set_status(UiStatus::Error(err.user_message()));
        err
    }
}

/// Clears `Loading` when the upload finishes, however it finishes.
///
/// Covers early returns on error and the upload future being dropped
/// mid-request. An `Error` status set before the drop is kept.
struct LoadingGuard<'a> {
    widget: &'a UploadWidget,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.widget.is_loading() {
            self.widget.set_status(UiStatus::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LabBackend, ReportPayload};
    use crate::error::StageErrorKind;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl LabBackend for Unreachable {
        async fn extract_text(&self, _file: &SelectedFile) -> Result<String, StageError> {
            Err(StageError::new(
                Stage::Upload,
                StageErrorKind::Connection {
                    base_url: "http://127.0.0.1:9".into(),
                },
            ))
        }
        async fn analyze(&self, _text: &str) -> Result<String, StageError> {
            unreachable!("analysis must not run after a failed upload")
        }
        async fn generate_report(&self, _text: &str) -> Result<ReportPayload, StageError> {
            unreachable!()
        }
        async fn health(&self) -> Result<String, StageError> {
            unreachable!()
        }
        fn describe(&self) -> String {
            "unreachable".into()
        }
    }

    fn widget() -> UploadWidget {
        let config = AdvisorConfig::builder()
            .backend(Arc::new(Unreachable))
            .build()
            .unwrap();
        UploadWidget::new(&config).unwrap()
    }

    #[test]
    fn new_widget_is_idle_and_empty() {
        let w = widget();
        assert_eq!(w.status(), UiStatus::Idle);
        assert!(w.selected_file().is_none());
        assert!(w.extracted_text().is_empty());
        assert!(w.analysis().is_empty());
        assert!(!w.is_busy());
    }

    #[test]
    fn select_file_clears_error() {
        let w = widget();
        w.set_status(UiStatus::Error("old".into()));
        w.select_file(SelectedFile::from_bytes("a.png", vec![1, 2, 3]));
        assert_eq!(w.status(), UiStatus::Idle);
        assert_eq!(w.selected_file().unwrap().name(), "a.png");
    }

    #[test]
    fn select_file_keeps_loading() {
        let w = widget();
        w.set_status(UiStatus::Loading);
        w.select_file(SelectedFile::from_bytes("b.png", vec![1]));
        assert_eq!(w.status(), UiStatus::Loading);
    }

    #[tokio::test]
    async fn upload_without_file_is_validation_error() {
        let w = widget();
        let err = w.upload().await.unwrap_err();
        assert!(matches!(err, AdvisorError::NoFileSelected));
        assert_eq!(w.status(), UiStatus::Error(NO_FILE_MESSAGE.into()));
    }

    #[tokio::test]
    async fn connection_failure_clears_loading() {
        let w = widget();
        w.select_file(SelectedFile::from_bytes("a.png", vec![1]));
        let err = w.upload().await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Upload));
        assert!(!w.is_loading());
        assert!(w.status().error().unwrap().contains("127.0.0.1:9"));
        assert!(!w.is_busy());
    }

    #[tokio::test]
    async fn report_without_analysis_is_rejected() {
        let w = widget();
        let err = w.generate_report().await.unwrap_err();
        assert!(matches!(err, AdvisorError::NoAnalysis));
        assert!(w.status().error().is_some());
    }

    #[test]
    fn ui_status_serialises_tagged() {
        let json = serde_json::to_string(&UiStatus::Info("done".into())).unwrap();
        assert_eq!(json, r#"{"state":"info","message":"done"}"#);
        let json = serde_json::to_string(&UiStatus::Idle).unwrap();
        assert_eq!(json, r#"{"state":"idle"}"#);
    }
}
