//! Shared test doubles: an in-memory backend, a recording sink and a
//! recording observer.

#![allow(dead_code)]

use async_trait::async_trait;
use bloodtest_advisor::{
    AdvisorError, DownloadSink, LabBackend, ReportFile, ReportPayload, SelectedFile, Stage,
    StageError, StageErrorKind, UiStatus, WidgetObserver,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Pauses `extract_text` until released, so a test can act mid-request.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

pub struct MockBackend {
    extract: Mutex<Result<String, StageErrorKind>>,
    analyze: Mutex<Result<String, StageErrorKind>>,
    report: Mutex<Result<Vec<u8>, StageErrorKind>>,
    pub extract_calls: AtomicUsize,
    pub analyze_calls: AtomicUsize,
    pub report_calls: AtomicUsize,
    pub analyzed_texts: Mutex<Vec<String>>,
    pub reported_texts: Mutex<Vec<String>>,
    pub uploaded_names: Mutex<Vec<String>>,
    gate: Option<Arc<Gate>>,
}

impl MockBackend {
    pub fn new(extracted: &str, analysis: &str) -> Self {
        Self {
            extract: Mutex::new(Ok(extracted.to_string())),
            analyze: Mutex::new(Ok(analysis.to_string())),
            report: Mutex::new(Ok(b"%PDF-1.4 mock".to_vec())),
            extract_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
            analyzed_texts: Mutex::new(Vec::new()),
            reported_texts: Mutex::new(Vec::new()),
            uploaded_names: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_extract(&self, r: Result<&str, StageErrorKind>) {
        *self.extract.lock().unwrap() = r.map(str::to_string);
    }

    pub fn set_analyze(&self, r: Result<&str, StageErrorKind>) {
        *self.analyze.lock().unwrap() = r.map(str::to_string);
    }

    pub fn set_report(&self, r: Result<&[u8], StageErrorKind>) {
        *self.report.lock().unwrap() = r.map(<[u8]>::to_vec);
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.extract_calls.load(Ordering::SeqCst),
            self.analyze_calls.load(Ordering::SeqCst),
            self.report_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl LabBackend for MockBackend {
    async fn extract_text(&self, file: &SelectedFile) -> Result<String, StageError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded_names
            .lock()
            .unwrap()
            .push(file.name().to_string());
        if let Some(ref gate) = self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        let r = self.extract.lock().unwrap().clone();
        r.map_err(|k| StageError::new(Stage::Upload, k))
    }

    async fn analyze(&self, text: &str) -> Result<String, StageError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.analyzed_texts.lock().unwrap().push(text.to_string());
        let r = self.analyze.lock().unwrap().clone();
        r.map_err(|k| StageError::new(Stage::Analyze, k))
    }

    async fn generate_report(&self, text: &str) -> Result<ReportPayload, StageError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.reported_texts.lock().unwrap().push(text.to_string());
        let r = self.report.lock().unwrap().clone();
        r.map(|bytes| ReportPayload {
            bytes,
            content_type: Some("application/pdf".into()),
            server_filename: Some("clinical_lab_report_20240305_090712.pdf".into()),
        })
        .map_err(|k| StageError::new(Stage::Report, k))
    }

    async fn health(&self) -> Result<String, StageError> {
        Ok("Welcome to Blood Test Analysis API".into())
    }

    fn describe(&self) -> String {
        "mock".into()
    }
}

/// Keeps every report in memory instead of writing it.
///
/// With [`RecordingSink::fail_with`] set, every save is rejected with an
/// `Internal` error carrying that text.
#[derive(Default)]
pub struct RecordingSink {
    pub saved: Mutex<Vec<ReportFile>>,
    pub attempts: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn fail_with(&self, reason: Option<&str>) {
        *self.failure.lock().unwrap() = reason.map(str::to_string);
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn save(&self, report: &ReportFile) -> Result<PathBuf, AdvisorError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(AdvisorError::Internal(reason));
        }
        self.saved.lock().unwrap().push(report.clone());
        Ok(PathBuf::from("/downloads").join(&report.filename))
    }
}

/// Records every status the widget reports.
#[derive(Default)]
pub struct StatusLog {
    pub statuses: Mutex<Vec<UiStatus>>,
    pub stage_errors: Mutex<Vec<Stage>>,
}

impl StatusLog {
    pub fn statuses(&self) -> Vec<UiStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl WidgetObserver for StatusLog {
    fn on_status_change(&self, status: &UiStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }

    fn on_stage_error(&self, error: &StageError) {
        self.stage_errors.lock().unwrap().push(error.stage);
    }
}

pub fn connection_refused() -> StageErrorKind {
    StageErrorKind::Connection {
        base_url: "http://127.0.0.1:9".into(),
    }
}

/// Route library logs through the test harness; `RUST_LOG` filters them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
