//! Error types for the bloodtest-advisor library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`StageError`] — one network stage (upload, analyze, report, health
//!   check) failed. It names the stage and carries a [`StageErrorKind`]
//!   so callers can tell a refused connection from a backend-reported
//!   failure without string matching.
//!
//! * [`AdvisorError`] — everything a widget operation or session entry
//!   point can return: local validation failures, file I/O, a rejected
//!   concurrent call, or a wrapped [`StageError`].
//!
//! [`AdvisorError::user_message`] yields the text the widget shows in its
//! error line. Report failures always map to [`REPORT_FAILED_MESSAGE`]; the
//! underlying detail goes to the log only.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Shown when `upload()` is invoked without a selected file.
pub const NO_FILE_MESSAGE: &str = "Please select a file.";

/// Shown for any report-generation failure, whatever the cause.
pub const REPORT_FAILED_MESSAGE: &str = "An error occurred while generating the PDF.";

/// Which backend call a [`StageError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// `POST /upload` — image → extracted text.
    Upload,
    /// `POST /analyze` — extracted text → analysis.
    Analyze,
    /// `POST /generate_report` — analysis → PDF bytes.
    Report,
    /// `GET /` — backend liveness probe.
    HealthCheck,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Analyze => write!(f, "analysis"),
            Self::Report => write!(f, "report generation"),
            Self::HealthCheck => write!(f, "health check"),
        }
    }
}

/// What went wrong inside a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageErrorKind {
    /// TCP/TLS connection to the backend could not be established.
    #[error("could not connect to backend at {base_url}")]
    Connection { base_url: String },

    /// The configured per-request timeout elapsed.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Backend answered with a non-2xx status.
    #[error("request failed with status code {status}{}", detail_suffix(.detail))]
    HttpStatus { status: u16, detail: String },

    /// Backend answered 2xx but reported a failure in the body (`{"error": ...}`).
    #[error("{0}")]
    Backend(String),

    /// Response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    ResponseParsing(String),

    /// Any other transport-level failure reported by the HTTP client.
    #[error("{0}")]
    Request(String),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}

/// A failed backend call, tagged with the stage it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed: {kind}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub kind: StageErrorKind,
}

impl StageError {
    pub fn new(stage: Stage, kind: StageErrorKind) -> Self {
        Self { stage, kind }
    }
}

/// All errors returned by widget operations and session entry points.
#[derive(Debug, Error)]
pub enum AdvisorError {
    // ── Validation ────────────────────────────────────────────────────────
    /// `upload()` was called before any file was selected.
    #[error("{}", NO_FILE_MESSAGE)]
    NoFileSelected,

    /// `generate_report()` was called before an analysis exists.
    #[error("Nothing to report yet: run an analysis first.")]
    NoAnalysis,

    /// Another upload or report request is still outstanding on this widget.
    #[error("A {operation} is already in progress; wait for it to finish.")]
    Busy { operation: &'static str },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Backend errors ────────────────────────────────────────────────────
    /// A backend call failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The downloaded report could not be written to disk.
    #[error("Failed to write report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdvisorError {
    /// The stage this error came from, when it is a backend failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage(e) => Some(e.stage),
            _ => None,
        }
    }

    /// Text to show in the widget's error line.
    ///
    /// Upload and analysis failures show the raw message. Report failures,
    /// including writing the file, collapse to [`REPORT_FAILED_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Stage(StageError {
                stage: Stage::Report,
                ..
            })
            | Self::ReportWriteFailed { .. } => REPORT_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_display_is_user_facing() {
        assert_eq!(AdvisorError::NoFileSelected.to_string(), NO_FILE_MESSAGE);
        assert_eq!(AdvisorError::NoFileSelected.user_message(), NO_FILE_MESSAGE);
    }

    #[test]
    fn http_status_display_with_detail() {
        let e = StageError::new(
            Stage::Analyze,
            StageErrorKind::HttpStatus {
                status: 500,
                detail: "model overloaded".into(),
            },
        );
        let msg = e.to_string();
        assert!(msg.contains("analysis failed"), "got: {msg}");
        assert!(msg.contains("status code 500"), "got: {msg}");
        assert!(msg.ends_with(": model overloaded"), "got: {msg}");
    }

    #[test]
    fn http_status_display_without_detail() {
        let kind = StageErrorKind::HttpStatus {
            status: 502,
            detail: String::new(),
        };
        assert_eq!(kind.to_string(), "request failed with status code 502");
    }

    #[test]
    fn upload_failure_keeps_raw_message() {
        let e: AdvisorError = StageError::new(
            Stage::Upload,
            StageErrorKind::Backend("unsupported file type".into()),
        )
        .into();
        assert_eq!(e.stage(), Some(Stage::Upload));
        assert!(e.user_message().contains("unsupported file type"));
    }

    #[test]
    fn report_failure_hides_detail() {
        let e: AdvisorError = StageError::new(
            Stage::Report,
            StageErrorKind::Connection {
                base_url: "http://10.0.0.1:9".into(),
            },
        )
        .into();
        assert_eq!(e.user_message(), REPORT_FAILED_MESSAGE);
        assert!(e.to_string().contains("10.0.0.1"));
    }

    #[test]
    fn report_write_failure_hides_detail() {
        let e = AdvisorError::ReportWriteFailed {
            path: PathBuf::from("/readonly/report.pdf"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(e.user_message(), REPORT_FAILED_MESSAGE);
    }

    #[test]
    fn busy_display_names_operation() {
        let e = AdvisorError::Busy { operation: "upload" };
        assert!(e.to_string().contains("upload"));
        assert_eq!(e.stage(), None);
    }
}
