//! Serialisable results of a session run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A report that was generated and written by the download sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedReport {
    /// Client-chosen name, `clinical_lab_report_<YYYYMMDD>_<HHMM>.pdf`.
    pub filename: String,
    /// Where the sink put it. Differs from `filename` only in directory
    /// and, on a same-minute collision, a ` (n)` suffix.
    pub path: PathBuf,
    pub size_bytes: usize,
    /// Name the server suggested via `Content-Disposition`, if any.
    pub server_filename: Option<String>,
    pub duration_ms: u64,
}

/// Timings for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub upload_ms: u64,
    /// `None` when no analysis ran (empty extraction).
    pub analyze_ms: Option<u64>,
    /// `None` when no report was requested.
    pub report_ms: Option<u64>,
    pub total_ms: u64,
}

/// Everything one headless run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutput {
    pub file_name: String,
    pub extracted_text: String,
    /// `None` when the image yielded no text.
    pub analysis: Option<String>,
    pub report: Option<SavedReport>,
    pub stats: SessionStats,
}
