//! The analysis backend seam.
//!
//! Everything the widget needs from the remote service is behind
//! [`LabBackend`]: one method per endpoint. [`HttpBackend`] talks to the
//! real service with reqwest; tests and embedders can supply their own
//! implementation through [`crate::config::AdvisorConfigBuilder::backend`].

mod http;

pub use http::{HttpBackend, DEFAULT_BACKEND_URL};

use crate::error::StageError;
use crate::pipeline::input::SelectedFile;
use async_trait::async_trait;
use std::sync::Arc;

/// A PDF report as returned by the report endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPayload {
    /// Raw response body. Expected to be a PDF; not verified.
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the server, if any.
    pub content_type: Option<String>,
    /// Filename from `Content-Disposition`, if the server sent one.
    pub server_filename: Option<String>,
}

/// Remote text-extraction, analysis and report service.
#[async_trait]
pub trait LabBackend: Send + Sync {
    /// `POST /upload`: image → extracted text (possibly empty).
    async fn extract_text(&self, file: &SelectedFile) -> Result<String, StageError>;

    /// `POST /analyze`: extracted text → analysis.
    async fn analyze(&self, text: &str) -> Result<String, StageError>;

    /// `POST /generate_report`: analysis text → PDF bytes.
    async fn generate_report(&self, text: &str) -> Result<ReportPayload, StageError>;

    /// `GET /`: liveness probe returning the backend's greeting.
    async fn health(&self) -> Result<String, StageError>;

    /// Where this backend lives, for log lines.
    fn describe(&self) -> String;
}

/// Convenience alias matching the type stored in [`crate::config::AdvisorConfig`].
pub type SharedBackend = Arc<dyn LabBackend>;
