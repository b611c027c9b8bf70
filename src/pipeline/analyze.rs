//! Stage 2: send the extracted text for AI analysis.
//!
//! The analysis endpoint is only called for a non-empty extraction. An
//! empty extraction short-circuits to `Ok(None)` without a request.

use crate::backend::LabBackend;
use crate::error::StageError;
use crate::pipeline::extract::Extraction;
use std::time::Instant;
use tracing::{debug, info};

/// The backend's interpretation of an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub text: String,
    pub duration_ms: u64,
}

/// Analyze `extraction`, or return `None` if there is nothing to analyze.
pub async fn run(
    backend: &dyn LabBackend,
    extraction: &Extraction,
) -> Result<Option<Analysis>, StageError> {
    if extraction.is_empty() {
        debug!("Skipping analysis: extraction is empty");
        return Ok(None);
    }

    let start = Instant::now();
    let text = backend.analyze(&extraction.text).await?;
    let duration_ms = start.elapsed().as_millis() as u64;
    info!("Analysis received: {} chars in {}ms", text.len(), duration_ms);

    Ok(Some(Analysis { text, duration_ms }))
}
