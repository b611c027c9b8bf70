//! Headless entry points.
//!
//! These drive a fresh [`UploadWidget`] through the same actions a user
//! would take (select, upload, optionally generate the report) and collect
//! the results into a [`SessionOutput`]. The CLI is built on them.

use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::output::{SessionOutput, SessionStats};
use crate::pipeline::input::SelectedFile;
use crate::widget::UploadWidget;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Upload the image at `path` and analyze it.
///
/// # Errors
/// - the file cannot be read
/// - the upload or analysis request fails
pub async fn analyze_image(
    path: impl AsRef<Path>,
    config: &AdvisorConfig,
) -> Result<SessionOutput, AdvisorError> {
    run(path.as_ref(), config, false).await
}

/// Like [`analyze_image`], then generate the PDF report and save it.
///
/// When the image yields no text there is nothing to report on; the
/// output then has `analysis: None` and `report: None` and no report
/// request is made.
pub async fn analyze_image_with_report(
    path: impl AsRef<Path>,
    config: &AdvisorConfig,
) -> Result<SessionOutput, AdvisorError> {
    run(path.as_ref(), config, true).await
}

/// Synchronous wrapper around [`analyze_image`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_image_sync(
    path: impl AsRef<Path>,
    config: &AdvisorConfig,
) -> Result<SessionOutput, AdvisorError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AdvisorError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze_image(path, config))
}

/// Probe the backend's root endpoint and return its greeting.
pub async fn check_backend(config: &AdvisorConfig) -> Result<String, AdvisorError> {
    let backend = config.resolve_backend()?;
    info!("Checking backend at {}", backend.describe());
    Ok(backend.health().await?)
}

async fn run(
    path: &Path,
    config: &AdvisorConfig,
    with_report: bool,
) -> Result<SessionOutput, AdvisorError> {
    let total_start = Instant::now();
    let widget = UploadWidget::new(config)?;

    let file = SelectedFile::from_path(path).await?;
    let file_name = file.name().to_string();
    widget.select_file(file);

    let outcome = widget.upload().await?;

    let report = match (&outcome.analysis, with_report) {
        (Some(_), true) => Some(widget.generate_report().await?),
        (None, true) => {
            info!("No text extracted from '{}'; skipping report", file_name);
            None
        }
        _ => None,
    };

    let stats = SessionStats {
        upload_ms: outcome.extraction.duration_ms,
        analyze_ms: outcome.analysis.as_ref().map(|a| a.duration_ms),
        report_ms: report.as_ref().map(|r| r.duration_ms),
        total_ms: total_start.elapsed().as_millis() as u64,
    };
    info!("Session complete in {}ms", stats.total_ms);

    Ok(SessionOutput {
        file_name,
        extracted_text: outcome.extraction.text,
        analysis: outcome.analysis.map(|a| a.text),
        report,
        stats,
    })
}
