//! Pipeline stages for the upload → analyze → report chain.
//!
//! Each submodule implements exactly one step and returns its own
//! intermediate type, so a caller can see which stage produced what and
//! where a failure happened.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ analyze ──▶ report
//! (file)    (/upload)   (/analyze)  (/generate_report)
//! ```
//!
//! 1. [`input`]   — read the user's image into a [`input::SelectedFile`]
//! 2. [`extract`] — upload it; yields an [`extract::Extraction`]
//! 3. [`analyze`] — send non-empty extracted text; yields an [`analyze::Analysis`]
//! 4. [`report`]  — send the analysis; yields a [`report::ReportFile`] with
//!    its timestamped filename
//!
//! Stages never touch widget state. [`crate::widget::UploadWidget`] drives
//! them and records the results.

pub mod analyze;
pub mod extract;
pub mod input;
pub mod report;

use analyze::Analysis;
use extract::Extraction;

/// Result of a successful upload-analyze run.
///
/// `analysis` is `None` when extraction returned no text and the analysis
/// stage was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub extraction: Extraction,
    pub analysis: Option<Analysis>,
}
