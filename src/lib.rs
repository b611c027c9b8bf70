//! # bloodtest-advisor
//!
//! Client for a blood-test analysis service: upload a photo of a lab
//! report, read back the extracted text and an AI interpretation, and
//! download the interpretation as a PDF.
//!
//! Text extraction, analysis and PDF rendering all happen on the backend.
//! This crate owns the client side: the widget state, the request
//! sequence, and saving the report.
//!
//! ## Flow
//!
//! ```text
//! image
//!  │
//!  ├─ 1. Select   read the file, guess its MIME type
//!  ├─ 2. Upload   POST /upload          → extracted text
//!  ├─ 3. Analyze  POST /analyze         → analysis   (skipped if no text)
//!  └─ 4. Report   POST /generate_report → PDF → clinical_lab_report_YYYYMMDD_HHMM.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bloodtest_advisor::{AdvisorConfig, SelectedFile, UploadWidget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend from BLOODTEST_BACKEND_URL, else the public default.
//!     let config = AdvisorConfig::builder().output_dir("reports").build()?;
//!     let widget = UploadWidget::new(&config)?;
//!
//!     widget.select_file(SelectedFile::from_path("cbc.jpg").await?);
//!     let outcome = widget.upload().await?;
//!     println!("{}", outcome.extraction.text);
//!
//!     if outcome.analysis.is_some() {
//!         let saved = widget.generate_report().await?;
//!         eprintln!("saved {}", saved.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bloodtest` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod clock;
pub mod config;
pub mod download;
pub mod error;
pub mod observer;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod view;
pub mod widget;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{HttpBackend, LabBackend, ReportPayload, DEFAULT_BACKEND_URL};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{resolve_base_url, AdvisorConfig, AdvisorConfigBuilder, BACKEND_URL_ENV};
pub use download::{DirectorySink, DownloadSink};
pub use error::{AdvisorError, Stage, StageError, StageErrorKind};
pub use observer::{NoopObserver, WidgetObserver};
pub use output::{SavedReport, SessionOutput, SessionStats};
pub use pipeline::analyze::Analysis;
pub use pipeline::extract::Extraction;
pub use pipeline::input::SelectedFile;
pub use pipeline::report::{report_filename, ReportFile};
pub use pipeline::PipelineOutcome;
pub use session::{analyze_image, analyze_image_sync, analyze_image_with_report, check_backend};
pub use view::{TerminalRenderer, Theme, WidgetView};
pub use widget::{UiStatus, UploadWidget};
