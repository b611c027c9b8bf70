//! Observer trait for widget status and stage events.
//!
//! Inject an [`Arc<dyn WidgetObserver>`] via
//! [`crate::config::AdvisorConfigBuilder::observer`] to be told when the
//! widget's [`UiStatus`] changes and when each backend stage starts or
//! finishes. A front end uses this to re-render; the CLI drives its
//! spinner from it.
//!
//! # Example
//!
//! ```rust
//! use bloodtest_advisor::{AdvisorConfig, UiStatus, WidgetObserver};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct StatusLog(Mutex<Vec<UiStatus>>);
//!
//! impl WidgetObserver for StatusLog {
//!     fn on_status_change(&self, status: &UiStatus) {
//!         self.0.lock().unwrap().push(status.clone());
//!     }
//! }
//!
//! let config = AdvisorConfig::builder()
//!     .observer(Arc::new(StatusLog::default()) as Arc<dyn WidgetObserver>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::{Stage, StageError};
use crate::widget::UiStatus;
use std::path::Path;
use std::sync::Arc;

/// Called by the widget as its state changes.
///
/// All methods have default no-op implementations so callers only
/// override what they care about. Methods are invoked outside the widget's
/// internal lock, so an implementation may call back into the widget's
/// read accessors.
pub trait WidgetObserver: Send + Sync {
    /// The widget's status line changed.
    fn on_status_change(&self, status: &UiStatus) {
        let _ = status;
    }

    /// A backend request is about to be sent.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// A backend request succeeded.
    ///
    /// `output_len` is the byte length of what the stage produced
    /// (extracted text, analysis text, or PDF payload).
    fn on_stage_complete(&self, stage: Stage, output_len: usize, duration_ms: u64) {
        let _ = (stage, output_len, duration_ms);
    }

    /// A backend request failed.
    fn on_stage_error(&self, error: &StageError) {
        let _ = error;
    }

    /// A report was handed to the download sink.
    fn on_report_saved(&self, path: &Path) {
        let _ = path;
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopObserver;

impl WidgetObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::AdvisorConfig`].
pub type SharedObserver = Arc<dyn WidgetObserver>;
