//! Configuration for the upload-and-analyze widget.
//!
//! All behaviour is controlled through [`AdvisorConfig`], built via its
//! [`AdvisorConfigBuilder`]. The collaborators the widget talks to (the
//! backend, the download sink, the clock, the observer) are all injectable
//! here so a test can swap any of them without touching the widget.

use crate::backend::{HttpBackend, SharedBackend, DEFAULT_BACKEND_URL};
use crate::clock::{SharedClock, SystemClock};
use crate::download::{DirectorySink, SharedSink};
use crate::error::AdvisorError;
use crate::observer::SharedObserver;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding [`DEFAULT_BACKEND_URL`].
pub const BACKEND_URL_ENV: &str = "BLOODTEST_BACKEND_URL";

/// Resolve the backend base URL from the environment, else the default.
///
/// Blank values are ignored. A trailing `/` is trimmed.
pub fn resolve_base_url() -> String {
    resolve_base_url_from(std::env::var(BACKEND_URL_ENV).ok())
}

fn resolve_base_url_from(value: Option<String>) -> String {
    let url = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    url.trim_end_matches('/').to_string()
}

/// Configuration for an [`crate::widget::UploadWidget`] or a session run.
///
/// Built via [`AdvisorConfig::builder()`] or using
/// [`AdvisorConfig::default()`].
///
/// # Example
/// ```rust
/// use bloodtest_advisor::AdvisorConfig;
///
/// let config = AdvisorConfig::builder()
///     .base_url("http://localhost:8000")
///     .output_dir("reports")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://localhost:8000");
/// ```
#[derive(Clone)]
pub struct AdvisorConfig {
    /// Backend base URL, without trailing slash.
    /// Default: `$BLOODTEST_BACKEND_URL`, else [`DEFAULT_BACKEND_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. Default: `None` (wait indefinitely).
    ///
    /// Extraction and analysis on a cold backend can take well over a
    /// minute, so no timeout is applied unless asked for.
    pub request_timeout_secs: Option<u64>,

    /// Directory generated reports are written to. Default: `.`
    ///
    /// Ignored when [`AdvisorConfig::sink`] is set.
    pub output_dir: PathBuf,

    /// Pre-constructed backend. Takes precedence over `base_url`.
    pub backend: Option<SharedBackend>,

    /// Pre-constructed download sink. Takes precedence over `output_dir`.
    pub sink: Option<SharedSink>,

    /// Clock used for report filenames. Default: [`SystemClock`].
    pub clock: SharedClock,

    /// Optional observer for status and stage events.
    pub observer: Option<SharedObserver>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: resolve_base_url(),
            request_timeout_secs: None,
            output_dir: PathBuf::from("."),
            backend: None,
            sink: None,
            clock: Arc::new(SystemClock),
            observer: None,
        }
    }
}

impl fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("output_dir", &self.output_dir)
            .field("backend", &self.backend.as_ref().map(|b| b.describe()))
            .field("sink", &self.sink.as_ref().map(|_| "<dyn DownloadSink>"))
            .field("observer", &self.observer.as_ref().map(|_| "<dyn WidgetObserver>"))
            .finish()
    }
}

impl AdvisorConfig {
    /// Create a new builder for `AdvisorConfig`.
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder {
            config: Self::default(),
        }
    }

    /// The backend to talk to: the injected one, else an [`HttpBackend`]
    /// for `base_url`.
    pub fn resolve_backend(&self) -> Result<SharedBackend, AdvisorError> {
        if let Some(ref backend) = self.backend {
            return Ok(Arc::clone(backend));
        }
        let timeout = self.request_timeout_secs.map(Duration::from_secs);
        debug!("Using HTTP backend at {}", self.base_url);
        Ok(Arc::new(HttpBackend::new(&self.base_url, timeout)?))
    }

    /// Where reports go: the injected sink, else a [`DirectorySink`] on
    /// `output_dir`.
    pub fn resolve_sink(&self) -> SharedSink {
        match self.sink {
            Some(ref sink) => Arc::clone(sink),
            None => Arc::new(DirectorySink::new(self.output_dir.clone())),
        }
    }
}

/// Builder for [`AdvisorConfig`].
pub struct AdvisorConfigBuilder {
    config: AdvisorConfig,
}

impl fmt::Debug for AdvisorConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl AdvisorConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn backend(mut self, backend: SharedBackend) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.config.sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.config.clock = clock;
        self
    }

    pub fn observer(mut self, observer: SharedObserver) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AdvisorConfig, AdvisorError> {
        let c = &self.config;
        if c.backend.is_none() {
            if c.base_url.is_empty() {
                return Err(AdvisorError::InvalidConfig(
                    "Backend URL must not be empty".into(),
                ));
            }
            if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
                return Err(AdvisorError::InvalidConfig(format!(
                    "Backend URL must start with http:// or https://, got '{}'",
                    c.base_url
                )));
            }
        }
        if c.request_timeout_secs == Some(0) {
            return Err(AdvisorError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
