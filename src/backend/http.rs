//! reqwest implementation of [`LabBackend`].
//!
//! ## Response shapes
//!
//! The service answers `/upload` failures with HTTP 200 and an
//! `{"error": "..."}` body instead of a status code, so the upload
//! response is decoded into a struct where both `text` and `error` are
//! optional. `/analyze` and `/generate_report` use proper status codes and
//! put the reason in `{"detail": "..."}`.

use super::{LabBackend, ReportPayload};
use crate::error::{AdvisorError, Stage, StageError, StageErrorKind};
use crate::pipeline::input::SelectedFile;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Backend used when `BLOODTEST_BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "https://bloodtest-advisor-backend.onrender.com";

/// Longest slice of an unparseable error body quoted back to the user.
const MAX_DETAIL_CHARS: usize = 200;

static FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\*?\s*=\s*(?:UTF-8'')?"?([^";]+)"?"#).unwrap()
});

/// HTTP client for the blood-test analysis service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    analysis: String,
}

#[derive(Deserialize)]
struct HealthResponse {
    message: String,
}

/// FastAPI puts the reason in `detail`; the upload handler uses `error`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl HttpBackend {
    /// Create a client for `base_url`. A trailing `/` is ignored.
    ///
    /// `timeout` of `None` means requests wait as long as the server takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AdvisorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| AdvisorError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send_error(&self, stage: Stage, e: reqwest::Error) -> StageError {
        let kind = if e.is_connect() {
            StageErrorKind::Connection {
                base_url: self.base_url.clone(),
            }
        } else if e.is_timeout() {
            StageErrorKind::Timeout {
                secs: self.timeout.map(|t| t.as_secs()).unwrap_or(0),
            }
        } else {
            StageErrorKind::Request(e.to_string())
        };
        StageError::new(stage, kind)
    }

    /// Turn a non-2xx response into a [`StageError`], quoting the server's
    /// `detail` when it sent one.
    async fn status_error(stage: Stage, response: reqwest::Response) -> StageError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!("{} returned HTTP {}: {}", stage, status, detail);
        StageError::new(stage, StageErrorKind::HttpStatus { status, detail })
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        stage: Stage,
        response: reqwest::Response,
    ) -> Result<T, StageError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| self.send_error(stage, e))?;
        serde_json::from_slice(&body)
            .map_err(|e| StageError::new(stage, StageErrorKind::ResponseParsing(e.to_string())))
    }
}

#[async_trait]
impl LabBackend for HttpBackend {
    async fn extract_text(&self, file: &SelectedFile) -> Result<String, StageError> {
        let stage = Stage::Upload;
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| StageError::new(stage, StageErrorKind::Request(e.to_string())))?;
        let form = Form::new().part("file", part);

        debug!("POST {} ({} bytes)", self.url("upload"), file.len());
        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error(stage, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(stage, response).await);
        }

        let parsed: UploadResponse = self.read_json(stage, response).await?;
        if let Some(error) = parsed.error {
            return Err(StageError::new(stage, StageErrorKind::Backend(error)));
        }
        Ok(parsed.text.unwrap_or_default())
    }

    async fn analyze(&self, text: &str) -> Result<String, StageError> {
        let stage = Stage::Analyze;
        debug!("POST {} ({} chars)", self.url("analyze"), text.len());
        let response = self
            .client
            .post(self.url("analyze"))
            .json(&TextRequest { text })
            .send()
            .await
            .map_err(|e| self.send_error(stage, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(stage, response).await);
        }

        let parsed: AnalyzeResponse = self.read_json(stage, response).await?;
        Ok(parsed.analysis)
    }

    async fn generate_report(&self, text: &str) -> Result<ReportPayload, StageError> {
        let stage = Stage::Report;
        debug!("POST {} ({} chars)", self.url("generate_report"), text.len());
        let response = self
            .client
            .post(self.url("generate_report"))
            .json(&TextRequest { text })
            .send()
            .await
            .map_err(|e| self.send_error(stage, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(stage, response).await);
        }

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let server_filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_disposition);

        if let Some(ct) = content_type.as_deref() {
            if !ct.starts_with("application/pdf") {
                warn!("Report response has Content-Type '{}', saving anyway", ct);
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.send_error(stage, e))?
            .to_vec();

        Ok(ReportPayload {
            bytes,
            content_type,
            server_filename,
        })
    }

    async fn health(&self) -> Result<String, StageError> {
        let stage = Stage::HealthCheck;
        let response = self
            .client
            .get(self.url(""))
            .send()
            .await
            .map_err(|e| self.send_error(stage, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(stage, response).await);
        }

        let parsed: HealthResponse = self.read_json(stage, response).await?;
        Ok(parsed.message)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Pull `detail` (or `error`) out of a JSON error body, falling back to a
/// truncated copy of the raw body.
fn extract_detail(body: &str) -> String {
    if let Ok(ErrorBody { detail, error }) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(value) = detail.or(error) {
            return match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_DETAIL_CHARS {
        let cut: String = trimmed.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{cut}\u{2026}")
    } else {
        trimmed.to_string()
    }
}

/// Extract the filename from a `Content-Disposition` header value.
pub(crate) fn parse_content_disposition(value: &str) -> Option<String> {
    FILENAME_RE
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
