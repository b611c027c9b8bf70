//! Where generated reports go.
//!
//! In a browser the widget would hand the PDF to the user agent as a
//! download. Here that side effect is a [`DownloadSink`]: the widget calls
//! [`DownloadSink::save`] exactly once per successful report.
//! [`DirectorySink`] is the default and writes into a directory.

use crate::error::AdvisorError;
use crate::pipeline::report::ReportFile;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Receives generated reports.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Persist `report` and return where it ended up.
    async fn save(&self, report: &ReportFile) -> Result<PathBuf, AdvisorError>;
}

/// Convenience alias matching the type stored in [`crate::config::AdvisorConfig`].
pub type SharedSink = Arc<dyn DownloadSink>;

/// Writes reports into a directory, creating it if needed.
///
/// The final name is reserved with an exclusive create before anything is
/// written, so an existing file is never replaced: if the name is taken, a
/// ` (1)`, ` (2)`, … suffix is added before the extension. The content is
/// written to a temp file and renamed over the reservation, so the PDF
/// appears complete or not at all.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_err(path: &Path, source: io::Error) -> AdvisorError {
    AdvisorError::ReportWriteFailed {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, report: &ReportFile) -> Result<PathBuf, AdvisorError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_err(&self.dir, e))?;

        let path = reserve_path(&self.dir, &report.filename).await?;
        let tmp_path = path.with_extension("pdf.tmp");

        let written = match tokio::fs::write(&tmp_path, &report.bytes).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            let _ = tokio::fs::remove_file(&path).await;
            return Err(write_err(&path, e));
        }

        info!("Saved report to {}", path.display());
        Ok(path)
    }
}

/// Claim the first of `name`, `stem (1).ext`, `stem (2).ext`, … in `dir`
/// by creating it empty with `create_new`.
async fn reserve_path(dir: &Path, name: &str) -> Result<PathBuf, AdvisorError> {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) => (s, format!(".{e}")),
        None => (name, String::new()),
    };

    let mut n = 0u32;
    loop {
        let candidate = if n == 0 {
            dir.join(name)
        } else {
            dir.join(format!("{stem} ({n}){ext}"))
        };
        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await;
        match created {
            Ok(_) => {
                if n > 0 {
                    debug!("{} exists, using {}", name, candidate.display());
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(write_err(&candidate, e)),
        }
    }
}
