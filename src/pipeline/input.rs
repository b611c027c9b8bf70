//! Input resolution: turn a user-chosen path into a [`SelectedFile`].
//!
//! The widget treats the selected image as an opaque blob with a name. No
//! type or size checks happen here; the backend rejects what it cannot
//! read. The MIME type is guessed from the extension only so the multipart
//! part carries a sensible `Content-Type`.

use crate::error::AdvisorError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fallback content type when the extension is unknown.
const OCTET_STREAM: &str = "application/octet-stream";

/// A user-selected file held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    /// Wrap in-memory bytes. The MIME type is guessed from `name`.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let mime_type = guess_mime(&name);
        Self {
            name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Override the guessed MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AdvisorError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| map_read_error(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let file = Self::from_bytes(name, bytes);
        debug!(
            "Selected '{}' ({}, {})",
            file.name,
            file.mime_type,
            human(file.bytes.len())
        );
        Ok(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image bytes are not useful in logs.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

fn map_read_error(path: &Path, e: std::io::Error) -> AdvisorError {
    let path = PathBuf::from(path);
    match e.kind() {
        std::io::ErrorKind::NotFound => AdvisorError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => AdvisorError::PermissionDenied { path },
        _ => AdvisorError::FileReadFailed { path, source: e },
    }
}

/// Format a byte count for log lines: `512 B`, `3.4 KiB`, `1.2 MiB`.
pub(crate) fn human(n: usize) -> String {
    const KIB: f64 = 1024.0;
    let f = n as f64;
    if f < KIB {
        format!("{n} B")
    } else if f < KIB * KIB {
        format!("{:.1} KiB", f / KIB)
    } else {
        format!("{:.1} MiB", f / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_guessed_from_extension() {
        assert_eq!(SelectedFile::from_bytes("a.png", vec![1]).mime_type(), "image/png");
        assert_eq!(SelectedFile::from_bytes("a.JPG", vec![1]).mime_type(), "image/jpeg");
        assert_eq!(
            SelectedFile::from_bytes("report", vec![1]).mime_type(),
            OCTET_STREAM
        );
    }

    #[test]
    fn mime_override() {
        let f = SelectedFile::from_bytes("scan", vec![0u8; 3]).with_mime_type("image/gif");
        assert_eq!(f.mime_type(), "image/gif");
        assert_eq!(f.len(), 3);
        assert!(!f.is_empty());
    }

    #[test]
    fn debug_omits_bytes() {
        let f = SelectedFile::from_bytes("x.png", vec![0xAB; 4096]);
        let dbg = format!("{f:?}");
        assert!(dbg.contains("len: 4096"));
        assert!(!dbg.contains("171"));
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human(512), "512 B");
        assert_eq!(human(2048), "2.0 KiB");
        assert_eq!(human(3 * 1024 * 1024), "3.0 MiB");
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cbc.png");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"\x89PNG fake").unwrap();

        let sel = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(sel.name(), "cbc.png");
        assert_eq!(sel.mime_type(), "image/png");
        assert_eq!(sel.bytes(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = SelectedFile::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::FileNotFound { .. }), "got {err:?}");
    }
}
