//! Stage 1: upload the selected image and receive the extracted text.

use crate::backend::LabBackend;
use crate::error::StageError;
use crate::pipeline::input::SelectedFile;
use std::time::Instant;
use tracing::{debug, info};

/// Text the backend extracted from an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Extracted text. May be empty when the image had no readable text.
    pub text: String,
    pub duration_ms: u64,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Upload `file` and return what the backend extracted from it.
pub async fn run(backend: &dyn LabBackend, file: &SelectedFile) -> Result<Extraction, StageError> {
    let start = Instant::now();
    info!("Uploading '{}' to {}", file.name(), backend.describe());

    let text = backend.extract_text(file).await?;
    let duration_ms = start.elapsed().as_millis() as u64;

    if text.is_empty() {
        info!("No text extracted from '{}' ({}ms)", file.name(), duration_ms);
    } else {
        debug!("Extracted {} chars in {}ms", text.len(), duration_ms);
    }

    Ok(Extraction { text, duration_ms })
}
