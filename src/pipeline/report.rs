//! Stage 3: render the analysis into a PDF on the backend.
//!
//! The filename is chosen on the client from the injected clock at the
//! moment the report arrives, not taken from the server's
//! `Content-Disposition`. The server's suggestion is kept on
//! [`ReportFile::server_filename`] for reference.

use crate::backend::LabBackend;
use crate::clock::Clock;
use crate::error::StageError;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::time::Instant;
use tracing::info;

/// Filename prefix for every downloaded report.
pub const REPORT_PREFIX: &str = "clinical_lab_report";

/// A generated report, ready to hand to a [`crate::download::DownloadSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    /// `clinical_lab_report_<YYYYMMDD>_<HHMM>.pdf`
    pub filename: String,
    pub bytes: Vec<u8>,
    pub server_filename: Option<String>,
    pub content_type: Option<String>,
    pub duration_ms: u64,
}

/// `clinical_lab_report_<YYYYMMDD>_<HHMM>.pdf` for the given instant.
pub fn report_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{REPORT_PREFIX}_{}.pdf", at.format("%Y%m%d_%H%M"))
}

/// Request a PDF for `analysis_text` and name it from `clock`.
pub async fn run(
    backend: &dyn LabBackend,
    analysis_text: &str,
    clock: &dyn Clock,
) -> Result<ReportFile, StageError> {
    let start = Instant::now();
    let payload = backend.generate_report(analysis_text).await?;
    let duration_ms = start.elapsed().as_millis() as u64;

    let filename = report_filename(&clock.now());
    info!(
        "Report received: {} bytes in {}ms → {}",
        payload.bytes.len(),
        duration_ms,
        filename
    );

    Ok(ReportFile {
        filename,
        bytes: payload.bytes,
        server_filename: payload.server_filename,
        content_type: payload.content_type,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, Utc};

    #[test]
    fn filename_is_zero_padded() {
        let at = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(9, 7, 59)
                .unwrap(),
        );
        assert_eq!(report_filename(&at), "clinical_lab_report_20240305_0907.pdf");
    }

    #[test]
    fn filename_uses_local_wall_time_of_the_offset() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = tz
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 0)
            .single()
            .unwrap();
        assert_eq!(report_filename(&at), "clinical_lab_report_20231231_2359.pdf");
    }
}
