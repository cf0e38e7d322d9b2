use chrono::NaiveDate;
use domain::PortfolioSnapshot;
use thiserror::Error;

pub mod format;
pub mod sink;

pub use format::{parse_report, render_csv, ReportRow, REPORT_HEADER};
pub use sink::{DirectoryExportSink, ExportSink};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Error)]
pub enum ExportFailure {
    #[error("failed to render report: {0}")]
    Render(String),
    #[error("malformed report: {0}")]
    Parse(String),
    #[error("failed to deliver {filename}: {source}")]
    Delivery {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// A rendered report plus the name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub fn report_filename(date: NaiveDate) -> String {
    format!("portfolio-{}.csv", date.format("%Y-%m-%d"))
}

pub fn build_artifact(
    snapshot: &PortfolioSnapshot,
    date: NaiveDate,
) -> Result<ReportArtifact, ExportFailure> {
    Ok(ReportArtifact {
        filename: report_filename(date),
        content_type: CSV_CONTENT_TYPE,
        body: render_csv(snapshot)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(report_filename(date), "portfolio-2024-03-07.csv");
    }

    #[test]
    fn artifact_carries_csv_body() {
        let snapshot = valuation::build_snapshot("0xabc", Vec::new(), 0, chrono::Utc::now());
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let artifact = build_artifact(&snapshot, date).unwrap();
        assert_eq!(artifact.filename, "portfolio-2025-12-31.csv");
        assert_eq!(artifact.content_type, "text/csv");
        assert!(artifact.body.starts_with("Asset,Ticker,Shares"));
    }
}
