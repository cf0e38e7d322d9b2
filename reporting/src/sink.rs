use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{ExportFailure, ReportArtifact};

#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Delivers the artifact and returns where it ended up.
    async fn deliver(&self, artifact: &ReportArtifact) -> Result<String, ExportFailure>;
}

/// Writes reports into a local directory. The file appears under its final
/// name only once it is complete.
#[derive(Clone, Debug)]
pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn partial_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!(".{filename}.partial"))
    }
}

#[async_trait]
impl ExportSink for DirectoryExportSink {
    async fn deliver(&self, artifact: &ReportArtifact) -> Result<String, ExportFailure> {
        let failure = |source: std::io::Error| ExportFailure::Delivery {
            filename: artifact.filename.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(failure)?;

        let target = self.dir.join(&artifact.filename);
        let partial = self.partial_path(&artifact.filename);
        let written = match tokio::fs::write(&partial, artifact.body.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&partial, &target).await,
            Err(err) => Err(err),
        };

        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(
                        error = %cleanup,
                        path = %partial.display(),
                        "failed to remove partial report"
                    );
                }
            }
            return Err(failure(err));
        }

        info!(
            path = %target.display(),
            bytes = artifact.body.len(),
            "portfolio report written"
        );
        Ok(target.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CSV_CONTENT_TYPE;

    fn artifact(name: &str) -> ReportArtifact {
        ReportArtifact {
            filename: name.to_string(),
            content_type: CSV_CONTENT_TYPE,
            body: "Asset,Ticker\nBitcoin,BTC-T\n".to_string(),
        }
    }

    #[tokio::test]
    async fn writes_report_under_final_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectoryExportSink::new(dir.path().join("reports"));

        let location = sink
            .deliver(&artifact("portfolio-2024-01-01.csv"))
            .await
            .unwrap();

        let target = dir.path().join("reports/portfolio-2024-01-01.csv");
        assert_eq!(location, target.display().to_string());
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "Asset,Ticker\nBitcoin,BTC-T\n"
        );
        assert!(!sink.partial_path("portfolio-2024-01-01.csv").exists());
    }

    #[tokio::test]
    async fn failed_delivery_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // a directory squatting on the target name makes the final rename fail
        std::fs::create_dir(dir.path().join("portfolio-2024-01-01.csv")).unwrap();
        std::fs::write(dir.path().join("portfolio-2024-01-01.csv/keep"), "x").unwrap();
        let sink = DirectoryExportSink::new(dir.path());

        let err = sink
            .deliver(&artifact("portfolio-2024-01-01.csv"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExportFailure::Delivery { ref filename, .. } if filename == "portfolio-2024-01-01.csv"
        ));
        assert!(!sink.partial_path("portfolio-2024-01-01.csv").exists());
    }

    #[tokio::test]
    async fn unusable_directory_is_an_export_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let sink = DirectoryExportSink::new(&blocker);

        let err = sink.deliver(&artifact("report.csv")).await.unwrap_err();
        assert!(matches!(err, ExportFailure::Delivery { .. }));
    }
}
