use std::{sync::Arc, time::Duration};

use domain::{HoldingRecord, PortfolioSnapshot};
use reporting::{ExportFailure, ReportArtifact};
use tracing::{info, warn};

use crate::{
    clock::{Clock, SystemClock},
    provider::{DataUnavailable, HoldingsProvider},
};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Fresh(Arc<PortfolioSnapshot>),
    /// The provider failed and the configured fallback holdings were valued
    /// instead. The failure travels with the snapshot.
    Fallback {
        snapshot: Arc<PortfolioSnapshot>,
        error: DataUnavailable,
    },
}

impl SnapshotOutcome {
    pub fn snapshot(&self) -> &Arc<PortfolioSnapshot> {
        match self {
            Self::Fresh(snapshot) | Self::Fallback { snapshot, .. } => snapshot,
        }
    }

    pub fn error(&self) -> Option<&DataUnavailable> {
        match self {
            Self::Fresh(_) => None,
            Self::Fallback { error, .. } => Some(error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Fetch, normalize, value and export portfolios for any owner.
pub struct PortfolioService {
    provider: Arc<dyn HoldingsProvider>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
    fallback: Option<Vec<HoldingRecord>>,
}

impl PortfolioService {
    pub fn new(provider: Arc<dyn HoldingsProvider>) -> Self {
        Self {
            provider,
            clock: Arc::new(SystemClock),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fallback: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn with_fallback(mut self, holdings: Vec<HoldingRecord>) -> Self {
        self.fallback = Some(holdings);
        self
    }

    /// Builds a snapshot from the provider, without any fallback.
    pub async fn fetch_snapshot(
        &self,
        owner: &str,
    ) -> Result<Arc<PortfolioSnapshot>, DataUnavailable> {
        let fetch = self.provider.fetch_holdings(owner);
        let entries = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| DataUnavailable::Timeout(self.fetch_timeout))??;

        let normalized = valuation::normalize(&entries);
        let skipped = normalized.skipped();
        if skipped > 0 {
            metrics::counter!("portfolio_records_skipped_total").increment(skipped as u64);
        }

        let snapshot =
            valuation::build_snapshot(owner, normalized.records, skipped, self.clock.now());
        info!(
            owner,
            holdings = snapshot.holdings().len(),
            skipped,
            total_value = snapshot.totals().total_value,
            "portfolio snapshot built"
        );
        Ok(Arc::new(snapshot))
    }

    pub async fn get_snapshot(&self, owner: &str) -> Result<SnapshotOutcome, DataUnavailable> {
        match self.fetch_snapshot(owner).await {
            Ok(snapshot) => Ok(SnapshotOutcome::Fresh(snapshot)),
            Err(error) => {
                metrics::counter!("portfolio_fetch_failures_total", "kind" => error.kind())
                    .increment(1);
                let Some(fallback) = &self.fallback else {
                    warn!(owner, error = %error, "holdings unavailable, no fallback configured");
                    return Err(error);
                };
                warn!(owner, error = %error, "holdings unavailable, serving fallback snapshot");
                let snapshot =
                    valuation::build_snapshot(owner, fallback.clone(), 0, self.clock.now());
                Ok(SnapshotOutcome::Fallback {
                    snapshot: Arc::new(snapshot),
                    error,
                })
            }
        }
    }

    /// Renders the snapshot as CSV named after today's date.
    pub fn export(&self, snapshot: &PortfolioSnapshot) -> Result<ReportArtifact, ExportFailure> {
        let artifact = reporting::build_artifact(snapshot, self.clock.today())?;
        metrics::counter!("portfolio_exports_total").increment(1);
        Ok(artifact)
    }
}
