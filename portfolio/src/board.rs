use std::{collections::HashMap, sync::Arc};

use domain::PortfolioSnapshot;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    provider::DataUnavailable,
    service::{PortfolioService, SnapshotOutcome},
};

/// What a caller currently knows about one owner's portfolio.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SnapshotState {
    #[default]
    NotLoaded,
    Ready(Arc<PortfolioSnapshot>),
    Fallback {
        snapshot: Arc<PortfolioSnapshot>,
        error: DataUnavailable,
    },
    Failed(DataUnavailable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    NotLoaded,
    Empty,
    Ready,
    Fallback,
    Failed,
}

impl SnapshotState {
    pub fn status(&self) -> ViewStatus {
        match self {
            Self::NotLoaded => ViewStatus::NotLoaded,
            Self::Ready(snapshot) if snapshot.is_empty() => ViewStatus::Empty,
            Self::Ready(_) => ViewStatus::Ready,
            Self::Fallback { .. } => ViewStatus::Fallback,
            Self::Failed(_) => ViewStatus::Failed,
        }
    }

    pub fn snapshot(&self) -> Option<&Arc<PortfolioSnapshot>> {
        match self {
            Self::Ready(snapshot) | Self::Fallback { snapshot, .. } => Some(snapshot),
            Self::NotLoaded | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DataUnavailable> {
        match self {
            Self::Fallback { error, .. } | Self::Failed(error) => Some(error),
            Self::NotLoaded | Self::Ready(_) => None,
        }
    }
}

impl From<Result<SnapshotOutcome, DataUnavailable>> for SnapshotState {
    fn from(result: Result<SnapshotOutcome, DataUnavailable>) -> Self {
        match result {
            Ok(SnapshotOutcome::Fresh(snapshot)) => Self::Ready(snapshot),
            Ok(SnapshotOutcome::Fallback { snapshot, error }) => Self::Fallback { snapshot, error },
            Err(error) => Self::Failed(error),
        }
    }
}

/// Latest state per owner. A refresh swaps the whole entry; concurrent
/// refreshes for the same owner are not coalesced and the last one to finish
/// wins.
#[derive(Debug, Default)]
pub struct SnapshotBoard {
    states: RwLock<HashMap<String, SnapshotState>>,
}

impl SnapshotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self, owner: &str) -> SnapshotState {
        self.states
            .read()
            .await
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn replace(&self, owner: &str, state: SnapshotState) {
        self.states.write().await.insert(owner.to_string(), state);
    }

    pub async fn refresh(&self, service: &PortfolioService, owner: &str) -> SnapshotState {
        // fetch outside the lock; only the swap is guarded
        let state = SnapshotState::from(service.get_snapshot(owner).await);
        self.replace(owner, state.clone()).await;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{HoldingsProvider, StaticHoldingsProvider};
    use async_trait::async_trait;
    use domain::HoldingRecord;
    use serde_json::{json, Value};

    struct Unreachable;

    #[async_trait]
    impl HoldingsProvider for Unreachable {
        async fn fetch_holdings(&self, _owner: &str) -> Result<Vec<Value>, DataUnavailable> {
            Err(DataUnavailable::Transport("connection refused".to_string()))
        }
    }

    fn bitcoin() -> Value {
        json!({"id": "4", "name": "Bitcoin", "ticker": "BTC-T", "shares": 0.5,
               "costBasis": 38900.0, "currentPrice": 42305.67, "blockchain": "Bitcoin L2"})
    }

    #[tokio::test]
    async fn unknown_owner_is_not_loaded() {
        let board = SnapshotBoard::new();
        let state = board.state("0xabc").await;
        assert_eq!(state, SnapshotState::NotLoaded);
        assert_eq!(state.status(), ViewStatus::NotLoaded);
        assert!(state.snapshot().is_none());
    }

    #[tokio::test]
    async fn empty_ready_and_failed_are_distinct() {
        let board = SnapshotBoard::new();

        let empty = PortfolioService::new(Arc::new(StaticHoldingsProvider::default()));
        assert_eq!(board.refresh(&empty, "empty").await.status(), ViewStatus::Empty);

        let full = PortfolioService::new(Arc::new(StaticHoldingsProvider::new(vec![bitcoin()])));
        assert_eq!(board.refresh(&full, "full").await.status(), ViewStatus::Ready);

        let broken = PortfolioService::new(Arc::new(Unreachable));
        let failed = board.refresh(&broken, "broken").await;
        assert_eq!(failed.status(), ViewStatus::Failed);
        assert!(failed.snapshot().is_none());
        assert!(matches!(failed.error(), Some(DataUnavailable::Transport(_))));

        assert_eq!(board.state("empty").await.status(), ViewStatus::Empty);
        assert_eq!(board.state("full").await.status(), ViewStatus::Ready);
        assert_eq!(board.state("broken").await.status(), ViewStatus::Failed);
    }

    #[tokio::test]
    async fn refresh_replaces_previous_snapshot() {
        let board = SnapshotBoard::new();
        let service = PortfolioService::new(Arc::new(StaticHoldingsProvider::new(vec![bitcoin()])));

        let first = board.refresh(&service, "0xabc").await;
        let second = board.refresh(&service, "0xabc").await;
        let first_id = first.snapshot().map(|s| s.id());
        let current_id = board.state("0xabc").await.snapshot().map(|s| s.id());
        assert_ne!(first_id, current_id);
        assert_eq!(current_id, second.snapshot().map(|s| s.id()));
    }

    #[tokio::test]
    async fn fallback_state_keeps_snapshot_and_error() {
        let board = SnapshotBoard::new();
        let fallback = HoldingRecord {
            id: "1".to_string(),
            name: "Apple Stock Token".to_string(),
            ticker: "AAPL-T".to_string(),
            shares: 50.0,
            cost_basis: 182.3,
            current_price: 189.45,
            blockchain: "Ethereum".to_string(),
            logo: None,
        };
        let service =
            PortfolioService::new(Arc::new(Unreachable)).with_fallback(vec![fallback]);

        let state = board.refresh(&service, "0xabc").await;
        assert_eq!(state.status(), ViewStatus::Fallback);
        assert_eq!(state.snapshot().map(|s| s.holdings().len()), Some(1));
        assert!(state.error().is_some());
    }
}
