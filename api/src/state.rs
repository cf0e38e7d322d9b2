use std::sync::Arc;

use portfolio::{PortfolioService, SnapshotBoard};

use crate::{config::AppConfig, services::MarketDataProvider};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub portfolio: Arc<PortfolioService>,
    pub board: Arc<SnapshotBoard>,
    pub market: Arc<dyn MarketDataProvider>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        portfolio: PortfolioService,
        market: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            config,
            portfolio: Arc::new(portfolio),
            board: Arc::new(SnapshotBoard::new()),
            market,
        }
    }
}

// Axum state must be shareable across worker threads.
#[allow(dead_code)]
fn _assert_state_types_are_send_sync()
where
    AppConfig: Send + Sync + 'static,
    PortfolioService: Send + Sync,
    SnapshotBoard: Send + Sync,
    dyn MarketDataProvider: Send + Sync,
{
}

#[allow(dead_code)]
fn _assert_state_bounds() {
    fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
    assert_bounds::<AppState>();
}
