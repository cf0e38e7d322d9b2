use std::sync::Arc;

use anyhow::Result;
use portfolio::{HoldingsProvider, PortfolioService};
use tracing::info;

use crate::{
    config::AppConfig,
    services::{
        demo_holdings, demo_provider, CoingeckoMarketData, FallbackMarketData, HttpHoldingsProvider,
        MarketDataProvider, StaticMarketData,
    },
    state::AppState,
};

pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let provider: Arc<dyn HoldingsProvider> = match &config.holdings_api_base {
        Some(base) => {
            info!(api_base = %base, "using external holdings provider");
            Arc::new(HttpHoldingsProvider::new(base, config.holdings_timeout)?)
        }
        None => {
            info!("HOLDINGS_API_BASE unset, serving the demo book");
            Arc::new(demo_provider()?)
        }
    };

    let mut portfolio = PortfolioService::new(provider)
        .with_fetch_timeout(config.holdings_timeout);
    // 上游掛掉時改用 demo book，錯誤仍會跟著 snapshot 回傳
    if config.portfolio_fallback {
        portfolio = portfolio.with_fallback(demo_holdings());
    }

    let coingecko = CoingeckoMarketData::new(&config.coingecko_api_base, config.market_timeout)?;
    let market: Arc<dyn MarketDataProvider> = Arc::new(FallbackMarketData::new(
        Arc::new(coingecko),
        Arc::new(StaticMarketData),
    ));

    Ok(AppState::new(config.clone(), portfolio, market))
}
