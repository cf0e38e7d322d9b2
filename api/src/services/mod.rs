pub mod holdings;
pub mod market;

pub use holdings::{demo_holdings, demo_provider, HttpHoldingsProvider};
pub use market::{
    static_assets, CoingeckoMarketData, FallbackMarketData, MarketDataProvider, StaticMarketData,
};
