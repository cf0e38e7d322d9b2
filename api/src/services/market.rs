use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::{AssetCategory, MarketAsset};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn assets(&self) -> Result<Vec<MarketAsset>>;
}

struct Listing {
    id: u32,
    name: &'static str,
    ticker: &'static str,
    price: f64,
    change: f64,
    volume: &'static str,
    category: AssetCategory,
    logo: &'static str,
    coingecko_id: Option<&'static str>,
}

const LISTINGS: &[Listing] = &[
    Listing {
        id: 1,
        name: "Bitcoin",
        ticker: "BTC-T",
        price: 42305.67,
        change: 8.92,
        volume: "$3.2B",
        category: AssetCategory::Crypto,
        logo: "₿",
        coingecko_id: Some("bitcoin"),
    },
    Listing {
        id: 2,
        name: "Ethereum",
        ticker: "ETH-T",
        price: 2204.56,
        change: 6.78,
        volume: "$1.9B",
        category: AssetCategory::Crypto,
        logo: "Ξ",
        coingecko_id: Some("ethereum"),
    },
    Listing {
        id: 3,
        name: "Tether",
        ticker: "USDT-T",
        price: 1.0,
        change: 0.01,
        volume: "$45.1B",
        category: AssetCategory::Crypto,
        logo: "₮",
        coingecko_id: Some("tether"),
    },
    Listing {
        id: 4,
        name: "Tesla",
        ticker: "TSLA-T",
        price: 245.67,
        change: 5.23,
        volume: "$2.3B",
        category: AssetCategory::Stocks,
        logo: "🚗",
        coingecko_id: None,
    },
    Listing {
        id: 5,
        name: "Apple",
        ticker: "AAPL-T",
        price: 189.45,
        change: 3.45,
        volume: "$1.8B",
        category: AssetCategory::Stocks,
        logo: "🍎",
        coingecko_id: None,
    },
    Listing {
        id: 6,
        name: "Microsoft",
        ticker: "MSFT-T",
        price: 378.92,
        change: -1.23,
        volume: "$1.2B",
        category: AssetCategory::Stocks,
        logo: "💻",
        coingecko_id: None,
    },
    Listing {
        id: 7,
        name: "NVIDIA",
        ticker: "NVDA-T",
        price: 485.09,
        change: 8.45,
        volume: "$3.8B",
        category: AssetCategory::Stocks,
        logo: "🎮",
        coingecko_id: None,
    },
    Listing {
        id: 8,
        name: "Gold",
        ticker: "AU-T",
        price: 2045.23,
        change: 2.15,
        volume: "$890M",
        category: AssetCategory::Commodities,
        logo: "✨",
        coingecko_id: None,
    },
    Listing {
        id: 9,
        name: "Silver",
        ticker: "AG-T",
        price: 24.56,
        change: 1.87,
        volume: "$450M",
        category: AssetCategory::Commodities,
        logo: "🥈",
        coingecko_id: None,
    },
    Listing {
        id: 10,
        name: "Oil (WTI)",
        ticker: "WTI-T",
        price: 78.45,
        change: -2.34,
        volume: "$650M",
        category: AssetCategory::Commodities,
        logo: "🛢️",
        coingecko_id: None,
    },
];

impl Listing {
    fn to_asset(&self) -> MarketAsset {
        MarketAsset {
            id: self.id,
            name: self.name.to_string(),
            ticker: self.ticker.to_string(),
            price: self.price,
            change: self.change,
            volume: self.volume.to_string(),
            category: self.category,
            logo: self.logo.to_string(),
        }
    }
}

pub fn static_assets() -> Vec<MarketAsset> {
    LISTINGS.iter().map(Listing::to_asset).collect()
}

/// The built-in catalogue at its reference prices.
#[derive(Clone, Default)]
pub struct StaticMarketData;

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn assets(&self) -> Result<Vec<MarketAsset>> {
        Ok(static_assets())
    }
}

#[derive(Debug, Deserialize)]
struct CoinMarket {
    id: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
}

/// Live crypto quotes from CoinGecko `/coins/markets`, merged into the
/// catalogue. Listings without a CoinGecko id keep their reference price.
#[derive(Clone)]
pub struct CoingeckoMarketData {
    client: Client,
    api_base: String,
}

impl CoingeckoMarketData {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build coingecko http client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for CoingeckoMarketData {
    async fn assets(&self) -> Result<Vec<MarketAsset>> {
        let ids = LISTINGS
            .iter()
            .filter_map(|listing| listing.coingecko_id)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/coins/markets", self.api_base);
        let resp = self
            .client
            .get(url)
            .query(&[
                ("vs_currency", "usd"),
                ("ids", ids.as_str()),
                ("order", "market_cap_desc"),
                ("per_page", "10"),
                ("page", "1"),
                ("sparkline", "false"),
            ])
            .send()
            .await
            .context("coingecko markets request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("coingecko markets returned status {status}"));
        }
        let markets: Vec<CoinMarket> = resp
            .json()
            .await
            .context("failed to decode coingecko markets response")?;

        Ok(LISTINGS
            .iter()
            .map(|listing| {
                let mut asset = listing.to_asset();
                let quote = listing
                    .coingecko_id
                    .and_then(|id| markets.iter().find(|m| m.id == id));
                if let Some(quote) = quote {
                    let price = quote.current_price.filter(|p| p.is_finite() && *p > 0.0);
                    if let Some(price) = price {
                        asset.price = price;
                    }
                    let change = quote.price_change_percentage_24h.filter(|c| c.is_finite());
                    if let Some(change) = change {
                        asset.change = change;
                    }
                    let volume = quote.total_volume.filter(|v| v.is_finite() && *v >= 0.0);
                    if let Some(volume) = volume {
                        asset.volume = compact_usd(volume);
                    }
                }
                asset
            })
            .collect())
    }
}

#[derive(Clone)]
pub struct FallbackMarketData<P, F>
where
    P: MarketDataProvider,
    F: MarketDataProvider,
{
    primary: Arc<P>,
    fallback: Arc<F>,
}

impl<P, F> FallbackMarketData<P, F>
where
    P: MarketDataProvider,
    F: MarketDataProvider,
{
    pub fn new(primary: Arc<P>, fallback: Arc<F>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> MarketDataProvider for FallbackMarketData<P, F>
where
    P: MarketDataProvider,
    F: MarketDataProvider,
{
    async fn assets(&self) -> Result<Vec<MarketAsset>> {
        match self.primary.assets().await {
            Ok(assets) => Ok(assets),
            Err(primary_err) => {
                warn!(error = %primary_err, "market data unavailable, using fallback catalogue");
                metrics::counter!("market_fallbacks_total").increment(1);
                self.fallback
                    .assets()
                    .await
                    .with_context(|| format!("market data fallback failed after: {primary_err}"))
            }
        }
    }
}

/// `$3.2B`-style volume label.
fn compact_usd(amount: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    for (scale, suffix) in UNITS {
        if amount >= scale {
            return format!("${:.1}{}", amount / scale, suffix);
        }
    }
    format!("${amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Down;

    #[async_trait]
    impl MarketDataProvider for Down {
        async fn assets(&self) -> Result<Vec<MarketAsset>> {
            Err(anyhow::anyhow!("coingecko returned status 429"))
        }
    }

    #[test]
    fn compact_usd_picks_the_largest_unit() {
        assert_eq!(compact_usd(3_200_000_000.0), "$3.2B");
        assert_eq!(compact_usd(890_000_000.0), "$890.0M");
        assert_eq!(compact_usd(12_500.0), "$12.5K");
        assert_eq!(compact_usd(999.5), "$999.50");
        assert_eq!(compact_usd(2.0e12), "$2.0T");
    }

    #[test]
    fn static_catalogue_covers_every_category() {
        let assets = static_assets();
        for category in [
            AssetCategory::Crypto,
            AssetCategory::Stocks,
            AssetCategory::Commodities,
        ] {
            assert!(assets.iter().any(|a| a.category == category));
        }
        let mut ids: Vec<_> = assets.iter().map(|a| a.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), assets.len());
    }

    #[tokio::test]
    async fn fallback_serves_catalogue_when_primary_fails() {
        let market = FallbackMarketData::new(Arc::new(Down), Arc::new(StaticMarketData));
        let assets = market.assets().await.unwrap();
        assert_eq!(assets, static_assets());
    }
}
