use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::HoldingRecord;
use portfolio::{DataUnavailable, HoldingsProvider, StaticHoldingsProvider};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

/// Talks to an external holdings service exposing
/// `GET {base}/portfolio/{owner}` → `{ "holdings": [...] }`.
#[derive(Clone)]
pub struct HttpHoldingsProvider {
    client: Client,
    api_base: Url,
    timeout: Duration,
}

impl HttpHoldingsProvider {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(api_base.trim_end_matches('/'))
            .with_context(|| format!("invalid holdings api base {api_base}"))?;
        if api_base.cannot_be_a_base() {
            anyhow::bail!("holdings api base {api_base} cannot carry a path");
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build holdings http client")?;
        Ok(Self {
            client,
            api_base,
            timeout,
        })
    }

    fn portfolio_url(&self, owner: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("portfolio").push(owner);
        }
        url
    }
}

#[async_trait]
impl HoldingsProvider for HttpHoldingsProvider {
    async fn fetch_holdings(&self, owner: &str) -> Result<Vec<Value>, DataUnavailable> {
        let url = self.portfolio_url(owner);
        debug!(%url, "fetching holdings");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    DataUnavailable::Timeout(self.timeout)
                } else {
                    DataUnavailable::Transport(err.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataUnavailable::Status(status.as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|err| DataUnavailable::Malformed(err.to_string()))?;
        body.get("holdings")
            .and_then(|holdings| holdings.as_array())
            .cloned()
            .ok_or_else(|| DataUnavailable::Malformed("missing `holdings` array".to_string()))
    }
}

/// The demo book every BlockTrade dashboard ships with.
pub fn demo_holdings() -> Vec<HoldingRecord> {
    let holding = |id: &str,
                   name: &str,
                   ticker: &str,
                   shares: f64,
                   cost_basis: f64,
                   current_price: f64,
                   logo: &str,
                   blockchain: &str| HoldingRecord {
        id: id.to_string(),
        name: name.to_string(),
        ticker: ticker.to_string(),
        shares,
        cost_basis,
        current_price,
        blockchain: blockchain.to_string(),
        logo: Some(logo.to_string()),
    };

    vec![
        holding("1", "Tesla Stock Token", "TSLA-T", 25.0, 230.45, 245.67, "🚗", "Ethereum"),
        holding("2", "Apple Stock Token", "AAPL-T", 50.0, 182.30, 189.45, "🍎", "Ethereum"),
        holding("3", "Gold Commodity", "AU-T", 10.0, 2010.50, 2045.23, "✨", "Polygon"),
        holding("4", "Bitcoin", "BTC-T", 0.5, 38900.00, 42305.67, "₿", "Bitcoin L2"),
    ]
}

/// Serves the demo book as raw entries, for running without an external
/// holdings service.
pub fn demo_provider() -> Result<StaticHoldingsProvider> {
    let entries = demo_holdings()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .context("failed to encode demo holdings")?;
    Ok(StaticHoldingsProvider::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portfolio_url_escapes_owner() {
        let provider =
            HttpHoldingsProvider::new("http://holdings.test/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            provider.portfolio_url("0xAbC").as_str(),
            "http://holdings.test/api/portfolio/0xAbC"
        );
        assert_eq!(
            provider.portfolio_url("a/b c").as_str(),
            "http://holdings.test/api/portfolio/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(HttpHoldingsProvider::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpHoldingsProvider::new("mailto:someone", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn demo_provider_round_trips_through_normalizer() {
        let entries = demo_provider().unwrap().fetch_holdings("anyone").await.unwrap();
        let normalized = valuation::normalize(&entries);
        assert!(normalized.rejected.is_empty());
        assert_eq!(normalized.records, demo_holdings());
    }
}
