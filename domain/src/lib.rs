use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One normalized position: what is held and at which prices.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRecord {
    pub id: String,
    pub name: String,
    pub ticker: String,
    pub shares: f64,
    pub cost_basis: f64,
    pub current_price: f64,
    pub blockchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub value: f64,
    pub cost: f64,
    pub gain: f64,
    pub gain_percent: f64,
    /// Share of the snapshot's total value, in percent.
    pub allocation_percent: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ValuedHolding {
    #[serde(flatten)]
    pub record: HoldingRecord,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain: f64,
    pub total_gain_percent: f64,
}

/// Point-in-time valuation of one owner's holdings.
///
/// Fields are private: a snapshot is only ever read after it is built, and
/// refreshing means building a new one.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    id: Uuid,
    owner: String,
    holdings: Vec<ValuedHolding>,
    totals: PortfolioTotals,
    skipped_records: usize,
    generated_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    pub fn new(
        owner: impl Into<String>,
        holdings: Vec<ValuedHolding>,
        totals: PortfolioTotals,
        skipped_records: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            holdings,
            totals,
            skipped_records,
            generated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn holdings(&self) -> &[ValuedHolding] {
        &self.holdings
    }

    pub fn totals(&self) -> PortfolioTotals {
        self.totals
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// Wire envelope of the holdings provider: `{ "holdings": [...] }`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PortfolioResponse {
    pub holdings: Vec<HoldingRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Crypto,
    Stocks,
    Commodities,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketAsset {
    pub id: u32,
    pub name: String,
    pub ticker: String,
    pub price: f64,
    /// 24h change in percent.
    pub change: f64,
    pub volume: String,
    pub category: AssetCategory,
    pub logo: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarketResponse {
    pub assets: Vec<MarketAsset>,
}
