use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// The holdings source could not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUnavailable {
    #[error("holdings request failed: {0}")]
    Transport(String),
    #[error("holdings provider returned status {0}")]
    Status(u16),
    #[error("holdings response was malformed: {0}")]
    Malformed(String),
    #[error("holdings request timed out after {0:?}")]
    Timeout(Duration),
}

impl DataUnavailable {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Malformed(_) => "malformed",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Where raw holdings come from. Entries are returned unvalidated; the
/// service normalizes them.
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    async fn fetch_holdings(&self, owner: &str) -> Result<Vec<Value>, DataUnavailable>;
}

/// Serves the same entries for every owner.
#[derive(Clone, Debug, Default)]
pub struct StaticHoldingsProvider {
    entries: Vec<Value>,
}

impl StaticHoldingsProvider {
    pub fn new(entries: Vec<Value>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl HoldingsProvider for StaticHoldingsProvider {
    async fn fetch_holdings(&self, _owner: &str) -> Result<Vec<Value>, DataUnavailable> {
        Ok(self.entries.clone())
    }
}
