pub mod board;
pub mod clock;
pub mod provider;
pub mod service;

pub use board::{SnapshotBoard, SnapshotState, ViewStatus};
pub use clock::{Clock, FixedClock, SystemClock};
pub use provider::{DataUnavailable, HoldingsProvider, StaticHoldingsProvider};
pub use service::{PortfolioService, SnapshotOutcome, DEFAULT_FETCH_TIMEOUT};
