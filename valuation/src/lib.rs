pub mod calculate;
pub mod normalize;

pub use calculate::{build_snapshot, value_holding};
pub use normalize::{normalize, Normalized, ValidationError};
