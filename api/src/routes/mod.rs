pub mod error;
pub mod health;
pub mod market;
pub mod portfolio;

pub use error::ApiError;
