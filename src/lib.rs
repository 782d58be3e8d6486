// Core modules
pub mod api;
pub mod clock;
pub mod config;
pub mod driver;
pub mod models;
pub mod tracker;

// Re-export commonly used types
pub use models::{Observation, Quote};
pub use tracker::StockTracker;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
