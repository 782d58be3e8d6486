// Quote source clients
pub mod sina;

pub use sina::SinaClient;

use crate::models::Quote;
use async_trait::async_trait;

/// Anything that can produce a quote for a security code.
///
/// Fetching never fails at the type level: network errors, timeouts and
/// malformed responses all resolve to `Quote::Error`, an answered
/// request without a usable price resolves to `Quote::NoData`.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, code: &str) -> Quote;
}
