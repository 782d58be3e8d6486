use crate::api::QuoteSource;
use crate::models::Quote;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use std::time::Duration;

const SINA_QUOTE_BASE: &str = "https://hq.sinajs.cn/list=";
const FETCH_TIMEOUT_SECS: u64 = 5;

// Positional fields in the comma-separated quote line
const FIELD_CURR: usize = 3;
const FIELD_HIGH: usize = 4;
const FIELD_LOW: usize = 5;
const MIN_FIELDS: usize = 6;

/// Client for the Sina realtime quote endpoint
///
/// One GET per security per poll cycle, no retry: the next cycle is the
/// retry.
#[derive(Clone)]
pub struct SinaClient {
    client: Client,
    base_url: String,
}

impl SinaClient {
    pub fn new() -> Self {
        Self::with_base_url(SINA_QUOTE_BASE)
    }

    /// Point the client at a different endpoint (used by tests to hit a
    /// local mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch_text(&self, code: &str) -> crate::Result<String> {
        let url = format!("{}{}", self.base_url, code);

        let response = self
            .client
            .get(&url)
            // Sina rejects referer-less requests
            .header(reqwest::header::REFERER, "https://finance.sina.com.cn")
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;

        // The body is GB18030-encoded; the price fields we care about are
        // plain ASCII digits, so a lossy decode is safe.
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for SinaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one comma-separated quote line.
///
/// Fewer than six fields or an empty current-price field means the
/// source had nothing for this code (`Quote::NoData`); a non-numeric
/// price field is a parse error and bubbles up to become `Quote::Error`.
fn parse_quote_line(text: &str, time: DateTime<Local>) -> crate::Result<Quote> {
    let fields: Vec<&str> = text.split(',').collect();

    if fields.len() < MIN_FIELDS || fields[FIELD_CURR].trim().is_empty() {
        return Ok(Quote::NoData);
    }

    let curr: f64 = fields[FIELD_CURR].trim().parse()?;
    let high: f64 = fields[FIELD_HIGH].trim().parse()?;
    let low: f64 = fields[FIELD_LOW].trim().parse()?;

    Ok(Quote::Price {
        time,
        curr,
        high,
        low,
    })
}

#[async_trait]
impl QuoteSource for SinaClient {
    async fn fetch(&self, code: &str) -> Quote {
        let now = Local::now();

        let text = match self.fetch_text(code).await {
            Ok(text) => text,
            Err(e) => {
                return Quote::Error {
                    time: now,
                    message: e.to_string(),
                }
            }
        };

        match parse_quote_line(&text, now) {
            Ok(quote) => quote,
            Err(e) => Quote::Error {
                time: now,
                message: e.to_string(),
            },
        }
    }
}
