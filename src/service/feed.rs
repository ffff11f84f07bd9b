//! Quote feed collaborator
//!
//! The snapshot pipeline consumes market data through the `QuoteFeed`
//! trait; the bundled implementation wraps Yahoo Finance's unofficial
//! API. Every call carries a request timeout so a degraded upstream
//! degrades to a per-call feed error instead of a hung cycle.
//!
//! Note: Yahoo Finance data is delayed ~15 minutes and intended for
//! personal use.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::core::{OptionQuote, VolError, VolResult};

/// External market-data source for the snapshot pipeline.
pub trait QuoteFeed: Send + Sync {
    /// Available option expiration dates for a symbol.
    fn expirations(&self, symbol: &str) -> VolResult<Vec<NaiveDate>>;

    /// Call quotes for one expiration.
    fn option_chain(&self, symbol: &str, expiration: NaiveDate) -> VolResult<Vec<OptionQuote>>;

    /// Most recent close from a short trailing window.
    fn spot_price(&self, symbol: &str) -> VolResult<f64>;
}

/// Yahoo Finance quote feed.
pub struct YahooFeed {
    client: reqwest::blocking::Client,
    base_url: String,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl YahooFeed {
    pub fn new() -> VolResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VolError::feed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: "https://query1.finance.yahoo.com".to_string(),
        })
    }

    /// Override the endpoint, for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn options_payload(&self, symbol: &str, date: Option<i64>) -> VolResult<OptionChainData> {
        let url = match date {
            Some(ts) => format!("{}/v7/finance/options/{}?date={}", self.base_url, symbol, ts),
            None => format!("{}/v7/finance/options/{}", self.base_url, symbol),
        };

        let response: OptionsResponse = self
            .client
            .get(&url)
            .send()
            .map_err(|e| VolError::feed(e.to_string()))?
            .json()
            .map_err(|e| VolError::Serialization(format!("bad options payload: {e}")))?;

        response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| VolError::data(format!("no options data returned for {symbol}")))
    }
}

impl QuoteFeed for YahooFeed {
    fn expirations(&self, symbol: &str) -> VolResult<Vec<NaiveDate>> {
        let chain = self.options_payload(symbol, None)?;

        Ok(chain
            .expiration_dates
            .iter()
            .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
            .collect())
    }

    fn option_chain(&self, symbol: &str, expiration: NaiveDate) -> VolResult<Vec<OptionQuote>> {
        // Yahoo keys expirations by their 4pm-ET unix timestamp
        let ts = expiration
            .and_hms_opt(16, 0, 0)
            .ok_or_else(|| VolError::invalid_input(format!("bad expiration {expiration}")))?
            .and_utc()
            .timestamp();

        let chain = self.options_payload(symbol, Some(ts))?;

        let quotes = chain
            .options
            .first()
            .map(|o| {
                o.calls
                    .iter()
                    .filter_map(|c| {
                        let strike = c.strike?;
                        Some(OptionQuote::new(
                            strike,
                            expiration,
                            c.bid.unwrap_or(0.0),
                            c.ask.unwrap_or(0.0),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(quotes)
    }

    fn spot_price(&self, symbol: &str) -> VolResult<f64> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=5d&interval=1d",
            self.base_url, symbol
        );

        let response: ChartResponse = self
            .client
            .get(&url)
            .send()
            .map_err(|e| VolError::feed(e.to_string()))?
            .json()
            .map_err(|e| VolError::Serialization(format!("bad chart payload: {e}")))?;

        let result = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| VolError::data(format!("no chart data returned for {symbol}")))?;

        result
            .indicators
            .quote
            .first()
            .and_then(|q| q.close.iter().rev().find_map(|c| *c))
            .ok_or_else(|| VolError::data(format!("no closing prices for {symbol}")))
    }
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct OptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: OptionChainResult,
}

#[derive(Debug, Deserialize)]
struct OptionChainResult {
    result: Vec<OptionChainData>,
}

#[derive(Debug, Deserialize)]
struct OptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<OptionsBlock>,
}

#[derive(Debug, Deserialize)]
struct OptionsBlock {
    #[serde(default)]
    calls: Vec<RawCall>,
}

#[derive(Debug, Deserialize)]
struct RawCall {
    strike: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Vec<ChartData>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires network
    fn test_expirations() {
        let feed = YahooFeed::new().unwrap();
        let expirations = feed.expirations("SPY").unwrap();
        assert!(!expirations.is_empty());
    }

    #[test]
    #[ignore] // Requires network
    fn test_spot_price() {
        let feed = YahooFeed::new().unwrap();
        let spot = feed.spot_price("SPY").unwrap();
        assert!(spot > 0.0);
    }

    #[test]
    #[ignore] // Requires network
    fn test_option_chain() {
        let feed = YahooFeed::new().unwrap();
        let expirations = feed.expirations("SPY").unwrap();
        let chain = feed.option_chain("SPY", expirations[0]).unwrap();
        assert!(!chain.is_empty());
    }
}
