//! Public market data endpoints.
//!
//! These need no credentials and return the server's JSON unchanged.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoinbaseError;
use crate::rest::client::{NO_PARAMS, RestClient};
use crate::rest::endpoints::public;
use crate::rest::paginate::Paginator;

/// Candle width accepted by the historic rates endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum Granularity {
    /// 1 minute
    Min1,
    /// 5 minutes
    Min5,
    /// 15 minutes
    Min15,
    /// 1 hour
    Hour1,
    /// 6 hours
    Hour6,
    /// 1 day
    Day1,
}

impl From<Granularity> for u32 {
    fn from(granularity: Granularity) -> u32 {
        match granularity {
            Granularity::Min1 => 60,
            Granularity::Min5 => 300,
            Granularity::Min15 => 900,
            Granularity::Hour1 => 3600,
            Granularity::Hour6 => 21600,
            Granularity::Day1 => 86400,
        }
    }
}

/// Query for [`RestClient::get_product_historic_rates`].
///
/// Unset fields are left to the server's defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoricRatesRequest {
    /// Start of the range, ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// End of the range, ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Bucket width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
}

impl HistoricRatesRequest {
    /// An empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start of the range.
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set the end of the range.
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Set the bucket width.
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }
}

impl RestClient {
    /// Get the server time, in ISO and epoch form.
    pub async fn get_time(&self) -> Result<Value, CoinbaseError> {
        self.get(public::TIME, NO_PARAMS).await
    }

    /// List available currency pairs.
    pub async fn get_products(&self) -> Result<Value, CoinbaseError> {
        self.get(public::PRODUCTS, NO_PARAMS).await
    }

    /// List known currencies.
    pub async fn get_currencies(&self) -> Result<Value, CoinbaseError> {
        self.get(public::CURRENCIES, NO_PARAMS).await
    }

    /// Get the order book for a product.
    ///
    /// Levels 1 and 2 are aggregated; level 3 is the full book and is meant
    /// for clients that then follow the feed.
    pub async fn get_product_order_book(
        &self,
        product_id: &str,
        level: u8,
    ) -> Result<Value, CoinbaseError> {
        let level = level.to_string();
        self.get(&public::product_book(product_id), &[("level", level.as_str())])
            .await
    }

    /// Snapshot of the last trade, best bid/ask and 24h volume.
    pub async fn get_product_ticker(&self, product_id: &str) -> Result<Value, CoinbaseError> {
        self.get(&public::product_ticker(product_id), NO_PARAMS).await
    }

    /// Historic rates as `[time, low, high, open, close, volume]` buckets.
    ///
    /// Meant for occasional backfills; poll the ticker or follow the feed
    /// for live prices.
    pub async fn get_product_historic_rates(
        &self,
        product_id: &str,
        request: &HistoricRatesRequest,
    ) -> Result<Value, CoinbaseError> {
        self.get(&public::product_candles(product_id), request).await
    }

    /// 24 hour statistics for a product.
    pub async fn get_product_24hr_stats(&self, product_id: &str) -> Result<Value, CoinbaseError> {
        self.get(&public::product_stats(product_id), NO_PARAMS).await
    }

    /// Every trade for a product, newest first.
    pub fn get_product_trades(&self, product_id: &str) -> Result<Paginator, CoinbaseError> {
        self.paginate(&public::product_trades(product_id), NO_PARAMS)
    }
}
