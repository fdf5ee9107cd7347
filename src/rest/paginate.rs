//! Cursor pagination over `CB-AFTER` tokens.
//!
//! Coinbase Pro pages list endpoints newest-first. Each page response carries a
//! `CB-AFTER` header; echoing it back as the `after` query parameter fetches the
//! next (older) page. A request that already carries `before` asks for a single
//! bounded page and is never continued.

use std::collections::VecDeque;

use futures_util::Stream;
use reqwest::Method;
use serde_json::Value;

use crate::error::{ApiError, CoinbaseError};
use crate::rest::client::RestClient;
use crate::rest::endpoints::{AFTER_PARAM, BEFORE_PARAM, CB_AFTER};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    /// No page fetched yet.
    Start,
    /// Next page starts after this token.
    After(String),
    /// No more pages.
    Exhausted,
}

/// A lazy, finite, non-restartable sequence of records from a paginated endpoint.
///
/// Records are yielded one at a time in server order; a page is fetched only
/// when the previous one is drained, and every fetch waits the client's
/// request delay first. The sequence ends when:
///
/// - the server omits `CB-AFTER`, or
/// - the caller's own parameters contained `before`, after the first page, or
/// - a page comes back with a non-success status. No records of that page are
///   yielded and its body is kept as [`Paginator::rejection`].
///
/// Transport and decoding failures are yielded once as `Err` and end the sequence.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_pro_client::rest::{RestClient, NO_PARAMS};
///
/// # async fn run() -> Result<(), coinbase_pro_client::CoinbaseError> {
/// let client = RestClient::new();
/// let mut trades = client.paginate("/products/BTC-USD/trades", NO_PARAMS)?;
/// while let Some(trade) = trades.next().await {
///     println!("{}", trade?);
/// }
/// if let Some(rejection) = trades.rejection() {
///     eprintln!("server refused: {}", rejection);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Paginator {
    client: RestClient,
    path: String,
    params: Vec<(String, String)>,
    bounded: bool,
    buffer: VecDeque<Value>,
    cursor: Cursor,
    rejection: Option<ApiError>,
    pages: usize,
}

impl Paginator {
    pub(crate) fn new(client: RestClient, path: &str, params: Vec<(String, String)>) -> Self {
        let bounded = params.iter().any(|(key, _)| key == BEFORE_PARAM);
        Self {
            client,
            path: path.to_string(),
            params,
            bounded,
            buffer: VecDeque::new(),
            cursor: Cursor::Start,
            rejection: None,
            pages: 0,
        }
    }

    /// Yield the next record, fetching the next page when needed.
    ///
    /// Returns `None` once the sequence has ended.
    pub async fn next(&mut self) -> Option<Result<Value, CoinbaseError>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }

            let after = match &self.cursor {
                Cursor::Exhausted => return None,
                Cursor::Start => None,
                Cursor::After(token) => Some(token.clone()),
            };

            if let Err(error) = self.fetch_page(after).await {
                self.cursor = Cursor::Exhausted;
                return Some(Err(error));
            }
        }
    }

    /// The body of a rejected page, if the sequence ended on a non-success status.
    pub fn rejection(&self) -> Option<&ApiError> {
        self.rejection.as_ref()
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Whether no further records will be yielded.
    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Exhausted && self.buffer.is_empty()
    }

    /// Drain every remaining record.
    ///
    /// Fails with [`CoinbaseError::Api`] when a page was rejected.
    pub async fn collect_all(mut self) -> Result<Vec<Value>, CoinbaseError> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record?);
        }
        match self.rejection.take() {
            Some(rejection) => Err(CoinbaseError::Api(rejection)),
            None => Ok(records),
        }
    }

    /// Adapt into a [`Stream`].
    ///
    /// A rejection becomes the stream's final item, as `Err(CoinbaseError::Api)`.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value, CoinbaseError>> {
        futures_util::stream::unfold(Some(self), |state| async move {
            let mut paginator = state?;
            match paginator.next().await {
                Some(item) => Some((item, Some(paginator))),
                None => paginator
                    .rejection
                    .take()
                    .map(|rejection| (Err(CoinbaseError::Api(rejection)), None)),
            }
        })
    }

    async fn fetch_page(&mut self, after: Option<String>) -> Result<(), CoinbaseError> {
        let mut params = self.params.clone();
        if let Some(after) = after {
            params.retain(|(key, _)| key != AFTER_PARAM);
            params.push((AFTER_PARAM.to_string(), after));
        }
        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| CoinbaseError::InvalidRequest(e.to_string()))?;

        let response = self.client.send(Method::GET, &self.path, &query, None).await?;
        let status = response.status();
        let next_after = response
            .headers()
            .get(CB_AFTER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        let body = response.text().await.map_err(CoinbaseError::body)?;
        self.pages += 1;

        if !status.is_success() {
            let rejection = ApiError::from_body(status.as_u16(), &body);
            tracing::warn!(path = %self.path, page = self.pages, %rejection, "page rejected");
            self.rejection = Some(rejection);
            self.cursor = Cursor::Exhausted;
            return Ok(());
        }

        let records: Vec<Value> = serde_json::from_str(&body).map_err(|e| {
            CoinbaseError::InvalidResponse(format!("Expected a JSON array page: {}. Body: {}", e, body))
        })?;
        tracing::debug!(
            path = %self.path,
            page = self.pages,
            records = records.len(),
            after = next_after.as_deref().unwrap_or(""),
            "fetched page"
        );
        self.buffer.extend(records);

        self.cursor = match next_after {
            Some(token) if !self.bounded => Cursor::After(token),
            _ => Cursor::Exhausted,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(params: &[(&str, &str)]) -> Paginator {
        let pairs = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Paginator::new(RestClient::new(), "/fills", pairs)
    }

    #[test]
    fn test_before_marks_bounded() {
        assert!(paginator(&[("before", "10")]).bounded);
        assert!(!paginator(&[("product_id", "BTC-USD")]).bounded);
    }

    #[test]
    fn test_fresh_paginator_is_not_exhausted() {
        let paginator = paginator(&[]);
        assert!(!paginator.is_exhausted());
        assert_eq!(paginator.pages_fetched(), 0);
        assert!(paginator.rejection().is_none());
    }
}
