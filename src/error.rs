//! Error types for the Coinbase Pro client library.

use thiserror::Error;

/// The main error type for all Coinbase Pro client operations.
#[derive(Error, Debug)]
pub enum CoinbaseError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// WebSocket communication error (with message)
    #[error("WebSocket error: {0}")]
    WebSocketMsg(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Coinbase Pro returned a non-success status
    #[error("Coinbase Pro API error: {0}")]
    Api(ApiError),

    /// Authentication configuration error (malformed secret, bad header value)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Request parameters could not be encoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// Missing required credentials
    #[error("Missing credentials: API key, secret and passphrase required")]
    MissingCredentials,

    /// Operation not allowed in the current client state
    #[error("Invalid client state: {0}")]
    InvalidState(String),
}

impl CoinbaseError {
    /// Map a transport failure, folding timeouts into [`CoinbaseError::Timeout`].
    pub(crate) fn transport(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => CoinbaseError::Timeout,
            other => CoinbaseError::HttpMiddleware(other),
        }
    }

    /// Map a body-read failure, folding timeouts into [`CoinbaseError::Timeout`].
    pub(crate) fn body(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CoinbaseError::Timeout
        } else {
            CoinbaseError::Http(error)
        }
    }

    /// Whether the caller may reasonably re-invoke the failed operation.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            CoinbaseError::Timeout
            | CoinbaseError::Http(_)
            | CoinbaseError::HttpMiddleware(_)
            | CoinbaseError::WebSocket(_) => true,
            CoinbaseError::Api(api) => api.is_rate_limit() || api.status >= 500,
            _ => false,
        }
    }
}

/// Error payload returned by Coinbase Pro with a non-success status.
///
/// The raw body is kept so callers can inspect fields beyond `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// The server's `message` field, or the raw body when absent
    pub message: String,
    /// The response body, parsed as JSON when possible
    pub body: serde_json::Value,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl ApiError {
    /// Create a new API error from status and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            body: serde_json::json!({ "message": message }),
            message,
        }
    }

    /// Build an API error from a raw response body.
    ///
    /// Coinbase Pro reports failures as `{"message": "..."}`; anything that
    /// is not JSON is kept as a string value.
    pub fn from_body(status: u16, body: &str) -> Self {
        let body = serde_json::from_str::<serde_json::Value>(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
        let message = match body.get("message").and_then(|m| m.as_str()) {
            Some(message) => message.to_string(),
            None => match &body {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        };
        Self {
            status,
            message,
            body,
        }
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        self.status == 429
    }

    /// Check if the request signature or key was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Check if the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_json_body() {
        let error = ApiError::from_body(401, r#"{"message":"invalid signature"}"#);
        assert_eq!(error.status, 401);
        assert_eq!(error.message, "invalid signature");
        assert!(error.is_unauthorized());
        assert_eq!(error.body["message"], "invalid signature");
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let error = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(error.message, "Bad Gateway");
        assert_eq!(error.body, serde_json::Value::String("Bad Gateway".into()));
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new(429, "Rate limit exceeded");
        assert_eq!(error.to_string(), "429: Rate limit exceeded");
        assert!(error.is_rate_limit());
    }

    #[test]
    fn test_transient_classification() {
        assert!(CoinbaseError::Timeout.is_transient());
        assert!(CoinbaseError::Api(ApiError::new(503, "busy")).is_transient());
        assert!(!CoinbaseError::Api(ApiError::new(400, "bad")).is_transient());
        assert!(!CoinbaseError::Auth("bad secret".into()).is_transient());
    }
}
