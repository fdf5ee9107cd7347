//! Rate limiting for Coinbase Pro API.
//!
//! Coinbase Pro enforces per-IP and per-key request limits. This crate does not
//! negotiate with the server: each client waits a fixed delay before every
//! outbound request, including every page of a paginated query.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use coinbase_pro_client::rest::RestClient;
//!
//! // Each client instance owns its own delay.
//! let client = RestClient::builder()
//!     .request_delay(Duration::from_millis(500))
//!     .build();
//! assert_eq!(client.request_delay(), Duration::from_millis(500));
//! ```

mod throttle;

use std::time::Duration;

pub use throttle::RequestThrottle;

/// Delay applied before each request unless configured otherwise.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(275);
