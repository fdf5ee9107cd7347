//! # Coinbase Pro Client
//!
//! An async Rust client core for the Coinbase Pro REST and WebSocket feed APIs.
//!
//! ## Features
//!
//! - HMAC-SHA256 request signing with `CB-ACCESS-*` headers
//! - Signed REST dispatch with a fixed inter-request delay
//! - Lazy cursor pagination over `CB-AFTER` tokens
//! - A WebSocket feed client with keepalive pings and pluggable event handlers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coinbase_pro_client::rest::RestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new();
//!     let time = client.get_time().await?;
//!     println!("Server time: {}", time);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod rest;
pub mod ws;

// Re-export commonly used types at crate root
pub use error::{ApiError, CoinbaseError};

/// Result type alias using CoinbaseError
pub type Result<T> = std::result::Result<T, CoinbaseError>;
