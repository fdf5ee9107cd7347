//! Coinbase Pro WebSocket feed client.
//!
//! [`StreamConnection`] owns one duplex connection: connect, send, receive,
//! keepalive ping and disconnect. [`StreamingClient`] drives a connection from
//! a background task and hands every message to an [`EventHandler`], which by
//! default logs it and forwards it to an optional [`RecordSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coinbase_pro_client::ws::{StreamConnection, StreamingClient};
//! use coinbase_pro_client::ws::messages::{Subscription, channels};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Value>();
//!     let mut client = StreamingClient::new(StreamConnection::new()).sink(Arc::new(tx));
//!
//!     client
//!         .start(Subscription::new(["BTC-USD", "ETH-USD"], [channels::TICKER]))
//!         .await?;
//!
//!     while let Some(message) = rx.recv().await {
//!         println!("{}", message);
//!     }
//!
//!     client.stop().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod connection;
mod events;
pub mod messages;

pub use client::{ClientState, StreamingClient};
pub use connection::{
    KEEPALIVE_PAYLOAD, StreamConfig, StreamConfigBuilder, StreamConnection, endpoints,
};
pub use events::{EventHandler, LoggingHandler, RecordSink};
