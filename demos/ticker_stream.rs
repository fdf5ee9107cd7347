//! Example: Streaming ticker data from the feed.
//!
//! Run with: cargo run --example ticker_stream

use std::sync::Arc;

use coinbase_pro_client::ws::messages::{Subscription, channels};
use coinbase_pro_client::ws::{StreamConfig, StreamConnection, StreamingClient};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = StreamConfig::builder().keepalive(true).build();
    let connection = StreamConnection::new().config(config);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Value>();
    let mut client = StreamingClient::new(connection).sink(Arc::new(tx));

    println!("Subscribing to BTC-USD and ETH-USD tickers...");
    client
        .start(Subscription::new(["BTC-USD", "ETH-USD"], [channels::TICKER]))
        .await?;

    let mut message_count = 0;
    while let Some(message) = rx.recv().await {
        match message["type"].as_str() {
            Some("ticker") => println!(
                "[Ticker] {} | Bid: {} | Ask: {} | Last: {}",
                message["product_id"], message["best_bid"], message["best_ask"], message["price"]
            ),
            Some("subscriptions") => println!("[Subscribed] {}", message["channels"]),
            Some("error") => println!("[Error] {}", message["message"]),
            _ => {}
        }

        message_count += 1;
        if message_count >= 50 || client.is_finished() {
            break;
        }
    }

    client.stop().await?;
    println!("Connection closed.");
    Ok(())
}
