use std::sync::Arc;
use std::time::Duration;

use coinbase_pro_client::auth::EnvCredentials;
use coinbase_pro_client::rest::{NO_PARAMS, RestClient, SANDBOX_BASE_URL};
use coinbase_pro_client::ws::messages::Subscription;
use coinbase_pro_client::ws::{StreamConnection, StreamingClient, endpoints};
use serde_json::Value;

fn live_tests_enabled() -> bool {
    std::env::var("CBPRO_LIVE_TESTS").ok().as_deref() == Some("1")
}

#[tokio::test]
#[ignore]
async fn live_public_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let client = RestClient::sandbox();
    let time = client.get_time().await?;
    assert!(time.get("epoch").is_some());

    let trades = client.get_product_trades("BTC-USD")?;
    let mut stream = Box::pin(trades.into_stream());
    let first = futures_util::StreamExt::next(&mut stream).await;
    assert!(first.is_some());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_private_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let credentials = match EnvCredentials::try_from_env() {
        Some(creds) => creds,
        None => return Ok(()),
    };
    let client = RestClient::builder()
        .base_url(SANDBOX_BASE_URL)
        .credentials(Arc::new(credentials))
        .build();

    let accounts: Value = client.get("/accounts", NO_PARAMS).await?;
    assert!(accounts.is_array());

    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_feed_smoke() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    if !live_tests_enabled() {
        return Ok(());
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Value>();
    let mut client = StreamingClient::new(StreamConnection::with_url(endpoints::WS_FEED_SANDBOX))
        .sink(Arc::new(tx));
    client.start(Subscription::default()).await?;

    let first = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await?;
    assert!(first.is_some());

    client.stop().await?;
    Ok(())
}
