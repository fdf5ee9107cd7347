//! Example: Public market data and paginated trade history.
//!
//! Run with: cargo run --example public_trades

use coinbase_pro_client::rest::RestClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    tracing_subscriber::fmt::init();

    let client = RestClient::new();

    let time = client.get_time().await?;
    println!("Server time: {}", time["iso"]);

    let ticker = client.get_product_ticker("BTC-USD").await?;
    println!(
        "BTC-USD | Bid: {} | Ask: {} | Last: {}",
        ticker["bid"], ticker["ask"], ticker["price"]
    );

    // Trades arrive newest first; each page waits the client's request delay.
    let mut trades = client.get_product_trades("BTC-USD")?;
    let mut count = 0;
    while let Some(trade) = trades.next().await {
        let trade = trade?;
        println!(
            "[Trade {}] {} {} @ {}",
            trade["trade_id"], trade["side"], trade["size"], trade["price"]
        );
        count += 1;
        if count >= 250 {
            break;
        }
    }
    println!("Read {} trades over {} pages", count, trades.pages_fetched());

    if let Some(rejection) = trades.rejection() {
        println!("Server refused a page: {}", rejection);
    }

    Ok(())
}
