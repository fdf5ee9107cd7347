//! Coinbase Pro REST API endpoint constants.

/// Base URL for the Coinbase Pro REST API.
pub const COINBASE_BASE_URL: &str = "https://api.pro.coinbase.com";

/// Base URL for the Coinbase Pro sandbox REST API.
pub const SANDBOX_BASE_URL: &str = "https://api-public.sandbox.pro.coinbase.com";

/// Response header carrying the cursor for the next (older) page.
pub const CB_AFTER: &str = "CB-AFTER";

/// Query parameter that echoes [`CB_AFTER`] back to the server.
pub const AFTER_PARAM: &str = "after";

/// Query parameter that requests a single page newer than a cursor.
pub const BEFORE_PARAM: &str = "before";

/// Public endpoints (no authentication required).
pub mod public {
    /// List known trading pairs.
    pub const PRODUCTS: &str = "/products";
    /// List known currencies.
    pub const CURRENCIES: &str = "/currencies";
    /// Get server time.
    pub const TIME: &str = "/time";

    /// Order book for a product.
    pub fn product_book(product_id: &str) -> String {
        format!("/products/{product_id}/book")
    }

    /// Last tick for a product.
    pub fn product_ticker(product_id: &str) -> String {
        format!("/products/{product_id}/ticker")
    }

    /// Trade history for a product (paginated).
    pub fn product_trades(product_id: &str) -> String {
        format!("/products/{product_id}/trades")
    }

    /// Historic OHLCV candles for a product.
    pub fn product_candles(product_id: &str) -> String {
        format!("/products/{product_id}/candles")
    }

    /// 24 hour statistics for a product.
    pub fn product_stats(product_id: &str) -> String {
        format!("/products/{product_id}/stats")
    }
}
