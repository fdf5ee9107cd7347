//! Coinbase Pro REST API client.
//!
//! [`RestClient`] dispatches signed or public requests and pages through
//! cursor-paginated endpoints with [`Paginator`]. Endpoint-specific parameter
//! shaping is left to the caller: any `Serialize` value that encodes as a flat
//! query string works as `params`.
//!
//! ```rust,ignore
//! use coinbase_pro_client::rest::RestClient;
//!
//! let client = RestClient::new();
//! let fills = client
//!     .paginate("/fills", &[("product_id", "BTC-USD")])?
//!     .collect_all()
//!     .await?;
//! ```

mod client;
mod endpoints;
mod market_data;
mod paginate;

pub use client::{DEFAULT_TIMEOUT, NO_PARAMS, RestClient, RestClientBuilder};
pub use endpoints::*;
pub use market_data::{Granularity, HistoricRatesRequest};
pub use paginate::Paginator;
