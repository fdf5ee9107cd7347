//! Coinbase Pro REST API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{AuthHeaders, CONTENT_TYPE_JSON, CredentialsProvider, SystemClock, TimestampProvider};
use crate::error::{ApiError, CoinbaseError};
use crate::rate_limit::RequestThrottle;
use crate::rest::endpoints::{COINBASE_BASE_URL, SANDBOX_BASE_URL};
use crate::rest::paginate::Paginator;

/// Default timeout applied to every REST call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An empty query, for calls that take no parameters.
pub const NO_PARAMS: &[(&str, &str)] = &[];

/// The Coinbase Pro REST API client.
///
/// Signs requests when credentials are configured, waits a fixed delay before
/// every call and bounds each call by a timeout. It never retries on its own.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_pro_client::rest::{RestClient, NO_PARAMS};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Create a client for public endpoints only
///     let client = RestClient::new();
///
///     let products: serde_json::Value = client.get("/products", NO_PARAMS).await?;
///     println!("Products: {}", products);
///
///     Ok(())
/// }
/// ```
///
/// For private endpoints, provide credentials:
///
/// ```rust,no_run
/// use coinbase_pro_client::rest::{RestClient, NO_PARAMS};
/// use coinbase_pro_client::auth::StaticCredentials;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::new("key", "c2VjcmV0", "passphrase"));
///     let client = RestClient::builder()
///         .credentials(credentials)
///         .build();
///
///     let accounts: serde_json::Value = client.get("/accounts", NO_PARAMS).await?;
///     println!("Accounts: {}", accounts);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    timestamp_provider: Arc<dyn TimestampProvider>,
    throttle: RequestThrottle,
    timeout: Duration,
}

impl RestClient {
    /// Create a new client with default settings.
    ///
    /// This client can only access public endpoints.
    /// Use [`RestClient::builder()`] to configure credentials for private endpoints.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a public client pointed at the sandbox.
    pub fn sandbox() -> Self {
        Self::builder().base_url(SANDBOX_BASE_URL).build()
    }

    /// Create a new client builder.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::new()
    }

    /// The base URL requests are routed against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The delay waited before every outbound call.
    pub fn request_delay(&self) -> Duration {
        self.throttle.delay()
    }

    /// The timeout bounding every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether requests are signed.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send a GET request.
    pub async fn get<T, Q>(&self, path: &str, params: &Q) -> Result<T, CoinbaseError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request(Method::GET, path, params, None).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post<T, Q, B>(&self, path: &str, params: &Q, body: &B) -> Result<T, CoinbaseError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, params, Some(&body)).await
    }

    /// Send a DELETE request.
    pub async fn delete<T, Q>(&self, path: &str, params: &Q) -> Result<T, CoinbaseError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request(Method::DELETE, path, params, None).await
    }

    /// Send a request with any method.
    ///
    /// A non-success status surfaces as [`CoinbaseError::Api`] carrying the
    /// server's body.
    pub async fn request<T, Q>(
        &self,
        method: Method,
        path: &str,
        params: &Q,
        body: Option<&serde_json::Value>,
    ) -> Result<T, CoinbaseError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let query = encode_query(params)?;
        let response = self.send(method, path, &query, body).await?;
        parse_response(response).await
    }

    /// Page through a cursor-paginated endpoint, one record at a time.
    ///
    /// See [`Paginator`] for the termination rules.
    pub fn paginate<Q>(&self, path: &str, params: &Q) -> Result<Paginator, CoinbaseError>
    where
        Q: Serialize + ?Sized,
    {
        let query = encode_query(params)?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&query)
            .map_err(|e| CoinbaseError::InvalidRequest(e.to_string()))?;
        Ok(Paginator::new(self.clone(), path, pairs))
    }

    /// Throttle, sign and send one request.
    ///
    /// Incomplete or malformed credentials fail before anything is sent. The
    /// timestamp is read after the throttle delay so it reflects the moment
    /// the request leaves.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, CoinbaseError> {
        let request_path = if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query)
        };
        let body = body.map(serde_json::to_string).transpose()?;
        let url = format!("{}{}", self.base_url, request_path);

        if let Some(credentials) = &self.credentials {
            credentials.get_credentials().validate()?;
        }

        self.throttle.wait().await;

        let mut builder = self.http_client.request(method.clone(), &url);

        if let Some(credentials) = &self.credentials {
            let timestamp = self.timestamp_provider.timestamp();
            let headers = AuthHeaders::new(
                credentials.get_credentials(),
                &timestamp,
                method.as_str(),
                &request_path,
                body.as_deref().unwrap_or(""),
            )?;
            for (name, value) in headers.pairs() {
                builder = builder.header(name, value);
            }
        } else if body.is_some() {
            builder = builder.header(CONTENT_TYPE, CONTENT_TYPE_JSON);
        }

        if let Some(body) = body {
            builder = builder.body(body);
        }

        tracing::debug!(%method, path = %request_path, signed = self.credentials.is_some(), "sending request");

        builder.send().await.map_err(CoinbaseError::transport)
    }
}

/// Serialize query parameters the same way they are signed.
fn encode_query<Q>(params: &Q) -> Result<String, CoinbaseError>
where
    Q: Serialize + ?Sized,
{
    serde_urlencoded::to_string(params).map_err(|e| CoinbaseError::InvalidRequest(e.to_string()))
}

/// Parse a response body, turning non-success statuses into [`ApiError`].
async fn parse_response<T>(response: reqwest::Response) -> Result<T, CoinbaseError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await.map_err(CoinbaseError::body)?;

    if !status.is_success() {
        return Err(CoinbaseError::Api(ApiError::from_body(status.as_u16(), &body)));
    }

    let text = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(text).map_err(|e| {
        CoinbaseError::InvalidResponse(format!("Failed to parse response: {}. Body: {}", e, body))
    })
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .field("request_delay", &self.throttle.delay())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`RestClient`].
pub struct RestClientBuilder {
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    timestamp_provider: Option<Arc<dyn TimestampProvider>>,
    user_agent: Option<String>,
    timeout: Duration,
    throttle: RequestThrottle,
}

impl RestClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: COINBASE_BASE_URL.to_string(),
            credentials: None,
            timestamp_provider: None,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            throttle: RequestThrottle::default(),
        }
    }

    /// Set the base URL (useful for the sandbox or a mock server).
    ///
    /// Trailing slashes are stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the credentials provider for authenticated requests.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom timestamp provider.
    pub fn timestamp_provider(mut self, provider: Arc<dyn TimestampProvider>) -> Self {
        self.timestamp_provider = Some(provider);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the timeout bounding each call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the delay waited before each call.
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.throttle = RequestThrottle::new(delay);
        self
    }

    /// Build the client.
    pub fn build(self) -> RestClient {
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("coinbase-pro-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("coinbase-pro-client"));
        headers.insert(USER_AGENT, header_value);

        // Connection pooling is shared across clones of the built client.
        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    timeout = ?self.timeout,
                    "HTTP client build failed, falling back to defaults without a timeout: {}",
                    e
                );
                reqwest::Client::new()
            });

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let timestamp_provider = self
            .timestamp_provider
            .unwrap_or_else(|| Arc::new(SystemClock::new()));

        RestClient {
            http_client: client,
            base_url: self.base_url,
            credentials: self.credentials,
            timestamp_provider,
            throttle: self.throttle,
            timeout: self.timeout,
        }
    }
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
