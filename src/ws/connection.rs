//! A single feed connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, watch};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::auth::{AuthHeaders, CredentialsProvider, SystemClock, TimestampProvider};
use crate::error::CoinbaseError;
use crate::ws::messages::{Subscription, SubscriptionAuth};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsReceiver = SplitStream<WsStream>;

/// WebSocket endpoint URLs.
pub mod endpoints {
    /// Production feed.
    pub const WS_FEED: &str = "wss://ws-feed.pro.coinbase.com";
    /// Sandbox feed.
    pub const WS_FEED_SANDBOX: &str = "wss://ws-feed-public.sandbox.pro.coinbase.com";
}

/// Payload of keepalive pings.
pub const KEEPALIVE_PAYLOAD: &str = "keepalive";

/// Configuration for feed connections.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Interval between keepalive pings.
    pub timeout: Duration,
    /// Log every frame at `info` instead of `trace`.
    pub trace: bool,
    /// Run the keepalive ping loop alongside the receive loop.
    pub keepalive: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            trace: false,
            keepalive: false,
        }
    }
}

impl StreamConfig {
    /// Create a new configuration builder.
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::new()
    }
}

/// Builder for [`StreamConfig`].
#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: StreamConfig::default(),
        }
    }

    /// Set the keepalive interval.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enable frame tracing.
    pub fn trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    /// Enable the keepalive ping loop.
    pub fn keepalive(mut self, keepalive: bool) -> Self {
        self.config.keepalive = keepalive;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StreamConfig {
        self.config
    }
}

/// One duplex connection to the feed.
///
/// All operations take `&self` so the connection can be shared (behind an
/// `Arc`) between a receive loop, a keepalive loop and the controller. The
/// halves sit behind separate locks: receiving never blocks sending.
///
/// Liveness means both halves are installed and the socket has not reported
/// closure. The open flag is raised only after the halves are in place and
/// lowered on close frames, transport errors and [`disconnect`](Self::disconnect).
pub struct StreamConnection {
    url: String,
    config: StreamConfig,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    timestamp_provider: Arc<dyn TimestampProvider>,
    sink: Mutex<Option<WsSink>>,
    receiver: Mutex<Option<WsReceiver>>,
    open: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl StreamConnection {
    /// Create an unconnected handle to the production feed.
    pub fn new() -> Self {
        Self::with_url(endpoints::WS_FEED)
    }

    /// Create an unconnected handle to a custom URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            url: url.into(),
            config: StreamConfig::default(),
            credentials: None,
            timestamp_provider: Arc::new(SystemClock::new()),
            sink: Mutex::new(None),
            receiver: Mutex::new(None),
            open: AtomicBool::new(false),
            shutdown,
        }
    }

    /// Set the connection configuration.
    pub fn config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Authenticate the handshake and subscriptions with these credentials.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom timestamp provider.
    pub fn timestamp_provider(mut self, provider: Arc<dyn TimestampProvider>) -> Self {
        self.timestamp_provider = provider;
        self
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The connection configuration.
    pub fn stream_config(&self) -> &StreamConfig {
        &self.config
    }

    /// Whether the connection is authenticated.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Check if the connection is open.
    pub fn is_connected(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Open the connection.
    ///
    /// With credentials, the handshake carries `CB-ACCESS-*` headers signed
    /// once against `GET /users/self/verify`. An existing connection is
    /// closed first.
    pub async fn connect(&self) -> Result<(), CoinbaseError> {
        if self.is_connected() {
            self.disconnect().await?;
        }

        let url = Url::parse(&self.url)?;
        let mut request = url.as_str().into_client_request()?;

        if let Some(auth) = self.verify_headers()? {
            for (name, value) in auth.pairs() {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| CoinbaseError::Auth(format!("Invalid header name {name}: {e}")))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| CoinbaseError::Auth(format!("Invalid value for {name}: {e}")))?;
                request.headers_mut().insert(name, value);
            }
        }

        let (ws_stream, _) = connect_async(request).await.map_err(|e| {
            CoinbaseError::WebSocketMsg(format!("Failed to connect to {}: {}", self.url, e))
        })?;
        let (sink, receiver) = ws_stream.split();

        *self.sink.lock().await = Some(sink);
        *self.receiver.lock().await = Some(receiver);
        self.shutdown.send_replace(false);
        self.open.store(true, Ordering::SeqCst);

        tracing::info!(url = %self.url, authenticated = self.has_credentials(), "feed connected");
        Ok(())
    }

    /// Sign a subscription when the connection carries credentials.
    ///
    /// Unauthenticated connections get the message back unchanged.
    pub fn sign_subscription(&self, subscription: Subscription) -> Result<Subscription, CoinbaseError> {
        match self.verify_headers()? {
            Some(auth) => Ok(subscription.with_auth(SubscriptionAuth::from(auth))),
            None => Ok(subscription),
        }
    }

    fn verify_headers(&self) -> Result<Option<AuthHeaders>, CoinbaseError> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };
        credentials.get_credentials().validate()?;
        let timestamp = self.timestamp_provider.timestamp();
        AuthHeaders::verify(credentials.get_credentials(), &timestamp).map(Some)
    }

    /// Send a JSON message.
    ///
    /// Does nothing when not connected.
    pub async fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<(), CoinbaseError> {
        if !self.is_connected() {
            return Ok(());
        }
        let payload = serde_json::to_string(message)?;

        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            return Ok(());
        };
        self.log_frame("send", &payload);
        sink.send(WsMessage::Text(payload.into())).await.map_err(|e| {
            self.open.store(false, Ordering::SeqCst);
            CoinbaseError::WebSocket(e)
        })
    }

    /// Wait for the next JSON message.
    ///
    /// Returns `Ok(None)` when not connected, when the server closes the
    /// connection, or when [`disconnect`](Self::disconnect) interrupts the wait.
    /// Control frames are skipped.
    pub async fn receive(&self) -> Result<Option<Value>, CoinbaseError> {
        if !self.is_connected() {
            return Ok(None);
        }
        let mut shutdown = self.shutdown.subscribe();

        let mut guard = self.receiver.lock().await;
        let Some(receiver) = guard.as_mut() else {
            return Ok(None);
        };

        loop {
            let frame = tokio::select! {
                _ = closed(&mut shutdown) => return Ok(None),
                frame = receiver.next() => frame,
            };

            match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    self.log_frame("recv", &text);
                    return serde_json::from_str(&text).map(Some).map_err(CoinbaseError::from);
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    return serde_json::from_slice(&data).map(Some).map_err(CoinbaseError::from);
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => continue,
                Some(Ok(WsMessage::Close(frame))) => {
                    tracing::info!(url = %self.url, ?frame, "feed closed by server");
                    self.open.store(false, Ordering::SeqCst);
                    return Ok(None);
                }
                Some(Err(e)) => {
                    tracing::warn!(url = %self.url, "WebSocket error: {}", e);
                    self.open.store(false, Ordering::SeqCst);
                    return Err(CoinbaseError::WebSocket(e));
                }
                None => {
                    self.open.store(false, Ordering::SeqCst);
                    return Ok(None);
                }
            }
        }
    }

    /// Send keepalive pings until the connection goes away.
    ///
    /// Sleeps the configured timeout between pings; [`disconnect`](Self::disconnect)
    /// cuts the sleep short. Meant to run in its own task.
    pub async fn ping(&self) -> Result<(), CoinbaseError> {
        let mut shutdown = self.shutdown.subscribe();

        while self.is_connected() {
            if self.config.trace {
                tracing::info!(payload = KEEPALIVE_PAYLOAD, timeout = ?self.config.timeout, "ping");
            } else {
                tracing::trace!(payload = KEEPALIVE_PAYLOAD, "ping");
            }

            {
                let mut guard = self.sink.lock().await;
                let Some(sink) = guard.as_mut() else {
                    break;
                };
                if let Err(e) = sink.send(WsMessage::Ping(KEEPALIVE_PAYLOAD.into())).await {
                    self.open.store(false, Ordering::SeqCst);
                    return Err(CoinbaseError::WebSocket(e));
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.timeout) => {}
                _ = closed(&mut shutdown) => break,
            }
        }
        Ok(())
    }

    /// Close the connection gracefully.
    ///
    /// Calling this on a closed connection is a no-op.
    pub async fn disconnect(&self) -> Result<(), CoinbaseError> {
        let was_open = self.open.swap(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);

        if let Some(mut sink) = self.sink.lock().await.take() {
            if let Err(e) = sink.send(WsMessage::Close(None)).await {
                tracing::debug!("close frame not delivered: {}", e);
            }
            let _ = sink.close().await;
        }
        self.receiver.lock().await.take();

        if was_open {
            tracing::info!(url = %self.url, "feed disconnected");
        }
        Ok(())
    }

    fn log_frame(&self, direction: &str, payload: &str) {
        if self.config.trace {
            tracing::info!(direction, payload, "frame");
        } else {
            tracing::trace!(direction, payload, "frame");
        }
    }
}

/// Resolve once the shutdown flag is raised, including if it already is.
async fn closed(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|closed| *closed).await;
}

impl Default for StreamConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConnection")
            .field("url", &self.url)
            .field("connected", &self.is_connected())
            .field("has_credentials", &self.credentials.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{FixedTimestamp, StaticCredentials};

    #[test]
    fn test_config_builder() {
        let config = StreamConfig::builder()
            .timeout(Duration::from_secs(5))
            .trace(true)
            .keepalive(true)
            .build();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.trace);
        assert!(config.keepalive);
    }

    #[test]
    fn test_defaults() {
        let connection = StreamConnection::new();
        assert_eq!(connection.url(), endpoints::WS_FEED);
        assert_eq!(connection.stream_config().timeout, Duration::from_secs(30));
        assert!(!connection.is_connected());
        assert!(!connection.has_credentials());
    }

    #[tokio::test]
    async fn test_operations_are_noops_when_disconnected() {
        let connection = StreamConnection::with_url("ws://127.0.0.1:1");
        connection.send(&Subscription::default()).await.unwrap();
        assert!(connection.receive().await.unwrap().is_none());
        connection.ping().await.unwrap();
        connection.disconnect().await.unwrap();
        connection.disconnect().await.unwrap();
        assert!(!connection.is_connected());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let connection = StreamConnection::with_url("not a url");
        assert!(matches!(connection.connect().await, Err(CoinbaseError::Url(_))));
        assert!(!connection.is_connected());
    }

    #[test]
    fn test_sign_subscription() {
        let credentials = Arc::new(StaticCredentials::new("key", "dGVzdF9zZWNyZXQ=", "pass"));
        let connection = StreamConnection::new()
            .credentials(credentials)
            .timestamp_provider(Arc::new(FixedTimestamp::new("1600000000.000000")));

        let signed = connection.sign_subscription(Subscription::default()).unwrap();
        let auth = signed.auth.unwrap();
        assert_eq!(auth.signature, "0yruWFazEnGyxTrXwOgmiatGOp+UPhJgFaFHrt4+34I=");
        assert_eq!(auth.key, "key");
        assert_eq!(auth.timestamp, "1600000000.000000");
    }

    #[test]
    fn test_incomplete_credentials_refuse_to_sign() {
        let credentials = Arc::new(StaticCredentials::new("", "dGVzdF9zZWNyZXQ=", "pass"));
        let connection = StreamConnection::new().credentials(credentials);
        let result = connection.sign_subscription(Subscription::default());
        assert!(matches!(result, Err(CoinbaseError::MissingCredentials)));
    }

    #[test]
    fn test_unauthenticated_subscription_unchanged() {
        let connection = StreamConnection::new();
        let msg = connection.sign_subscription(Subscription::default()).unwrap();
        assert_eq!(msg, Subscription::default());
    }
}
