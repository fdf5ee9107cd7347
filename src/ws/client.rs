//! Streaming feed client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;

use crate::error::CoinbaseError;
use crate::ws::connection::StreamConnection;
use crate::ws::events::{EventHandler, LoggingHandler, RecordSink};
use crate::ws::messages::Subscription;

/// Lifecycle of a [`StreamingClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Constructed, not yet started.
    Idle,
    /// Receive loop spawned.
    Running,
    /// Stopped. A client is not restarted; build a fresh one.
    Stopped,
}

/// Drives a [`StreamConnection`] from a background task and dispatches every
/// inbound message to an [`EventHandler`].
///
/// The client does not reconnect. When the server drops the connection the
/// receive loop ends and [`is_finished`](Self::is_finished) turns true; a
/// supervisor can then stop this client and start a new one.
///
/// # Example
///
/// ```rust,no_run
/// use coinbase_pro_client::ws::{StreamConnection, StreamingClient};
/// use coinbase_pro_client::ws::messages::{Subscription, channels};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut client = StreamingClient::new(StreamConnection::new());
///     client
///         .start(Subscription::new(["BTC-USD"], [channels::TICKER]))
///         .await?;
///
///     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
///     client.stop().await?;
///     Ok(())
/// }
/// ```
pub struct StreamingClient {
    connection: Arc<StreamConnection>,
    handler: Arc<dyn EventHandler>,
    sink: Option<Arc<dyn RecordSink>>,
    running: Arc<AtomicBool>,
    state: ClientState,
    listener: Option<JoinHandle<()>>,
    keepalive: Option<JoinHandle<()>>,
}

impl StreamingClient {
    /// Create an idle client with the default logging handler and no sink.
    pub fn new(connection: StreamConnection) -> Self {
        Self {
            connection: Arc::new(connection),
            handler: Arc::new(LoggingHandler),
            sink: None,
            running: Arc::new(AtomicBool::new(false)),
            state: ClientState::Idle,
            listener: None,
            keepalive: None,
        }
    }

    /// Replace the event handler.
    pub fn handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Forward messages to a record sink.
    pub fn sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The underlying connection.
    pub fn connection(&self) -> &StreamConnection {
        &self.connection
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Whether the receive loop is still meant to run.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a started client's receive loop has ended on its own.
    pub fn is_finished(&self) -> bool {
        self.state == ClientState::Running
            && self.listener.as_ref().is_none_or(|handle| handle.is_finished())
    }

    /// Connect, subscribe and spawn the receive loop.
    ///
    /// Returns once the subscription is sent; messages are dispatched from a
    /// background task. The subscription is signed when the connection
    /// carries credentials.
    pub async fn start(&mut self, subscription: Subscription) -> Result<(), CoinbaseError> {
        if self.state != ClientState::Idle {
            return Err(CoinbaseError::InvalidState(format!(
                "cannot start a client in state {:?}",
                self.state
            )));
        }

        self.handler.on_start();
        self.running.store(true, Ordering::SeqCst);
        self.state = ClientState::Running;

        if let Err(e) = self.subscribe(subscription).await {
            self.running.store(false, Ordering::SeqCst);
            self.connection.disconnect().await?;
            self.state = ClientState::Stopped;
            return Err(e);
        }

        self.listener = Some(tokio::spawn(listen(
            self.connection.clone(),
            self.handler.clone(),
            self.sink.clone(),
            self.running.clone(),
        )));

        if self.connection.stream_config().keepalive {
            let connection = self.connection.clone();
            let handler = self.handler.clone();
            self.keepalive = Some(tokio::spawn(async move {
                if let Err(e) = connection.ping().await {
                    handler.on_error(&e);
                }
            }));
        }

        self.handler.on_run();
        Ok(())
    }

    async fn subscribe(&self, subscription: Subscription) -> Result<(), CoinbaseError> {
        self.connection.connect().await?;
        let subscription = self.connection.sign_subscription(subscription)?;
        self.connection.send(&subscription).await
    }

    /// Stop the receive loop and close the connection.
    ///
    /// Waits for the background tasks to finish, so no hook fires after this
    /// returns except `on_stop`, which fires last. Stopping a client that is
    /// not running is a no-op.
    pub async fn stop(&mut self) -> Result<(), CoinbaseError> {
        if self.state != ClientState::Running {
            return Ok(());
        }

        self.running.store(false, Ordering::SeqCst);
        self.connection.disconnect().await?;

        for handle in [self.listener.take(), self.keepalive.take()].into_iter().flatten() {
            if let Err(e) = handle.await {
                tracing::warn!("feed task ended abnormally: {}", e);
            }
        }

        self.state = ClientState::Stopped;
        self.handler.on_stop();
        Ok(())
    }
}

/// Receive until stopped or until the connection goes away.
async fn listen(
    connection: Arc<StreamConnection>,
    handler: Arc<dyn EventHandler>,
    sink: Option<Arc<dyn RecordSink>>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match connection.receive().await {
            Ok(Some(message)) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                handler.on_message(sink.as_deref(), &message);
            }
            Ok(None) => {
                if !connection.is_connected() {
                    break;
                }
            }
            Err(e) => {
                handler.on_error(&e);
                if !connection.is_connected() {
                    break;
                }
            }
        }
    }
    tracing::debug!("receive loop finished");
}

impl Drop for StreamingClient {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for handle in [self.listener.take(), self.keepalive.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for StreamingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingClient")
            .field("connection", &self.connection)
            .field("state", &self.state)
            .field("running", &self.is_running())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_client_is_idle() {
        let client = StreamingClient::new(StreamConnection::new());
        assert_eq!(client.state(), ClientState::Idle);
        assert!(!client.is_running());
        assert!(!client.is_finished());
    }

    #[tokio::test]
    async fn test_stop_on_idle_is_noop() {
        let mut client = StreamingClient::new(StreamConnection::new());
        client.stop().await.unwrap();
        assert_eq!(client.state(), ClientState::Idle);
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_client_stopped() {
        let mut client = StreamingClient::new(StreamConnection::with_url("not a url"));
        let result = client.start(Subscription::default()).await;
        assert!(matches!(result, Err(CoinbaseError::Url(_))));
        assert_eq!(client.state(), ClientState::Stopped);
        assert!(!client.is_running());

        let again = client.start(Subscription::default()).await;
        assert!(matches!(again, Err(CoinbaseError::InvalidState(_))));
    }
}
