//! Hooks invoked by the streaming client.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::CoinbaseError;

/// Destination for feed messages, such as a database collection.
pub trait RecordSink: Send + Sync {
    /// Store one record.
    fn insert(&self, record: Value);
}

impl RecordSink for mpsc::UnboundedSender<Value> {
    fn insert(&self, record: Value) {
        if self.send(record).is_err() {
            tracing::debug!("record sink receiver dropped");
        }
    }
}

/// Callbacks fired over a [`StreamingClient`](crate::ws::StreamingClient)'s lifetime.
///
/// Every method has a default that logs through `tracing`; override only what
/// you need. `on_message` runs on the receive task and should not block for long.
///
/// ```rust
/// use coinbase_pro_client::ws::{EventHandler, RecordSink};
/// use serde_json::Value;
///
/// struct PrintTicks;
///
/// impl EventHandler for PrintTicks {
///     fn on_message(&self, _sink: Option<&dyn RecordSink>, message: &Value) {
///         if message["type"] == "ticker" {
///             println!("{} {}", message["product_id"], message["price"]);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Fired when `start` is called, before connecting.
    fn on_start(&self) {
        tracing::info!("feed client starting");
    }

    /// Fired once the receive loop is running.
    fn on_run(&self) {
        tracing::info!("feed client running");
    }

    /// Fired when `stop` has joined the receive loop.
    fn on_stop(&self) {
        tracing::info!("feed client stopped");
    }

    /// Fired for errors seen by the receive or keepalive loops. Advisory only.
    fn on_error(&self, error: &CoinbaseError) {
        tracing::warn!(%error, "feed error");
    }

    /// Fired for every inbound message.
    ///
    /// The default logs the message and forwards it to `sink` when present.
    fn on_message(&self, sink: Option<&dyn RecordSink>, message: &Value) {
        tracing::debug!(%message, "feed message");
        if let Some(sink) = sink {
            sink.insert(message.clone());
        }
    }
}

/// The default handler: logs every hook and forwards messages to the sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_on_message_forwards_to_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let message = json!({"type": "ticker", "price": "100.00"});

        LoggingHandler.on_message(Some(&tx as &dyn RecordSink), &message);

        assert_eq!(rx.try_recv().unwrap(), message);
    }

    #[test]
    fn test_default_on_message_without_sink() {
        LoggingHandler.on_message(None, &json!({"type": "heartbeat"}));
    }

    #[test]
    fn test_sink_tolerates_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        drop(rx);
        tx.insert(json!({}));
    }
}
