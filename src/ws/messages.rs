//! Feed subscription messages.

use serde::Serialize;

use crate::auth::AuthHeaders;

/// Feed channel names.
pub mod channels {
    /// Periodic heartbeats with the last trade id.
    pub const HEARTBEAT: &str = "heartbeat";
    /// Product and currency status.
    pub const STATUS: &str = "status";
    /// Real-time price updates on every match.
    pub const TICKER: &str = "ticker";
    /// Aggregated order book snapshots and updates.
    pub const LEVEL2: &str = "level2";
    /// Authenticated user's own order events.
    pub const USER: &str = "user";
    /// Every match.
    pub const MATCHES: &str = "matches";
    /// Every order lifecycle event.
    pub const FULL: &str = "full";
}

/// Product subscribed when none is given.
pub const DEFAULT_PRODUCT: &str = "BTC-USD";

/// A `subscribe` or `unsubscribe` message.
///
/// ```rust
/// use coinbase_pro_client::ws::messages::{Subscription, channels};
///
/// let msg = Subscription::new(["ETH-USD"], [channels::MATCHES]);
/// let json = serde_json::to_value(&msg).unwrap();
/// assert_eq!(json["type"], "subscribe");
/// assert_eq!(json["product_ids"][0], "ETH-USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Message type, `subscribe` or `unsubscribe`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Products to follow.
    pub product_ids: Vec<String>,
    /// Channels to follow.
    pub channels: Vec<String>,
    /// Signature fields for authenticated subscriptions.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub auth: Option<SubscriptionAuth>,
}

impl Subscription {
    /// Subscribe to `channels` for `products`.
    pub fn new<P, C>(products: P, channels: C) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            kind: "subscribe".to_string(),
            product_ids: products.into_iter().map(Into::into).collect(),
            channels: channels.into_iter().map(Into::into).collect(),
            auth: None,
        }
    }

    /// The matching `unsubscribe` message.
    pub fn unsubscribe(mut self) -> Self {
        self.kind = "unsubscribe".to_string();
        self.auth = None;
        self
    }

    /// Add a product.
    pub fn product(mut self, product_id: impl Into<String>) -> Self {
        self.product_ids.push(product_id.into());
        self
    }

    /// Add a channel.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channels.push(channel.into());
        self
    }

    /// Attach signature fields.
    pub fn with_auth(mut self, auth: SubscriptionAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Whether the message carries signature fields.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new([DEFAULT_PRODUCT], [channels::TICKER])
    }
}

/// Signature fields computed against `GET /users/self/verify`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionAuth {
    /// Base64 HMAC-SHA256 signature.
    pub signature: String,
    /// API key.
    pub key: String,
    /// API passphrase.
    pub passphrase: String,
    /// Timestamp the signature covers.
    pub timestamp: String,
}

impl From<AuthHeaders> for SubscriptionAuth {
    fn from(headers: AuthHeaders) -> Self {
        Self {
            signature: headers.signature,
            key: headers.key,
            passphrase: headers.passphrase,
            timestamp: headers.timestamp,
        }
    }
}

impl std::fmt::Debug for SubscriptionAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionAuth")
            .field("key", &self.key)
            .field("timestamp", &self.timestamp)
            .field("signature", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_subscription() {
        let json = serde_json::to_value(Subscription::default()).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "subscribe",
                "product_ids": ["BTC-USD"],
                "channels": ["ticker"]
            })
        );
    }

    #[test]
    fn test_builder_methods() {
        let msg = Subscription::new(["BTC-USD"], [channels::LEVEL2])
            .product("ETH-USD")
            .channel(channels::HEARTBEAT);
        assert_eq!(msg.product_ids, vec!["BTC-USD", "ETH-USD"]);
        assert_eq!(msg.channels, vec!["level2", "heartbeat"]);
        assert!(!msg.is_authenticated());
    }

    #[test]
    fn test_authenticated_fields_are_flattened() {
        let auth = SubscriptionAuth {
            signature: "sig".into(),
            key: "key".into(),
            passphrase: "pass".into(),
            timestamp: "1600000000.000000".into(),
        };
        let json = serde_json::to_value(Subscription::default().with_auth(auth)).unwrap();
        assert_eq!(json["signature"], "sig");
        assert_eq!(json["key"], "key");
        assert_eq!(json["passphrase"], "pass");
        assert_eq!(json["timestamp"], "1600000000.000000");
        assert!(json.get("auth").is_none());
    }

    #[test]
    fn test_unsubscribe_drops_auth() {
        let auth = SubscriptionAuth {
            signature: "sig".into(),
            key: "key".into(),
            passphrase: "pass".into(),
            timestamp: "1".into(),
        };
        let msg = Subscription::default().with_auth(auth).unsubscribe();
        assert_eq!(msg.kind, "unsubscribe");
        assert!(msg.auth.is_none());
    }
}
