//! HMAC-SHA256 signature generation for Coinbase Pro authentication.
//!
//! Authenticated requests carry a signature computed as:
//! ```text
//! base64(HMAC-SHA256(base64_decode(api_secret), timestamp + method + path + body))
//! ```
//!
//! The four fields are concatenated without separators. The same scheme signs
//! the WebSocket feed handshake against `GET /users/self/verify`.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Credentials;
use crate::error::CoinbaseError;

type HmacSha256 = Hmac<Sha256>;

/// Request header carrying the base64 signature.
pub const CB_ACCESS_SIGN: &str = "CB-ACCESS-SIGN";
/// Request header carrying the signing timestamp.
pub const CB_ACCESS_TIMESTAMP: &str = "CB-ACCESS-TIMESTAMP";
/// Request header carrying the API key.
pub const CB_ACCESS_KEY: &str = "CB-ACCESS-KEY";
/// Request header carrying the API passphrase.
pub const CB_ACCESS_PASSPHRASE: &str = "CB-ACCESS-PASSPHRASE";
/// Content type sent with every signed request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Method of the fixed path signed for feed authentication.
pub const VERIFY_METHOD: &str = "GET";
/// Fixed path signed for feed authentication.
pub const VERIFY_PATH: &str = "/users/self/verify";

/// Build the canonical message for a request.
///
/// `path` must include the query string exactly as sent.
pub fn signing_message(timestamp: &str, method: &str, path: &str, body: &str) -> String {
    let mut message =
        String::with_capacity(timestamp.len() + method.len() + path.len() + body.len());
    message.push_str(timestamp);
    message.push_str(method);
    message.push_str(path);
    message.push_str(body);
    message
}

/// Sign a request for Coinbase Pro's authenticated API.
///
/// # Arguments
///
/// * `credentials` - API credentials containing the secret
/// * `timestamp` - Decimal seconds since the epoch, read at send time
/// * `method` - Upper-case HTTP method (e.g., "GET")
/// * `path` - Request path including the query string (e.g., "/orders?status=open")
/// * `body` - JSON request body, or `""` when there is none
///
/// # Returns
///
/// Base64-encoded HMAC-SHA256 signature.
///
/// # Example
///
/// ```rust
/// use coinbase_pro_client::auth::{Credentials, sign_request};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("api_key", "YXBpX3NlY3JldA==", "passphrase");
/// let signature = sign_request(&credentials, "1617019200.000000", "GET", "/accounts", "")?;
/// assert_eq!(signature.len(), 44);
/// # Ok(())
/// # }
/// ```
pub fn sign_request(
    credentials: &Credentials,
    timestamp: &str,
    method: &str,
    path: &str,
    body: &str,
) -> Result<String, CoinbaseError> {
    let secret_decoded = BASE64
        .decode(credentials.expose_secret())
        .map_err(|_| CoinbaseError::Auth("API secret must be valid base64.".to_string()))?;

    let message = signing_message(timestamp, method, path, body);

    let mut hmac = HmacSha256::new_from_slice(&secret_decoded)
        .map_err(|e| CoinbaseError::Auth(format!("Invalid HMAC key: {e}")))?;
    hmac.update(message.as_bytes());
    let hmac_result = hmac.finalize().into_bytes();

    Ok(BASE64.encode(hmac_result))
}

/// The header bundle attached to a signed request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    /// Base64 HMAC-SHA256 signature.
    pub signature: String,
    /// Timestamp the signature was computed over.
    pub timestamp: String,
    /// API key.
    pub key: String,
    /// API passphrase.
    pub passphrase: String,
}

impl AuthHeaders {
    /// Sign a request and collect the headers to send with it.
    pub fn new(
        credentials: &Credentials,
        timestamp: &str,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<Self, CoinbaseError> {
        let signature = sign_request(credentials, timestamp, method, path, body)?;
        Ok(Self {
            signature,
            timestamp: timestamp.to_string(),
            key: credentials.api_key.clone(),
            passphrase: credentials.expose_passphrase().to_string(),
        })
    }

    /// Sign the fixed verification request used to authenticate the feed.
    pub fn verify(credentials: &Credentials, timestamp: &str) -> Result<Self, CoinbaseError> {
        Self::new(credentials, timestamp, VERIFY_METHOD, VERIFY_PATH, "")
    }

    /// Header name/value pairs, content type included.
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            (CB_ACCESS_SIGN, self.signature.as_str()),
            (CB_ACCESS_TIMESTAMP, self.timestamp.as_str()),
            (CB_ACCESS_KEY, self.key.as_str()),
            (CB_ACCESS_PASSPHRASE, self.passphrase.as_str()),
            ("Content-Type", CONTENT_TYPE_JSON),
        ]
    }
}

impl std::fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("timestamp", &self.timestamp)
            .field("key", &self.key)
            .field("signature", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}
