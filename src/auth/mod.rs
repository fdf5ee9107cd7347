//! Authentication module for Coinbase Pro API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Timestamp generation read at send time
//! - HMAC-SHA256 signature generation for authenticated requests and the feed handshake

mod credentials;
mod signature;
mod timestamp;

pub use credentials::{
    Credentials, CredentialsProvider, ENV_API_KEY, ENV_API_PASSPHRASE, ENV_API_SECRET,
    EnvCredentials, StaticCredentials,
};
pub use signature::{
    AuthHeaders, CB_ACCESS_KEY, CB_ACCESS_PASSPHRASE, CB_ACCESS_SIGN, CB_ACCESS_TIMESTAMP,
    CONTENT_TYPE_JSON, VERIFY_METHOD, VERIFY_PATH, sign_request, signing_message,
};
pub use timestamp::{FixedTimestamp, SystemClock, TimestampProvider};
