//! Credential management for Coinbase Pro API authentication.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use crate::error::CoinbaseError;

/// Default environment variable holding the API key.
pub const ENV_API_KEY: &str = "CBPRO_API_KEY";
/// Default environment variable holding the base64 API secret.
pub const ENV_API_SECRET: &str = "CBPRO_API_SECRET";
/// Default environment variable holding the API passphrase.
pub const ENV_API_PASSPHRASE: &str = "CBPRO_API_PASSPHRASE";

/// API credentials: key, base64-encoded secret and passphrase.
#[derive(Clone)]
pub struct Credentials {
    /// The API key (public identifier)
    pub api_key: String,
    /// The API secret (base64, used for signing)
    api_secret: SecretString,
    /// The passphrase chosen when the key was created
    passphrase: SecretString,
}

impl Credentials {
    /// Create new credentials from an API key, secret and passphrase.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
            passphrase: SecretString::from(passphrase.into()),
        }
    }

    /// Get the API secret for signing.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    /// Get the passphrase sent alongside each signed request.
    pub fn expose_passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }

    /// Check that every part is present and the secret decodes as base64.
    pub fn validate(&self) -> Result<(), CoinbaseError> {
        if self.api_key.is_empty()
            || self.expose_secret().is_empty()
            || self.expose_passphrase().is_empty()
        {
            return Err(CoinbaseError::MissingCredentials);
        }
        BASE64
            .decode(self.expose_secret())
            .map_err(|_| CoinbaseError::Auth("API secret must be valid base64.".to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

/// Trait for providing API credentials.
///
/// Implement this trait to customize how credentials are retrieved,
/// for example from a secrets manager.
pub trait CredentialsProvider: Send + Sync {
    /// Get the credentials.
    fn get_credentials(&self) -> &Credentials;
}

/// Static credentials provider that holds credentials directly.
#[derive(Clone, Debug)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Create a new static credentials provider.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials::new(api_key, api_secret, passphrase),
        }
    }
}

impl From<Credentials> for StaticCredentials {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl CredentialsProvider for Arc<StaticCredentials> {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Credentials provider that reads from environment variables.
///
/// By default, reads `CBPRO_API_KEY`, `CBPRO_API_SECRET` and `CBPRO_API_PASSPHRASE`.
#[derive(Debug)]
pub struct EnvCredentials {
    credentials: Credentials,
}

impl EnvCredentials {
    /// Try to create credentials from the default environment variables.
    ///
    /// Returns `None` if any of them is not set.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_vars(ENV_API_KEY, ENV_API_SECRET, ENV_API_PASSPHRASE)
    }

    /// Try to create credentials from custom environment variable names.
    pub fn try_from_env_vars(key_var: &str, secret_var: &str, passphrase_var: &str) -> Option<Self> {
        let api_key = std::env::var(key_var).ok()?;
        let api_secret = std::env::var(secret_var).ok()?;
        let passphrase = std::env::var(passphrase_var).ok()?;

        Some(Self {
            credentials: Credentials::new(api_key, api_secret, passphrase),
        })
    }

    /// Create credentials from the default environment variables.
    ///
    /// Fails with [`CoinbaseError::MissingCredentials`] when a variable is unset.
    pub fn from_env() -> Result<Self, CoinbaseError> {
        Self::try_from_env().ok_or(CoinbaseError::MissingCredentials)
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}
