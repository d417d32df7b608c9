//! Credential storage using the OS keyring.
//!
//! Listing API keys can live in the keyring instead of the environment. Entries
//! are stored under the service name "pace" with keys of the form
//! `<provider>/<profile>/<kind>`.

use thiserror::Error;

/// Service name used for all pace credentials in the OS keyring.
const SERVICE_NAME: &str = "pace";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("keyring access denied: {0}")]
    AccessDenied(String),

    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("keyring error: {0}")]
    Other(String),
}

impl From<keyring::Error> for SecretsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretsError::NotFound {
                key: "unknown".into(),
            },
            keyring::Error::NoStorageAccess(e) => SecretsError::AccessDenied(e.to_string()),
            keyring::Error::PlatformFailure(e) => SecretsError::Unavailable(e.to_string()),
            other => SecretsError::Other(other.to_string()),
        }
    }
}

pub type SecretsResult<T> = Result<T, SecretsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    ApiKey,
}

impl SecretKind {
    fn as_str(&self) -> &'static str {
        match self {
            SecretKind::ApiKey => "api_key",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.into(),
        }
    }

    fn build_key(provider: &str, profile: Option<&str>, kind: SecretKind) -> String {
        match profile {
            Some(p) => format!("{}/{}/{}", provider, p, kind.as_str()),
            None => format!("{}/{}", provider, kind.as_str()),
        }
    }

    pub fn store(
        &self,
        provider: &str,
        profile: Option<&str>,
        kind: SecretKind,
        secret: &str,
    ) -> SecretsResult<()> {
        let key = Self::build_key(provider, profile, kind);
        let entry = keyring::Entry::new(&self.service, &key)?;
        entry.set_password(secret)?;
        tracing::debug!(provider = provider, kind = ?kind, "stored credential in keyring");
        Ok(())
    }

    /// Returns `SecretsError::NotFound` if the secret doesn't exist.
    pub fn get(
        &self,
        provider: &str,
        profile: Option<&str>,
        kind: SecretKind,
    ) -> SecretsResult<String> {
        let key = Self::build_key(provider, profile, kind);
        let entry = keyring::Entry::new(&self.service, &key)?;
        match entry.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(SecretsError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }

    /// Succeeds even if the secret didn't exist.
    pub fn delete(
        &self,
        provider: &str,
        profile: Option<&str>,
        kind: SecretKind,
    ) -> SecretsResult<()> {
        let key = Self::build_key(provider, profile, kind);
        let entry = keyring::Entry::new(&self.service, &key)?;
        match entry.delete_credential() {
            Ok(()) => {
                tracing::debug!(provider = provider, kind = ?kind, "deleted credential from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store_api_key(&self, provider: &str, api_key: &str) -> SecretsResult<()> {
        self.store(provider, None, SecretKind::ApiKey, api_key)
    }

    pub fn get_api_key(&self, provider: &str) -> SecretsResult<String> {
        self.get(provider, None, SecretKind::ApiKey)
    }

    pub fn delete_api_key(&self, provider: &str) -> SecretsResult<()> {
        self.delete(provider, None, SecretKind::ApiKey)
    }

    /// Resolve an API key from the environment variable `env_var`, falling back
    /// to the keyring entry for `provider`.
    pub fn resolve_api_key(&self, provider: &str, env_var: &str) -> SecretsResult<String> {
        resolve_with(std::env::var(env_var).ok(), || self.get_api_key(provider))
    }
}

fn resolve_with<F>(from_env: Option<String>, from_keyring: F) -> SecretsResult<String>
where
    F: FnOnce() -> SecretsResult<String>,
{
    match from_env {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => from_keyring(),
    }
}
