//! Identity-provider key material: source trait + process-wide cache.
//!
//! The provider's public signing keys are loaded once at startup and cached.
//! A token whose `kid` is not in the cache triggers exactly one refresh from
//! the source before verification fails; routine requests never touch the
//! source.

use std::{future::Future, pin::Pin, sync::Arc};

use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

/// One public verification key as published by the provider.
#[derive(Clone)]
pub struct ProviderKey {
    pub kid: Option<String>,
    pub key: DecodingKey,
}

impl std::fmt::Debug for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("ProviderKey").field("kid", &self.kid).finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    #[error("invalid provider public key: {0}")]
    InvalidKey(String),

    #[error("key material unavailable: {0}")]
    Unavailable(String),
}

/// Where the provider's current signing keys come from.
///
/// `PemKeySource` serves the statically configured key; a JWKS-style remote
/// source plugs in behind the same trait.
pub trait KeySource: Send + Sync {
    fn load(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ProviderKey>, KeySourceError>> + Send + '_>>;
}

/// Key source backed by the configured public key PEM (Ed25519 SPKI).
pub struct PemKeySource {
    pem: String,
    kid: Option<String>,
}

impl PemKeySource {
    pub fn new(pem: impl Into<String>, kid: Option<String>) -> Self {
        Self {
            pem: pem.into(),
            kid,
        }
    }
}

impl KeySource for PemKeySource {
    fn load(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ProviderKey>, KeySourceError>> + Send + '_>> {
        Box::pin(async move {
            let key = DecodingKey::from_ed_pem(self.pem.as_bytes())
                .map_err(|e| KeySourceError::InvalidKey(e.to_string()))?;

            Ok(vec![ProviderKey {
                kid: self.kid.clone(),
                key,
            }])
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyLookupError {
    #[error("no provider key matches the token")]
    UnknownKey,

    #[error(transparent)]
    Source(#[from] KeySourceError),
}

/// Process-wide cache of the provider key set.
///
/// Concurrent reads, exclusive infrequent writes on refresh.
pub struct KeyCache {
    source: Arc<dyn KeySource>,
    keys: RwLock<Vec<ProviderKey>>,
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache").finish_non_exhaustive()
    }
}

impl KeyCache {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            keys: RwLock::new(Vec::new()),
        }
    }

    /// Resolve the verification key for a token's `kid`.
    ///
    /// Unknown kid → one refresh from the source, then a second lookup;
    /// still unknown fails the verification (fail closed).
    pub async fn key_for(&self, kid: Option<&str>) -> Result<DecodingKey, KeyLookupError> {
        if let Some(key) = self.lookup(kid).await {
            return Ok(key);
        }

        self.refresh().await?;

        self.lookup(kid).await.ok_or(KeyLookupError::UnknownKey)
    }

    /// Replace the cached key set with whatever the source currently serves.
    pub async fn refresh(&self) -> Result<(), KeySourceError> {
        let fresh = self.source.load().await?;

        let mut keys = self.keys.write().await;
        *keys = fresh;

        Ok(())
    }

    async fn lookup(&self, kid: Option<&str>) -> Option<DecodingKey> {
        let keys = self.keys.read().await;

        match kid {
            Some(kid) => keys
                .iter()
                .find(|k| k.kid.as_deref() == Some(kid))
                .map(|k| k.key.clone()),
            // kid-less token: accept a kid-less key, or the set's only key.
            None => keys
                .iter()
                .find(|k| k.kid.is_none())
                .or_else(|| match keys.as_slice() {
                    [only] => Some(only),
                    _ => None,
                })
                .map(|k| k.key.clone()),
        }
    }
}
