use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt, sync::Arc};

use crate::services::auth::keys::{KeyCache, KeyLookupError, KeySource};
use crate::services::auth::scope::Scope;

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    Keys(KeyLookupError),
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::Keys(e) => write!(f, "key resolution failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            Self::Keys(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

impl From<KeyLookupError> for AccessJwtError {
    fn from(e: KeyLookupError) -> Self {
        Self::Keys(e)
    }
}

/// Access token (JWT) claims.
///
/// `scope` is the provider's space-separated scope string; absent means the
/// token grants nothing (which authorization reports as Forbidden, not
/// Unauthorized).
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub jti: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,
}

/// 検証済み・アプリ側で使う型
///
/// - `iss/exp` の整合性は `verify` の中（jsonwebtoken + Validation）で保証される前提
/// - `scopes` は scope claim を分解したもの (認可判断は scope::authorize)
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub subject: String,
    pub scopes: Vec<Scope>,
    pub jti: Option<String>,
}

/// Trust anchor for the identity provider, fixed at service start.
///
/// Passed explicitly into `AuthService::new` — no ambient/global trust state.
pub struct ProviderTrust {
    pub issuer: String,
    pub keys: Arc<dyn KeySource>,
    pub leeway_seconds: u64,
}

/// EdDSA (Ed25519) access-token verifier.
pub struct AuthService {
    keys: KeyCache,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(trust: ProviderTrust) -> Self {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation.set_issuer(&[&trust.issuer]);
        validation.leeway = trust.leeway_seconds;

        Self {
            keys: KeyCache::new(trust.keys),
            validation,
        }
    }

    /// Validate the configured key material eagerly (startup fail-fast).
    pub async fn warm_up(&self) -> Result<(), AccessJwtError> {
        self.keys.refresh().await.map_err(KeyLookupError::from)?;
        Ok(())
    }

    // Verify and decode a JWT access token.
    //
    // Async because an unknown `kid` may trigger a key refresh.
    pub async fn verify(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let header = jsonwebtoken::decode_header(token)?;
        let key = self.keys.key_for(header.kid.as_deref()).await?;

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation, then convert claims into an
    /// application-friendly type.
    ///
    /// `jsonwebtoken::Validation` already checks:
    /// - signature
    /// - `exp` (with leeway)
    /// - `iss` (because we set it)
    ///
    /// This method additionally rejects a present-but-empty `sub` and parses
    /// the scope claim. Recommended entry-point for middleware.
    pub async fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify(token).await?;

        // Required (non-empty) checks. `exp` is `u64` so serde guarantees
        // presence, but we still defend against a meaningless value.
        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }

        Ok(VerifiedAccessToken {
            subject: claims.sub,
            scopes: Scope::parse_claim(claims.scope.as_deref().unwrap_or_default()),
            jti: claims.jti,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::keys::PemKeySource;
    use crate::tests::test_utils::{
        IDP_ISSUER, IDP_KEY_ID, IDP_PUBLIC_PEM, IDP_SECONDARY_PRIVATE_PEM, future_exp, issue_token,
        past_exp, sign_claims, sign_claims_with,
    };

    fn verifier() -> AuthService {
        AuthService::new(ProviderTrust {
            issuer: IDP_ISSUER.to_string(),
            keys: Arc::new(PemKeySource::new(IDP_PUBLIC_PEM, Some(IDP_KEY_ID.into()))),
            leeway_seconds: 0,
        })
    }

    #[tokio::test]
    async fn valid_token_yields_subject_and_scopes() {
        let token = issue_token("subject-1", future_exp(), Some("svc/user-manager-client"));

        let verified = verifier().verify_verified(&token).await.unwrap();
        assert_eq!(verified.subject, "subject-1");
        assert_eq!(verified.scopes, Scope::parse_claim("svc/user-manager-client"));
    }

    #[tokio::test]
    async fn missing_scope_claim_means_no_scopes() {
        let token = issue_token("subject-1", future_exp(), None);

        let verified = verifier().verify_verified(&token).await.unwrap();
        assert!(verified.scopes.is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let token = issue_token("subject-1", past_exp(), Some("svc/user-manager-client"));

        let err = verifier().verify_verified(&token).await.unwrap_err();
        assert!(matches!(err, AccessJwtError::Jwt(_)), "got: {err}");
    }

    #[tokio::test]
    async fn issuer_mismatch_is_rejected() {
        let token = sign_claims(
            &serde_json::json!({
                "iss": "https://rogue.example",
                "sub": "subject-1",
                "exp": future_exp(),
                "scope": "svc/user-manager-client",
            }),
            Some(IDP_KEY_ID),
        );

        let err = verifier().verify_verified(&token).await.unwrap_err();
        assert!(matches!(err, AccessJwtError::Jwt(_)), "got: {err}");
    }

    #[tokio::test]
    async fn token_signed_by_untrusted_key_is_rejected() {
        // Correct claims, but signed with a key the provider never published.
        let token = sign_claims_with(
            IDP_SECONDARY_PRIVATE_PEM,
            &serde_json::json!({
                "iss": IDP_ISSUER,
                "sub": "subject-1",
                "exp": future_exp(),
            }),
            Some(IDP_KEY_ID),
        );

        let err = verifier().verify_verified(&token).await.unwrap_err();
        assert!(matches!(err, AccessJwtError::Jwt(_)), "got: {err}");
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = sign_claims(
            &serde_json::json!({
                "iss": IDP_ISSUER,
                "sub": "subject-1",
                "exp": future_exp(),
            }),
            Some("some-other-key"),
        );

        let err = verifier().verify_verified(&token).await.unwrap_err();
        assert!(
            matches!(err, AccessJwtError::Keys(KeyLookupError::UnknownKey)),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn blank_subject_is_rejected() {
        let token = sign_claims(
            &serde_json::json!({
                "iss": IDP_ISSUER,
                "sub": "  ",
                "exp": future_exp(),
            }),
            Some(IDP_KEY_ID),
        );

        let err = verifier().verify_verified(&token).await.unwrap_err();
        assert!(matches!(err, AccessJwtError::EmptyClaim("sub")), "got: {err}");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let err = verifier().verify_verified("not.a.jwt").await.unwrap_err();
        assert!(matches!(err, AccessJwtError::Jwt(_)), "got: {err}");
    }
}
