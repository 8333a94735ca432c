/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::access_jwt::{AccessJwtError, AuthService, ProviderTrust};
use crate::services::auth::keys::PemKeySource;

pub async fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AccessJwtError> {
    let keys = Arc::new(PemKeySource::new(
        &config.auth_jwt_public_key_pem,
        config.auth_jwt_key_id.clone(),
    ));

    let auth = AuthService::new(ProviderTrust {
        issuer: config.auth_issuer.clone(),
        keys,
        leeway_seconds: config.access_token_leeway_seconds,
    });

    // Parse the configured PEM now so a bad key fails startup, not requests.
    auth.warm_up().await?;

    Ok(Arc::new(auth))
}
