//! access token（JWT）検証 → スコープ認可 → AuthCtx を extensions に入れる
//!
//! Dispatch の順序は固定:
//! 1. route match — `route_layer` なので未登録パスはここに来ず 404 になる
//! 2. Bearer token 検証 (失敗は 401, handler は呼ばれない)
//! 3. matched route の必要スコープを RouteScopes から引いて判定 (失敗は 403)
//! 4. AuthCtx を詰めて handler へ

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::scope;
use crate::state::AppState;

/// v1 の route 群に認証・認可を掛ける。
///
/// `route_layer` なのでマッチしなかったリクエストには走らない
/// (存在しないパスへの 401 ではなく 404 を返すため)。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    matched_path: MatchedPath,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

    // 署名・iss・exp・鍵解決は AuthService 側で実施 (鍵の refresh 込み)
    let verified = match state.auth.verify_verified(token).await {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(
                error = ?err,
                "access token verification failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    // A matched route missing from the scope table is a wiring bug; fail closed.
    let Some(required) = state
        .route_scopes
        .required(req.method(), matched_path.as_str())
    else {
        tracing::error!(path = matched_path.as_str(), "route has no scope binding");
        return Err(AppError::Internal);
    };

    if let Err(err) = scope::authorize(&verified.scopes, required) {
        tracing::warn!(
            subject = %verified.subject,
            error = %err,
            "insufficient scope"
        );
        return Err(AppError::Forbidden);
    }

    let auth_ctx = AuthCtx::new(verified.subject, verified.scopes, verified.jti);

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
