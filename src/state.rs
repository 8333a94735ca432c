/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: UserStore, auth: AuthService, route_scopes: 認可テーブル
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::api::v1::routes::RouteScopes;
use crate::repos::UserStore;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub auth: Arc<AuthService>,
    pub route_scopes: Arc<RouteScopes>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UserStore>,
        auth: Arc<AuthService>,
        route_scopes: Arc<RouteScopes>,
    ) -> Self {
        Self {
            store,
            auth,
            route_scopes,
        }
    }
}
