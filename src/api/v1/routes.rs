/*
 * Responsibility
 * - v1 の URL 構造と必要スコープを 1 箇所で宣言する (route table)
 * - 起動時に table → axum Router / RouteScopes を組み立てる (以後 immutable)
 */
use axum::{
    Router,
    http::Method,
    routing::{MethodRouter, delete, get, post},
};

use crate::api::v1::handlers::users::{
    create_user, delete_user, get_user, list_users, update_user,
};
use crate::services::auth::scope::Scope;
use crate::state::AppState;

pub const V1_PREFIX: &str = "/api/v1";

/// The one client scope granted across all five operations.
/// Read and write share it; see DESIGN.md before "fixing" this.
pub const USER_MANAGER_CLIENT: &str = "user-manager-client";

/// One static route binding: method + path pattern + required scope + handler.
///
/// Path patterns hold at most one `{user_id}` variable segment; axum compiles
/// the matchers when the table is folded into a `Router`.
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub required_scope: Scope,
    pub handler: MethodRouter<AppState>,
}

pub fn table(resource_server_id: &str) -> Vec<Route> {
    let manage_users = Scope::new(resource_server_id, USER_MANAGER_CLIENT);

    vec![
        Route {
            method: Method::POST,
            path: "/users",
            required_scope: manage_users.clone(),
            handler: post(create_user),
        },
        Route {
            method: Method::GET,
            path: "/users",
            required_scope: manage_users.clone(),
            handler: get(list_users),
        },
        Route {
            method: Method::GET,
            path: "/users/{user_id}",
            required_scope: manage_users.clone(),
            handler: get(get_user),
        },
        Route {
            method: Method::POST,
            path: "/users/{user_id}",
            required_scope: manage_users.clone(),
            handler: post(update_user),
        },
        Route {
            method: Method::DELETE,
            path: "/users/{user_id}",
            required_scope: manage_users,
            handler: delete(delete_user),
        },
    ]
}

/// Fold the table into a Router. Same-path entries merge method routers.
pub fn router(table: Vec<Route>) -> Router<AppState> {
    table
        .into_iter()
        .fold(Router::new(), |router, route| {
            router.route(route.path, route.handler)
        })
}

/// (method, matched path) → required scope, derived from the same table the
/// Router is built from. Lives in AppState for the access middleware.
#[derive(Debug, Clone)]
pub struct RouteScopes {
    routes: Vec<(Method, String, Scope)>,
}

impl RouteScopes {
    /// `prefix` must be the nest prefix, because `MatchedPath` reports the
    /// full nested pattern (e.g. `/api/v1/users/{user_id}`).
    pub fn new(prefix: &str, table: &[Route]) -> Self {
        let routes = table
            .iter()
            .map(|route| {
                (
                    route.method.clone(),
                    format!("{}{}", prefix, route.path),
                    route.required_scope.clone(),
                )
            })
            .collect();

        Self { routes }
    }

    pub fn required(&self, method: &Method, matched_path: &str) -> Option<&Scope> {
        self.routes
            .iter()
            .find(|(m, p, _)| m == method && p == matched_path)
            .map(|(_, _, scope)| scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_the_five_user_operations() {
        let table = table("svc");
        assert_eq!(table.len(), 5);

        let has = |method: Method, path: &str| {
            table.iter().any(|r| r.method == method && r.path == path)
        };
        assert!(has(Method::POST, "/users"));
        assert!(has(Method::GET, "/users"));
        assert!(has(Method::GET, "/users/{user_id}"));
        assert!(has(Method::POST, "/users/{user_id}"));
        assert!(has(Method::DELETE, "/users/{user_id}"));
    }

    #[test]
    fn every_route_requires_the_shared_client_scope() {
        let expected = Scope::new("svc", USER_MANAGER_CLIENT);
        for route in table("svc") {
            assert_eq!(route.required_scope, expected);
        }
    }

    #[test]
    fn scope_lookup_uses_method_and_nested_path() {
        let scopes = RouteScopes::new(V1_PREFIX, &table("svc"));
        let expected = Scope::new("svc", USER_MANAGER_CLIENT);

        assert_eq!(
            scopes.required(&Method::GET, "/api/v1/users/{user_id}"),
            Some(&expected)
        );
        assert_eq!(scopes.required(&Method::POST, "/api/v1/users"), Some(&expected));

        // Method must match exactly.
        assert_eq!(scopes.required(&Method::PUT, "/api/v1/users/{user_id}"), None);
        // And so must the pattern.
        assert_eq!(scopes.required(&Method::GET, "/users"), None);
        assert_eq!(scopes.required(&Method::GET, "/api/v1/posts"), None);
    }
}
