/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - トークンの検証・スコープ判定は middleware/services 側の責務
 * - ここは「型（契約）」として固定化する
 */

use crate::services::auth::scope::Scope;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `subject` はトークンの `sub` (IdP が発行した主体識別子)
/// - `scopes` はトークンが持つ capability label 一覧 (認可判定済み)
/// - `jti` は監査/相関用
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: String,
    pub scopes: Vec<Scope>,
    pub jti: Option<String>,
}

impl AuthCtx {
    pub fn new(subject: String, scopes: Vec<Scope>, jti: Option<String>) -> Self {
        Self {
            subject,
            scopes,
            jti,
        }
    }
}
