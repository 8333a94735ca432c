/*
 * Responsibility
 * - users の key-value 永続化 (get / put / delete / scan)
 * - PgPool を受け取り UserStore trait 経由で提供
 * - DB エラーは StoreError に変換して返す
 */
use std::collections::HashMap;
use std::{future::Future, pin::Pin};

use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::repos::error::StoreError;

/// A user record as the store sees it: an opaque attribute map under a unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub attributes: HashMap<String, String>,
}

/// Key-value contract for user persistence.
///
/// - `put` is an upsert; `delete` reports whether the key existed.
/// - Backend failures surface as `StoreError`; callers map them to 500.
pub trait UserStore: Send + Sync {
    fn get<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<UserRecord>, StoreError>> + Send + 'a>>;

    fn put<'a>(
        &'a self,
        user: &'a UserRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send + 'a>>;

    fn scan<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<UserRecord>, StoreError>> + Send + 'a>>;
}

/*
 * Schema:
 *   CREATE TABLE users (
 *       "userId"     TEXT PRIMARY KEY,
 *       "attributes" JSONB NOT NULL
 *   );
 */
#[derive(Debug, FromRow)]
struct UserRow {
    #[sqlx(rename = "userId")]
    user_id: String,
    attributes: Json<HashMap<String, String>>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            user_id: row.user_id,
            attributes: row.attributes.0,
        }
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl UserStore for PgUserStore {
    fn get<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<UserRecord>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query_as::<_, UserRow>(
                r#"
                SELECT "userId", "attributes"
                FROM users
                WHERE "userId" = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

            Ok(row.map(UserRecord::from))
        })
    }

    fn put<'a>(
        &'a self,
        user: &'a UserRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO users ("userId", "attributes")
                VALUES ($1, $2)
                ON CONFLICT ("userId") DO UPDATE SET "attributes" = EXCLUDED."attributes"
                "#,
            )
            .bind(&user.user_id)
            .bind(Json(&user.attributes))
            .execute(&self.db)
            .await?;

            Ok(())
        })
    }

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query(
                r#"
                DELETE FROM users
                WHERE "userId" = $1
                "#,
            )
            .bind(user_id)
            .execute(&self.db)
            .await?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn scan<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<UserRecord>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, UserRow>(
                r#"
                SELECT "userId", "attributes"
                FROM users
                ORDER BY "userId"
                "#,
            )
            .fetch_all(&self.db)
            .await?;

            Ok(rows.into_iter().map(UserRecord::from).collect())
        })
    }
}
