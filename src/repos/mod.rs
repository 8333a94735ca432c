/*
 * Responsibility
 * - 永続化層の公開インターフェース (UserStore trait + 実装)
 */
pub mod error;
pub mod user_store;

pub use user_store::{PgUserStore, UserRecord, UserStore};
