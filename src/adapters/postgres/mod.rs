pub mod catalog_store;
pub mod identity_store;
pub mod ledger;
mod rows;

use crate::ports::StoreError;

// パブリックに型を再エクスポート
pub use catalog_store::CatalogStore as PostgresCatalogStore;
pub use identity_store::IdentityStore as PostgresIdentityStore;
pub use ledger::Ledger as PostgresLedger;

/// 一意制約・CHECK制約違反は入力の問題、それ以外は接続・実行の障害として扱う
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() || db.is_check_violation() {
                return StoreError::Validation(db.message().to_string());
            }
        }
        StoreError::Unavailable(Box::new(err))
    }
}
