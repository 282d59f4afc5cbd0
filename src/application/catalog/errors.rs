use crate::ports::StoreError;
use thiserror::Error;

/// カタログ管理のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Author以外による出版
    #[error("Access denied: only authors may add books")]
    PermissionDenied,

    /// 入力値が不正
    #[error("{0}")]
    Validation(String),

    /// トークンの利用者がストアに存在しない
    #[error("Author not found")]
    AuthorNotFound,

    /// 楽観的排他制御の再試行回数を使い切った
    #[error("Concurrent update conflict, please retry")]
    Conflict,

    /// ストアのエラー
    #[error("Store error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => CatalogError::Conflict,
            other => CatalogError::Store(other),
        }
    }
}
