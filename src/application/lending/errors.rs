use crate::domain::{BorrowBookError, ReturnBookError};
use crate::ports::StoreError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
///
/// すべて利用者に返す想定内の結果。`code()`が安定した識別子を返す。
#[derive(Debug, Error)]
pub enum LendingError {
    /// Reader以外の役割による操作
    #[error("Access denied: only readers may borrow or return books")]
    PermissionDenied,

    /// 書籍または利用者が存在しない
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// 書籍IDの形式が不正
    #[error("Invalid book ID: {0}")]
    InvalidArgument(String),

    /// 在庫がない
    #[error("Book not available")]
    Unavailable,

    /// 貸出上限（5冊）に達している
    #[error("Borrowing limit reached (max 5 books)")]
    LimitExceeded,

    /// 貸出中でない書籍の返却（Strictポリシーのみ）
    #[error("Book is not on loan to this reader")]
    NotBorrowed,

    /// 楽観的排他制御の再試行回数を使い切った
    #[error("Concurrent update conflict, please retry")]
    Conflict,

    /// ストアの障害・タイムアウト
    #[error("Store unavailable")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LendingError {
    /// 安定したエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            LendingError::PermissionDenied => "PERMISSION_DENIED",
            LendingError::NotFound { .. } => "NOT_FOUND",
            LendingError::InvalidArgument(_) => "INVALID_ARGUMENT",
            LendingError::Unavailable => "UNAVAILABLE",
            LendingError::LimitExceeded => "LIMIT_EXCEEDED",
            LendingError::NotBorrowed => "NOT_BORROWED",
            LendingError::Conflict => "CONFLICT",
            LendingError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// 同じリクエストを再送すれば成功しうるか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LendingError::Conflict | LendingError::StoreUnavailable(_)
        )
    }
}

impl From<BorrowBookError> for LendingError {
    fn from(err: BorrowBookError) -> Self {
        match err {
            BorrowBookError::OutOfStock => LendingError::Unavailable,
            BorrowBookError::LimitExceeded => LendingError::LimitExceeded,
        }
    }
}

impl From<ReturnBookError> for LendingError {
    fn from(err: ReturnBookError) -> Self {
        match err {
            ReturnBookError::NotBorrowed => LendingError::NotBorrowed,
        }
    }
}

impl From<StoreError> for LendingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => LendingError::Conflict,
            other => LendingError::StoreUnavailable(Box::new(other)),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;
