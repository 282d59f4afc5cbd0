use thiserror::Error;

use super::{LoanListError, StockError};

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BorrowBookError {
    /// 在庫がない
    #[error("book is out of stock")]
    OutOfStock,
    /// 貸出上限（5冊）に達している
    #[error("borrowing limit reached")]
    LimitExceeded,
}

impl From<StockError> for BorrowBookError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Exhausted => BorrowBookError::OutOfStock,
        }
    }
}

impl From<LoanListError> for BorrowBookError {
    fn from(err: LoanListError) -> Self {
        match err {
            LoanListError::LimitExceeded => BorrowBookError::LimitExceeded,
        }
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnBookError {
    /// 貸出リストに載っていない書籍の返却（Strictポリシーのみ）
    #[error("book is not on loan to this reader")]
    NotBorrowed,
}
