use crate::ports::StoreError;
use thiserror::Error;

/// 会員登録・ログインのエラー
#[derive(Debug, Error)]
pub enum AccountError {
    /// 入力値が不正
    #[error("{0}")]
    Validation(String),

    /// メールアドレスが登録済み
    #[error("Email already registered")]
    EmailTaken,

    /// メールアドレスが未登録
    #[error("Email not found")]
    EmailNotFound,

    /// パスワードが一致しない
    #[error("Invalid password")]
    InvalidPassword,

    /// パスワードのハッシュ化・トークン発行の失敗
    #[error("Credential processing failed: {0}")]
    Credential(String),

    /// ストアのエラー
    #[error("Store error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        AccountError::Store(err)
    }
}
