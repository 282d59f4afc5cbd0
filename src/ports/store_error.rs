use thiserror::Error;

/// ストアポート共通のエラー
///
/// `Conflict`はアプリケーション層で再試行の対象になる。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 読み込み後にレコードが他の操作で更新されていた
    #[error("record was modified concurrently")]
    Conflict,

    /// 保存しようとしたレコードが制約に違反している（一意制約など）
    #[error("validation failed: {0}")]
    Validation(String),

    /// ストアへの接続失敗・タイムアウト・データ破損
    #[error("store unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, StoreError>;
