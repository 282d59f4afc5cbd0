use crate::domain::{User, UserId};
use async_trait::async_trait;

use super::store_error::Result;

/// 利用者ストアポート
///
/// 利用者レコードの正本。貸出サービスは`find_by_id`で読み込み、
/// 貸出リストの更新は`LibraryLedger`経由で書籍と同時に行う。
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// IDで利用者を取得する
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    /// メールアドレスで利用者を取得する
    ///
    /// ログイン時の照合に使用される。
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// 新規利用者を保存する
    ///
    /// メールアドレスが既に登録済みの場合は`StoreError::Validation`を返す。
    async fn insert(&self, user: User) -> Result<()>;

    /// 既存の利用者レコード全体を保存する
    ///
    /// `user.version`が保存済みの値と一致した場合のみ書き込み、バージョンを1進める。
    /// 一致しない場合は`StoreError::Conflict`を返す。
    async fn save(&self, user: User) -> Result<()>;
}
