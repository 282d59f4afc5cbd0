use crate::domain::{Book, LibraryEvent, User};
use async_trait::async_trait;

use super::store_error::Result;

/// 貸出・返却による2レコードの変更
///
/// `user`と`book`は変更後の状態で、`version`は読み込んだ時点の値を保持している。
#[derive(Debug, Clone)]
pub struct LoanChange {
    pub user: User,
    pub book: Book,
    pub event: LibraryEvent,
}

/// 出版による変更（新しい書籍と、`books_written`を更新した著者）
#[derive(Debug, Clone)]
pub struct Publication {
    pub author: User,
    pub book: Book,
    pub event: LibraryEvent,
}

/// 台帳ポート
///
/// 利用者と書籍にまたがる変更を1つの原子的な単位として適用する。
/// 途中までの変更が他の操作から見えることはない。
#[async_trait]
pub trait LibraryLedger: Send + Sync {
    /// 貸出・返却の変更をコミットする
    ///
    /// 利用者と書籍の両方のバージョンが読み込み時から変わっていない場合のみ、
    /// 両レコードを書き込み（バージョンを1進め）、イベントを監査ログに追記する。
    /// どちらかが変わっていれば何も書き込まず`StoreError::Conflict`を返す。
    async fn commit_loan(&self, change: LoanChange) -> Result<()>;

    /// 新しい書籍を登録し、著者の`books_written`を同時に更新する
    ///
    /// 著者のバージョンが変わっていれば`StoreError::Conflict`を返す。
    async fn publish(&self, publication: Publication) -> Result<()>;
}
