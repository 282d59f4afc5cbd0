use crate::domain::{Book, BookId};
use async_trait::async_trait;

use super::store_error::Result;

/// 書籍一覧の絞り込み条件
///
/// すべて任意。指定された条件はAND結合される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// タイトルの部分一致（大文字小文字を区別しない）
    pub title: Option<String>,
    /// 著者名の部分一致（大文字小文字を区別しない）
    pub author: Option<String>,
    /// ジャンルの完全一致
    pub genre: Option<String>,
}

impl BookFilter {
    /// メモリ上の書籍がこの条件に合うか判定する
    pub fn matches(&self, book: &Book, author_name: Option<&str>) -> bool {
        let title_ok = self
            .title
            .as_deref()
            .is_none_or(|t| contains_ignore_case(&book.title, t));
        let author_ok = self.author.as_deref().is_none_or(|a| {
            author_name.is_some_and(|name| contains_ignore_case(name, a))
        });
        let genre_ok = self.genre.as_deref().is_none_or(|g| book.genre == g);

        title_ok && author_ok && genre_ok
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 書籍一覧の1行（著者名を展開済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListing {
    pub book: Book,
    pub author_name: Option<String>,
}

/// カタログストアポート
///
/// 書籍レコードの正本。在庫と`borrowed_by`の更新は`LibraryLedger`経由で行う。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// IDで書籍を取得する
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 既存の書籍レコード全体を保存する
    ///
    /// `book.version`が保存済みの値と一致した場合のみ書き込み、バージョンを1進める。
    async fn save(&self, book: Book) -> Result<()>;

    /// 条件に合う書籍を一覧する
    ///
    /// 貸出の整合性には関与しない。タイトル順で返す。
    async fn find(&self, filter: &BookFilter) -> Result<Vec<BookListing>>;
}
