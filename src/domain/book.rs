use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BookPublished, Stock, UserId, Version};

/// Book集約 - カタログ上の1タイトルと、その在庫
///
/// `stock`と`borrowed_by`は貸出サービスのみが変更する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub genre: String,
    pub stock: Stock,
    pub author_id: UserId,
    pub borrowed_by: Vec<UserId>,
    pub version: Version,
    pub created_at: DateTime<Utc>,
}

/// 純粋関数：書籍を出版する
///
/// 新しいBookと、著者の`books_written`に追加すべきIDを含むイベントを返す。
pub fn publish_book(
    author_id: UserId,
    title: String,
    genre: String,
    stock: Stock,
    published_at: DateTime<Utc>,
) -> (Book, BookPublished) {
    let book = Book {
        id: BookId::new(),
        title,
        genre,
        stock,
        author_id,
        borrowed_by: Vec::new(),
        version: Version::initial(),
        created_at: published_at,
    };

    let event = BookPublished {
        book_id: book.id,
        author_id,
        initial_stock: stock.value(),
        published_at,
    };

    (book, event)
}
