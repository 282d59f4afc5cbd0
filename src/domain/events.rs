use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, UserId};

/// イベント：書籍が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub user_id: UserId,
    pub book_id: BookId,
    pub borrowed_at: DateTime<Utc>,
    pub remaining_stock: u32,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub user_id: UserId,
    pub book_id: BookId,
    pub returned_at: DateTime<Utc>,
    /// 返却時に実際に貸出リストに載っていたか
    pub was_on_loan: bool,
    pub remaining_stock: u32,
}

/// イベント：書籍が出版された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPublished {
    pub book_id: BookId,
    pub author_id: UserId,
    pub initial_stock: u32,
    pub published_at: DateTime<Utc>,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryEvent {
    BookBorrowed(BookBorrowed),
    BookReturned(BookReturned),
    BookPublished(BookPublished),
}

impl LibraryEvent {
    /// 対象の書籍ID
    pub fn book_id(&self) -> BookId {
        match self {
            LibraryEvent::BookBorrowed(e) => e.book_id,
            LibraryEvent::BookReturned(e) => e.book_id,
            LibraryEvent::BookPublished(e) => e.book_id,
        }
    }

    /// 操作した利用者のID
    pub fn user_id(&self) -> UserId {
        match self {
            LibraryEvent::BookBorrowed(e) => e.user_id,
            LibraryEvent::BookReturned(e) => e.user_id,
            LibraryEvent::BookPublished(e) => e.author_id,
        }
    }
}
