use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::Role;
use crate::ports::{BookFilter, BookListing};

/// 貸出・返却リクエスト（POST /reader/books/borrow, /reader/books/return）
///
/// `bookId`の形式チェックはアプリケーション層で行うため、任意のJSON値のまま受け取る。
/// 文字列以外・欠落・nullも`InvalidArgument`として扱われる。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookIdRequest {
    #[serde(default)]
    pub book_id: Option<Value>,
}

impl BookIdRequest {
    /// アプリケーション層に渡す未検証のID文字列
    pub fn into_raw_id(self) -> String {
        match self.book_id {
            Some(Value::String(raw)) => raw,
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// 会員登録リクエスト（POST /users/signup）
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// ログインリクエスト（POST /users/login）
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ログインレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// 書籍追加リクエスト（POST /books/create）
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub genre: String,
    pub stock: u32,
}

/// 書籍一覧のクエリパラメータ（GET /books）
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    /// タイトルの部分一致
    pub title: Option<String>,
    /// 著者名の部分一致
    pub author: Option<String>,
    /// ジャンルの完全一致
    pub genre: Option<String>,
}

impl From<ListBooksQuery> for BookFilter {
    fn from(query: ListBooksQuery) -> Self {
        // 空文字列は条件なしとして扱う
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        BookFilter {
            title: non_empty(query.title),
            author: non_empty(query.author),
            genre: non_empty(query.genre),
        }
    }
}

/// 書籍レスポンス（GET /books）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub stock: u32,
    pub author_id: Uuid,
    pub author_name: Option<String>,
    pub borrowed_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<BookListing> for BookResponse {
    fn from(listing: BookListing) -> Self {
        let book = listing.book;
        Self {
            id: book.id.value(),
            title: book.title,
            genre: book.genre,
            stock: book.stock.value(),
            author_id: book.author_id.value(),
            author_name: listing.author_name,
            borrowed_by: book.borrowed_by.iter().map(|id| id.value()).collect(),
            created_at: book.created_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 安定したエラーコード
    pub code: String,
    /// 人が読むためのメッセージ
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
