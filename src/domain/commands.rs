use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// コマンド：書籍を借りる
///
/// `book_id`はリクエストから受け取った未検証の文字列。
/// 形式チェックはストア参照より前にアプリケーション層で行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub caller_id: UserId,
    pub caller_role: Role,
    pub book_id: String,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍を返す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub caller_id: UserId,
    pub caller_role: Role,
    pub book_id: String,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍をカタログに追加する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishBook {
    pub caller_id: UserId,
    pub caller_role: Role,
    pub title: String,
    pub genre: String,
    pub stock: u32,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：利用者を登録する
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}
