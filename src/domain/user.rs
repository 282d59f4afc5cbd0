use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanList, Role, UserId, Version};

/// User集約 - 登録済みの利用者（ReaderまたはAuthor）
///
/// `borrowed_books`は貸出サービスのみが変更する。
/// `password_hash`はこのコアにとって不透明な値。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    // 識別子
    pub id: UserId,

    // 属性
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,

    // 他の集約への参照（IDのみ）
    pub borrowed_books: LoanList,
    pub books_written: Vec<BookId>,

    // 楽観的排他制御・監査情報
    pub version: Version,
    pub created_at: DateTime<Utc>,
}

/// 純粋関数：利用者を登録する
///
/// 貸出リスト・著作リストは空で作成される。
pub fn register_user(
    name: String,
    email: String,
    password_hash: String,
    role: Role,
    registered_at: DateTime<Utc>,
) -> User {
    User {
        id: UserId::new(),
        name,
        email,
        password_hash,
        role,
        borrowed_books: LoanList::new(),
        books_written: Vec::new(),
        version: Version::initial(),
        created_at: registered_at,
    }
}
