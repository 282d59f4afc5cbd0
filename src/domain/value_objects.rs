use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 会員1人あたりの最大貸出冊数
pub const MAX_BORROW_LIMIT: usize = 5;

/// ID文字列のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed identifier: {0:?}")]
pub struct IdParseError(pub String);

/// 利用者ID - 会員管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for UserId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 書籍ID - カタログ管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 外部入力（リクエストボディ）からの書籍IDパース
///
/// ストアを参照する前に形式を検証するため、不正な文字列はここで弾く。
impl FromStr for BookId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| IdParseError(s.to_string()))
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 利用者の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 書籍を借りる・返す
    Reader,
    /// 書籍をカタログに追加する
    Author,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "Reader",
            Role::Author => "Author",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Reader" => Ok(Role::Reader),
            "Author" => Ok(Role::Author),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// 在庫エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// 貸出可能な在庫がない
    #[error("no copies left in stock")]
    Exhausted,
}

/// 在庫数
///
/// 不変条件：在庫は0以上。
/// 符号なし整数で保持し、0からの減算は`StockError::Exhausted`として型で拒否する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stock(u32);

impl Stock {
    pub fn new(copies: u32) -> Self {
        Self(copies)
    }

    /// 1冊貸し出す
    ///
    /// # エラー
    /// 在庫が0の場合は`StockError::Exhausted`を返す
    pub fn take_one(self) -> Result<Self, StockError> {
        self.0
            .checked_sub(1)
            .map(Self)
            .ok_or(StockError::Exhausted)
    }

    /// 1冊戻す
    pub fn put_back(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// 貸出リストのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanListError {
    /// 貸出上限（5冊）に達している
    #[error("borrowing limit of 5 books reached")]
    LimitExceeded,
}

/// 貸出中の書籍リスト
///
/// 不変条件：要素数は`MAX_BORROW_LIMIT`以下。
/// 同じ書籍IDの重複は許容する（同一タイトルを複数冊借りる場合）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanList(Vec<BookId>);

impl LoanList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 末尾に書籍を追加する
    ///
    /// # エラー
    /// 既に上限に達している場合は`LoanListError::LimitExceeded`を返す
    pub fn push(mut self, book_id: BookId) -> Result<Self, LoanListError> {
        if self.is_full() {
            return Err(LoanListError::LimitExceeded);
        }
        self.0.push(book_id);
        Ok(self)
    }

    /// 最初に見つかった1件だけを取り除く
    ///
    /// 戻り値の`bool`は実際に取り除いたかどうか。
    pub fn remove_one(mut self, book_id: BookId) -> (Self, bool) {
        match self.0.iter().position(|id| *id == book_id) {
            Some(index) => {
                self.0.remove(index);
                (self, true)
            }
            None => (self, false),
        }
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_BORROW_LIMIT
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[BookId] {
        &self.0
    }
}

impl TryFrom<Vec<BookId>> for LoanList {
    type Error = LoanListError;

    fn try_from(value: Vec<BookId>) -> Result<Self, Self::Error> {
        if value.len() > MAX_BORROW_LIMIT {
            return Err(LoanListError::LimitExceeded);
        }
        Ok(Self(value))
    }
}

/// レコードのバージョン（楽観的排他制御用）
///
/// 読み込んだ時点の値を保持し、ストアは一致した場合のみ書き込んで次の値に進める。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(i64);

impl Version {
    pub fn initial() -> Self {
        Self(0)
    }

    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}
