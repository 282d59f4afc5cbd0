use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookBorrowed, BookReturned, BorrowBookError, ReturnBookError, User, UserId};

/// 返却ポリシー
///
/// 貸出リストに載っていない書籍の返却をどう扱うか。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnPolicy {
    /// 返却は常に成功し在庫を1冊戻す。リストからの削除は該当がなければ何もしない。
    #[default]
    Lenient,
    /// 貸出リストに載っていない場合は`ReturnBookError::NotBorrowed`で拒否する
    Strict,
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール（この順で判定）：
/// - 在庫が1冊以上あること
/// - 利用者の貸出中冊数が上限（5冊）未満であること
///
/// 成功時は在庫を1減らし、書籍の`borrowed_by`と利用者の`borrowed_books`に
/// 互いのIDを追加した新しいレコードを返す。レコードの`version`は読み込み時の値のまま。
///
/// 副作用なし。
pub fn borrow_book(
    user: &User,
    book: &Book,
    borrowed_at: DateTime<Utc>,
) -> Result<(User, Book, BookBorrowed), BorrowBookError> {
    let stock = book.stock.take_one()?;
    let borrowed_books = user.borrowed_books.clone().push(book.id)?;

    let mut borrowed_by = book.borrowed_by.clone();
    borrowed_by.push(user.id);

    let new_user = User {
        borrowed_books,
        ..user.clone()
    };
    let new_book = Book {
        stock,
        borrowed_by,
        ..book.clone()
    };

    let event = BookBorrowed {
        user_id: user.id,
        book_id: book.id,
        borrowed_at,
        remaining_stock: stock.value(),
    };

    Ok((new_user, new_book, event))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 在庫を1冊戻す
/// - 書籍の`borrowed_by`から利用者IDを1件、利用者の`borrowed_books`から書籍IDを1件取り除く
/// - Lenientでは該当がなくても成功する（削除は何もしない）
///
/// 副作用なし。
pub fn return_book(
    user: &User,
    book: &Book,
    returned_at: DateTime<Utc>,
    policy: ReturnPolicy,
) -> Result<(User, Book, BookReturned), ReturnBookError> {
    let (borrowed_books, was_on_loan) = user.borrowed_books.clone().remove_one(book.id);

    if !was_on_loan && policy == ReturnPolicy::Strict {
        return Err(ReturnBookError::NotBorrowed);
    }

    let borrowed_by = remove_first(&book.borrowed_by, user.id);
    let stock = book.stock.put_back();

    let new_user = User {
        borrowed_books,
        ..user.clone()
    };
    let new_book = Book {
        stock,
        borrowed_by,
        ..book.clone()
    };

    let event = BookReturned {
        user_id: user.id,
        book_id: book.id,
        returned_at,
        was_on_loan,
        remaining_stock: stock.value(),
    };

    Ok((new_user, new_book, event))
}

fn remove_first(ids: &[UserId], target: UserId) -> Vec<UserId> {
    let mut ids = ids.to_vec();
    if let Some(index) = ids.iter().position(|id| *id == target) {
        ids.remove(index);
    }
    ids
}
