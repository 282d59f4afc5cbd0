use crate::application::ServiceDependencies;
use crate::application::store_call::bounded;
use crate::domain::{
    self, Book, BookId, LibraryEvent, Role, User, UserId, commands::*,
};
use crate::ports::{LoanChange, StoreError};

use super::errors::{LendingError, Result};

/// 書籍を借りる
///
/// 前提条件（この順で判定し、それぞれ別のエラーになる）：
/// 1. トークン上の役割がReaderであること → `PermissionDenied`
/// 2. 書籍IDの形式が正しいこと → `InvalidArgument`（ストアは参照しない）
/// 3. 書籍が存在すること → `NotFound`
/// 4. 利用者が存在し、ストア上の役割もReaderであること → `NotFound` / `PermissionDenied`
/// 5. 在庫が1冊以上あること → `Unavailable`
/// 6. 貸出中の冊数が5冊未満であること → `LimitExceeded`
///
/// # 一貫性保証
///
/// 在庫の減算・書籍の`borrowed_by`への追加・利用者の`borrowed_books`への追加は
/// `LibraryLedger::commit_loan`で1つの原子的な変更として適用される。
/// 読み込み後に他の操作が同じ書籍または利用者を更新していた場合は
/// 読み込みからやり直す（最大`max_commit_attempts`回）。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<()> {
    ensure_reader(cmd.caller_role)?;
    let book_id = parse_book_id(&cmd.book_id)?;

    run_loan_transaction(deps, cmd.caller_id, book_id, "borrow", |user, book| {
        let (user, book, event) = domain::lending::borrow_book(user, book, cmd.requested_at)?;
        Ok((user, book, LibraryEvent::BookBorrowed(event)))
    })
    .await
}

/// 書籍を返す
///
/// 前提条件：
/// 1. トークン上の役割がReaderであること → `PermissionDenied`
/// 2. 書籍IDの形式が正しいこと → `InvalidArgument`
/// 3. 書籍が存在すること → `NotFound`
/// 4. 利用者が存在し、ストア上の役割もReaderであること
///
/// Lenientポリシーでは、貸出リストに載っていなくても在庫を1冊戻して成功する。
/// Strictポリシーでは`NotBorrowed`で拒否し、何も変更しない。
///
/// # 一貫性保証
///
/// `borrow_book()`と同じ。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<()> {
    ensure_reader(cmd.caller_role)?;
    let book_id = parse_book_id(&cmd.book_id)?;
    let policy = deps.settings.return_policy;

    run_loan_transaction(deps, cmd.caller_id, book_id, "return", |user, book| {
        let (user, book, event) =
            domain::lending::return_book(user, book, cmd.requested_at, policy)?;
        Ok((user, book, LibraryEvent::BookReturned(event)))
    })
    .await
}

fn ensure_reader(role: Role) -> Result<()> {
    match role {
        Role::Reader => Ok(()),
        Role::Author => Err(LendingError::PermissionDenied),
    }
}

fn parse_book_id(raw: &str) -> Result<BookId> {
    raw.parse::<BookId>()
        .map_err(|_| LendingError::InvalidArgument(raw.to_string()))
}

/// 読み込み → 純粋関数による状態遷移 → 台帳へのコミット、を衝突がなくなるまで繰り返す
async fn run_loan_transaction<F>(
    deps: &ServiceDependencies,
    user_id: UserId,
    book_id: BookId,
    operation: &'static str,
    transition: F,
) -> Result<()>
where
    F: Fn(&User, &Book) -> Result<(User, Book, LibraryEvent)>,
{
    let settings = deps.settings;

    for attempt in 1..=settings.max_commit_attempts {
        let (user, book) = load_participants(deps, user_id, book_id).await?;
        let (user, book, event) = transition(&user, &book)?;

        let change = LoanChange { user, book, event };
        let committed = bounded(
            settings.store_timeout,
            "ledger.commit_loan",
            deps.ledger.commit_loan(change),
        )
        .await;

        match committed {
            Ok(()) => {
                tracing::info!(%user_id, %book_id, operation, attempt, "loan change committed");
                return Ok(());
            }
            Err(StoreError::Conflict) => {
                tracing::warn!(
                    %user_id,
                    %book_id,
                    operation,
                    attempt,
                    "concurrent update detected, retrying"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    tracing::warn!(
        %user_id,
        %book_id,
        operation,
        attempts = settings.max_commit_attempts,
        "giving up after repeated conflicts"
    );
    Err(LendingError::Conflict)
}

/// 書籍と利用者を読み込み、利用者の役割をストア上の値で再確認する
async fn load_participants(
    deps: &ServiceDependencies,
    user_id: UserId,
    book_id: BookId,
) -> Result<(User, Book)> {
    let timeout = deps.settings.store_timeout;

    let book = bounded(
        timeout,
        "catalog.find_by_id",
        deps.catalog_store.find_by_id(book_id),
    )
    .await?
    .ok_or_else(|| LendingError::NotFound {
        entity: "Book",
        id: book_id.to_string(),
    })?;

    let user = bounded(
        timeout,
        "identity.find_by_id",
        deps.identity_store.find_by_id(user_id),
    )
    .await?
    .ok_or_else(|| LendingError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })?;

    if user.role != Role::Reader {
        tracing::warn!(
            %user_id,
            stored_role = user.role.as_str(),
            "token role no longer matches stored role"
        );
        return Err(LendingError::PermissionDenied);
    }

    Ok((user, book))
}
