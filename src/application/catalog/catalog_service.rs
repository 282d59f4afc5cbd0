use crate::application::ServiceDependencies;
use crate::application::store_call::bounded;
use crate::domain::{BookId, LibraryEvent, Role, Stock, User, book, commands::PublishBook};
use crate::ports::{BookFilter, BookListing, Publication, StoreError};

use super::errors::CatalogError;

/// 書籍をカタログに追加する
///
/// 前提条件：
/// 1. トークン上の役割がAuthorであること
/// 2. タイトル・ジャンルが空でないこと
/// 3. 著者がストアに存在し、ストア上の役割もAuthorであること
///
/// 書籍の登録と著者の`books_written`への追加は`LibraryLedger::publish`で同時に適用される。
pub async fn publish_book(
    deps: &ServiceDependencies,
    cmd: PublishBook,
) -> Result<BookId, CatalogError> {
    if cmd.caller_role != Role::Author {
        return Err(CatalogError::PermissionDenied);
    }

    let title = cmd.title.trim().to_string();
    let genre = cmd.genre.trim().to_string();
    if title.is_empty() {
        return Err(CatalogError::Validation("Title is required".to_string()));
    }
    if genre.is_empty() {
        return Err(CatalogError::Validation("Genre is required".to_string()));
    }

    let settings = deps.settings;

    for attempt in 1..=settings.max_commit_attempts {
        let author = load_author(deps, &cmd).await?;

        let (new_book, event) = book::publish_book(
            author.id,
            title.clone(),
            genre.clone(),
            Stock::new(cmd.stock),
            cmd.requested_at,
        );
        let book_id = new_book.id;

        let mut books_written = author.books_written.clone();
        books_written.push(book_id);
        let author = User {
            books_written,
            ..author
        };

        let publication = Publication {
            author,
            book: new_book,
            event: LibraryEvent::BookPublished(event),
        };

        match bounded(
            settings.store_timeout,
            "ledger.publish",
            deps.ledger.publish(publication),
        )
        .await
        {
            Ok(()) => {
                tracing::info!(
                    author_id = %cmd.caller_id,
                    %book_id,
                    stock = cmd.stock,
                    "book published"
                );
                return Ok(book_id);
            }
            Err(StoreError::Conflict) => {
                tracing::warn!(
                    author_id = %cmd.caller_id,
                    attempt,
                    "author record changed, retrying"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(CatalogError::Conflict)
}

async fn load_author(deps: &ServiceDependencies, cmd: &PublishBook) -> Result<User, CatalogError> {
    let author = bounded(
        deps.settings.store_timeout,
        "identity.find_by_id",
        deps.identity_store.find_by_id(cmd.caller_id),
    )
    .await?
    .ok_or(CatalogError::AuthorNotFound)?;

    if author.role != Role::Author {
        return Err(CatalogError::PermissionDenied);
    }

    Ok(author)
}

/// 条件に合う書籍を一覧する
pub async fn list_books(
    deps: &ServiceDependencies,
    filter: &BookFilter,
) -> Result<Vec<BookListing>, CatalogError> {
    let listings = bounded(
        deps.settings.store_timeout,
        "catalog.find",
        deps.catalog_store.find(filter),
    )
    .await?;

    tracing::debug!(count = listings.len(), "books listed");
    Ok(listings)
}
