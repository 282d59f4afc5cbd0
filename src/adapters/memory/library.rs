use crate::domain::{Book, BookId, LibraryEvent, User, UserId, Version};
use crate::ports::{
    BookFilter, BookListing, CatalogStore, IdentityStore, LibraryLedger, LoanChange,
    Publication, Result, StoreError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct LibraryState {
    users: HashMap<UserId, User>,
    books: HashMap<BookId, Book>,
    events: Vec<LibraryEvent>,
}

/// 利用者・書籍・台帳のインメモリ実装
///
/// 3つのポートを1つの状態で実装する。台帳の変更は1つの書き込みロックの中で
/// awaitを挟まずに適用するため、途中の状態が他の操作から見えることはない。
/// `DATABASE_URL`未設定時の実行とテストで使用する。
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    state: RwLock<LibraryState>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用に利用者を直接登録
    pub async fn seed_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// テスト用に書籍を直接登録
    pub async fn seed_book(&self, book: Book) {
        self.state.write().await.books.insert(book.id, book);
    }

    /// 台帳に記録されたイベント（記録順）
    pub async fn events(&self) -> Vec<LibraryEvent> {
        self.state.read().await.events.clone()
    }
}

/// 保存済みレコードのバージョンが読み込み時の値と一致するか確認する
fn check_version<T>(
    stored: Option<&T>,
    expected: Version,
    version_of: impl Fn(&T) -> Version,
) -> Result<()> {
    match stored {
        Some(record) if version_of(record) == expected => Ok(()),
        Some(_) => Err(StoreError::Conflict),
        None => Err(StoreError::Validation("record does not exist".to_string())),
    }
}

#[async_trait]
impl IdentityStore for InMemoryLibrary {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Validation(format!(
                "email already registered: {}",
                user.email
            )));
        }
        state.users.insert(user.id, user);
        Ok(())
    }

    async fn save(&self, user: User) -> Result<()> {
        let mut state = self.state.write().await;
        check_version(state.users.get(&user.id), user.version, |u| u.version)?;

        let user = User {
            version: user.version.next(),
            ..user
        };
        state.users.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryLibrary {
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.state.read().await.books.get(&book_id).cloned())
    }

    async fn save(&self, book: Book) -> Result<()> {
        let mut state = self.state.write().await;
        check_version(state.books.get(&book.id), book.version, |b| b.version)?;

        let book = Book {
            version: book.version.next(),
            ..book
        };
        state.books.insert(book.id, book);
        Ok(())
    }

    async fn find(&self, filter: &BookFilter) -> Result<Vec<BookListing>> {
        let state = self.state.read().await;

        let mut listings: Vec<BookListing> = state
            .books
            .values()
            .filter_map(|book| {
                let author_name = state.users.get(&book.author_id).map(|u| u.name.clone());
                filter
                    .matches(book, author_name.as_deref())
                    .then(|| BookListing {
                        book: book.clone(),
                        author_name,
                    })
            })
            .collect();

        listings.sort_by(|a, b| a.book.title.cmp(&b.book.title));
        Ok(listings)
    }
}

#[async_trait]
impl LibraryLedger for InMemoryLibrary {
    async fn commit_loan(&self, change: LoanChange) -> Result<()> {
        let mut state = self.state.write().await;

        // 両方のバージョンを確認してから書き込む（片方だけの反映はしない）
        check_version(
            state.users.get(&change.user.id),
            change.user.version,
            |u| u.version,
        )?;
        check_version(
            state.books.get(&change.book.id),
            change.book.version,
            |b| b.version,
        )?;

        let user = User {
            version: change.user.version.next(),
            ..change.user
        };
        let book = Book {
            version: change.book.version.next(),
            ..change.book
        };

        state.users.insert(user.id, user);
        state.books.insert(book.id, book);
        state.events.push(change.event);
        Ok(())
    }

    async fn publish(&self, publication: Publication) -> Result<()> {
        let mut state = self.state.write().await;

        let author = publication.author;
        check_version(state.users.get(&author.id), author.version, |u| u.version)?;
        if state.books.contains_key(&publication.book.id) {
            return Err(StoreError::Validation(format!(
                "book already exists: {}",
                publication.book.id
            )));
        }

        let author = User {
            version: author.version.next(),
            ..author
        };
        state.users.insert(author.id, author);
        state.books.insert(publication.book.id, publication.book);
        state.events.push(publication.event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookBorrowed, Role, Stock, book, user};
    use chrono::Utc;

    fn reader(email: &str) -> User {
        user::register_user(
            "Ada".to_string(),
            email.to_string(),
            "hash".to_string(),
            Role::Reader,
            Utc::now(),
        )
    }

    fn novel(author_id: UserId, title: &str, genre: &str) -> Book {
        book::publish_book(
            author_id,
            title.to_string(),
            genre.to_string(),
            Stock::new(1),
            Utc::now(),
        )
        .0
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let library = InMemoryLibrary::new();
        library.insert(reader("ada@example.com")).await.unwrap();

        let result = library.insert(reader("ada@example.com")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_rejects_stale_writes() {
        let library = InMemoryLibrary::new();
        let user = reader("ada@example.com");
        library.seed_user(user.clone()).await;

        IdentityStore::save(&library, user.clone()).await.unwrap();
        let stored = IdentityStore::find_by_id(&library, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, Version::initial().next());

        // 古いバージョンでの書き込みは衝突
        let result = IdentityStore::save(&library, user).await;
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_commit_loan_writes_nothing_when_one_version_is_stale() {
        let library = InMemoryLibrary::new();
        let user = reader("ada@example.com");
        let book = novel(UserId::new(), "Dune", "SF");
        library.seed_user(user.clone()).await;
        library.seed_book(book.clone()).await;

        let stale_book = Book {
            version: Version::from_value(7),
            stock: Stock::new(0),
            ..book.clone()
        };
        let event = LibraryEvent::BookBorrowed(BookBorrowed {
            user_id: user.id,
            book_id: book.id,
            borrowed_at: Utc::now(),
            remaining_stock: 0,
        });
        let change = LoanChange {
            user: User {
                name: "Changed".to_string(),
                ..user.clone()
            },
            book: stale_book,
            event,
        };

        let result = library.commit_loan(change).await;
        assert!(matches!(result, Err(StoreError::Conflict)));

        // 利用者側も書き込まれていない
        let stored_user = IdentityStore::find_by_id(&library, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_user, user);
        assert!(library.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_find_filters_and_orders_by_title() {
        let library = InMemoryLibrary::new();
        let author = User {
            name: "Frank Herbert".to_string(),
            role: Role::Author,
            ..reader("frank@example.com")
        };
        library.seed_user(author.clone()).await;
        library.seed_book(novel(author.id, "Dune Messiah", "SF")).await;
        library.seed_book(novel(author.id, "Dune", "SF")).await;
        library.seed_book(novel(author.id, "Whipping Star", "Comedy")).await;

        let filter = BookFilter {
            title: Some("dune".to_string()),
            author: Some("herbert".to_string()),
            genre: Some("SF".to_string()),
        };
        let listings = library.find(&filter).await.unwrap();

        let titles: Vec<&str> = listings.iter().map(|l| l.book.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Dune Messiah"]);
        assert_eq!(listings[0].author_name.as_deref(), Some("Frank Herbert"));
    }
}
