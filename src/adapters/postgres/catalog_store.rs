use crate::domain::{Book, BookId};
use crate::ports::{BookFilter, BookListing, CatalogStore as CatalogStoreTrait, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{PgPool, Row};

use super::rows::{BOOK_COLUMNS, map_row_to_book, update_book};

/// CatalogStoreのPostgreSQL実装
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn save(&self, book: Book) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        update_book(&mut conn, &book).await
    }

    /// 著者名をJOINで展開して一覧する
    ///
    /// 部分一致は`strpos`で判定するため、入力中の`%`や`_`はワイルドカードにならない。
    async fn find(&self, filter: &BookFilter) -> Result<Vec<BookListing>> {
        let mut rows = sqlx::query(
            r#"
            SELECT
                b.id, b.title, b.genre, b.stock, b.author_id,
                b.borrowed_by, b.version, b.created_at,
                u.name AS author_name
            FROM books b
            LEFT JOIN users u ON u.id = b.author_id
            WHERE ($1::text IS NULL OR strpos(lower(b.title), lower($1)) > 0)
              AND ($2::text IS NULL OR strpos(lower(u.name), lower($2)) > 0)
              AND ($3::text IS NULL OR b.genre = $3)
            ORDER BY b.title ASC
            "#,
        )
        .bind(filter.title.as_deref())
        .bind(filter.author.as_deref())
        .bind(filter.genre.as_deref())
        .fetch(&self.pool);

        let mut listings = Vec::new();
        while let Some(row) = rows.try_next().await? {
            listings.push(BookListing {
                book: map_row_to_book(&row)?,
                author_name: row.try_get("author_name")?,
            });
        }

        Ok(listings)
    }
}
