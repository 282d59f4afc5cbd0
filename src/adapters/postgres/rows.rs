use crate::domain::{Book, BookId, LoanList, Role, Stock, User, UserId, Version};
use crate::ports::{Result, StoreError};
use sqlx::{PgConnection, Row, postgres::PgRow};
use uuid::Uuid;

pub(super) const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, role,
    borrowed_books, books_written, version, created_at
"#;

pub(super) const BOOK_COLUMNS: &str = r#"
    id, title, genre, stock, author_id,
    borrowed_by, version, created_at
"#;

fn corrupted(message: String) -> StoreError {
    StoreError::Unavailable(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

/// PostgreSQLの行データをUserに変換する
///
/// 役割の文字列と貸出リストの上限はここで検証し、不正な行はデータ破損として扱う。
pub(super) fn map_row_to_user(row: &PgRow) -> Result<User> {
    let role_str: String = row.try_get("role")?;
    let role = role_str.parse::<Role>().map_err(corrupted)?;

    let borrowed: Vec<Uuid> = row.try_get("borrowed_books")?;
    let borrowed_books = LoanList::try_from(
        borrowed.into_iter().map(BookId::from_uuid).collect::<Vec<_>>(),
    )
    .map_err(|e| corrupted(e.to_string()))?;

    let written: Vec<Uuid> = row.try_get("books_written")?;

    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        borrowed_books,
        books_written: written.into_iter().map(BookId::from_uuid).collect(),
        version: Version::from_value(row.try_get("version")?),
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQLの行データをBookに変換する
pub(super) fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let stock_i32: i32 = row.try_get("stock")?;
    let stock = u32::try_from(stock_i32)
        .map_err(|_| corrupted(format!("stock out of range: {}", stock_i32)))?;

    let borrowed_by: Vec<Uuid> = row.try_get("borrowed_by")?;

    Ok(Book {
        id: BookId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        genre: row.try_get("genre")?,
        stock: Stock::new(stock),
        author_id: UserId::from_uuid(row.try_get("author_id")?),
        borrowed_by: borrowed_by.into_iter().map(UserId::from_uuid).collect(),
        version: Version::from_value(row.try_get("version")?),
        created_at: row.try_get("created_at")?,
    })
}

fn stock_to_i32(stock: Stock) -> Result<i32> {
    i32::try_from(stock.value())
        .map_err(|_| StoreError::Validation(format!("stock too large: {}", stock.value())))
}

/// 利用者レコード全体を、バージョンが一致する場合のみ書き込む
///
/// 一致しない（または行が存在しない）場合は`StoreError::Conflict`。
pub(super) async fn update_user(conn: &mut PgConnection, user: &User) -> Result<()> {
    let borrowed: Vec<Uuid> = user.borrowed_books.as_slice().iter().map(|id| id.value()).collect();
    let written: Vec<Uuid> = user.books_written.iter().map(|id| id.value()).collect();

    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = $3,
            email = $4,
            password_hash = $5,
            role = $6,
            borrowed_books = $7,
            books_written = $8,
            version = version + 1
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(user.id.value())
    .bind(user.version.value())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&borrowed)
    .bind(&written)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Conflict);
    }
    Ok(())
}

/// 書籍レコード全体を、バージョンが一致する場合のみ書き込む
pub(super) async fn update_book(conn: &mut PgConnection, book: &Book) -> Result<()> {
    let borrowed_by: Vec<Uuid> = book.borrowed_by.iter().map(|id| id.value()).collect();

    let result = sqlx::query(
        r#"
        UPDATE books
        SET title = $3,
            genre = $4,
            stock = $5,
            author_id = $6,
            borrowed_by = $7,
            version = version + 1
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(book.id.value())
    .bind(book.version.value())
    .bind(&book.title)
    .bind(&book.genre)
    .bind(stock_to_i32(book.stock)?)
    .bind(book.author_id.value())
    .bind(&borrowed_by)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Conflict);
    }
    Ok(())
}

/// 新しい書籍を挿入する
pub(super) async fn insert_book(conn: &mut PgConnection, book: &Book) -> Result<()> {
    let borrowed_by: Vec<Uuid> = book.borrowed_by.iter().map(|id| id.value()).collect();

    sqlx::query(
        r#"
        INSERT INTO books (id, title, genre, stock, author_id, borrowed_by, version, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(book.id.value())
    .bind(&book.title)
    .bind(&book.genre)
    .bind(stock_to_i32(book.stock)?)
    .bind(book.author_id.value())
    .bind(&borrowed_by)
    .bind(book.version.value())
    .bind(book.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
