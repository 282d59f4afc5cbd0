use crate::domain::LibraryEvent;
use crate::ports::{LibraryLedger, LoanChange, Publication, Result, StoreError};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::rows::{insert_book, update_book, update_user};

/// LibraryLedgerのPostgreSQL実装
///
/// 1回のコミットを1トランザクションで実行する。どちらかのレコードのバージョンが
/// 一致しなければ早期リターンし、`Transaction`のドロップでロールバックされる。
/// タイムアウトでフューチャーが破棄された場合も同様。
pub struct Ledger {
    pool: PgPool,
}

impl Ledger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the event type discriminator from a LibraryEvent
    fn event_type(event: &LibraryEvent) -> &'static str {
        match event {
            LibraryEvent::BookBorrowed(_) => "BookBorrowed",
            LibraryEvent::BookReturned(_) => "BookReturned",
            LibraryEvent::BookPublished(_) => "BookPublished",
        }
    }

    async fn append_event(conn: &mut PgConnection, event: &LibraryEvent) -> Result<()> {
        let payload =
            serde_json::to_value(event).map_err(|e| StoreError::Unavailable(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO lending_events (event_type, user_id, book_id, payload)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Self::event_type(event))
        .bind(event.user_id().value())
        .bind(event.book_id().value())
        .bind(payload)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LibraryLedger for Ledger {
    async fn commit_loan(&self, change: LoanChange) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        update_user(&mut tx, &change.user).await?;
        update_book(&mut tx, &change.book).await?;
        Self::append_event(&mut tx, &change.event).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn publish(&self, publication: Publication) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        update_user(&mut tx, &publication.author).await?;
        insert_book(&mut tx, &publication.book).await?;
        Self::append_event(&mut tx, &publication.event).await?;

        tx.commit().await?;
        Ok(())
    }
}
