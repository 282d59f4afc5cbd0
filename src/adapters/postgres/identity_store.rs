use crate::domain::{User, UserId};
use crate::ports::{IdentityStore as IdentityStoreTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{USER_COLUMNS, map_row_to_user, update_user};

/// IdentityStoreのPostgreSQL実装
pub struct IdentityStore {
    pool: PgPool,
}

impl IdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStoreTrait for IdentityStore {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    /// 一意制約違反（メールアドレス重複）は`StoreError::Validation`になる
    async fn insert(&self, user: User) -> Result<()> {
        let borrowed: Vec<Uuid> = user
            .borrowed_books
            .as_slice()
            .iter()
            .map(|id| id.value())
            .collect();
        let written: Vec<Uuid> = user.books_written.iter().map(|id| id.value()).collect();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role,
                borrowed_books, books_written, version, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.value())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&borrowed)
        .bind(&written)
        .bind(user.version.value())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, user: User) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        update_user(&mut conn, &user).await
    }
}
