// Like store. The (product_id, user_id) primary key makes `like` safe to
// repeat without a pre-check.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::StoreError;

#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError>;

    /// Idempotent: liking twice leaves a single row and is not an error.
    async fn like(&self, product_id: &str, user_id: &str) -> Result<(), StoreError>;

    /// Idempotent: removing a like that does not exist is not an error.
    async fn unlike(&self, product_id: &str, user_id: &str) -> Result<(), StoreError>;

    async fn count_by_product(&self, product_id: &str) -> Result<i64, StoreError>;
}

pub struct PgLikeRepository {
    db: PgPool,
}

impl PgLikeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE product_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn like(&self, product_id: &str, user_id: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO likes (product_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (product_id, user_id) DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn unlike(&self, product_id: &str, user_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM likes WHERE product_id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn count_by_product(&self, product_id: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}
