// Credential store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::StoreError;
use crate::models::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with [`StoreError::Conflict`] if the id is taken.
    async fn create(&self, user: &User) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] if no such user exists.
    async fn find_by_id(&self, id: &str) -> Result<User, StoreError>;
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, password_hash, display_name, mbti, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.mbti)
        .bind(user.created_at)
        .execute(&self.db)
        .await
        .map_err(StoreError::from_insert)?;

        tracing::info!("Created user: {}", user.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, password_hash, display_name, mbti, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}
