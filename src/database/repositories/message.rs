// Message store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::StoreError;
use crate::models::Message;

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Plain insert. Sender and recipient are not validated here.
    async fn create(&self, message: &Message) -> Result<(), StoreError>;

    /// Every message about `product_id` exchanged between `user_a` and
    /// `user_b` in either direction, oldest first.
    async fn list_conversation(
        &self,
        user_a: &str,
        user_b: &str,
        product_id: &str,
    ) -> Result<Vec<Message>, StoreError>;

    /// Distinct users that `user_id` has exchanged messages with about `product_id`.
    async fn list_chat_users_by_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Vec<String>, StoreError>;
}

pub struct PgMessageRepository {
    db: PgPool,
}

impl PgMessageRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, product_id, from_user_id, to_user_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&message.id)
        .bind(&message.product_id)
        .bind(&message.from_user_id)
        .bind(&message.to_user_id)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(&self.db)
        .await
        .map_err(StoreError::from_insert)?;

        Ok(())
    }

    async fn list_conversation(
        &self,
        user_a: &str,
        user_b: &str,
        product_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, product_id, from_user_id, to_user_id, body, created_at
            FROM messages
            WHERE product_id = $1
              AND ((from_user_id = $2 AND to_user_id = $3)
                OR (from_user_id = $3 AND to_user_id = $2))
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(product_id)
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.db)
        .await?;

        Ok(messages)
    }

    async fn list_chat_users_by_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let users: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT
                CASE WHEN from_user_id = $1 THEN to_user_id ELSE from_user_id END
            FROM messages
            WHERE product_id = $2
              AND (from_user_id = $1 OR to_user_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }
}
