//! In-memory implementation of every repository contract, for tests only.
//!
//! One mutex guards the whole data set, so each repository call is atomic in
//! the same way a single SQL statement is against Postgres. The lock is never
//! held across an `.await`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::database::{
    LikeRepository, MessageRepository, ProductRepository, StoreError, UserRepository,
};
use crate::models::{Message, Product, ProductStatus, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
    likes: Vec<LikeRow>,
    messages: Vec<Message>,
}

struct LikeRow {
    product_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored like rows for the pair. Lets tests observe that a
    /// duplicate like did not create a second row.
    pub fn like_rows(&self, product_id: &str, user_id: &str) -> usize {
        self.tables
            .lock()
            .likes
            .iter()
            .filter(|l| l.product_id == product_id && l.user_id == user_id)
            .count()
    }

    /// When the pair's like row was written, if it exists.
    pub fn liked_at(&self, product_id: &str, user_id: &str) -> Option<DateTime<Utc>> {
        self.tables
            .lock()
            .likes
            .iter()
            .find(|l| l.product_id == product_id && l.user_id == user_id)
            .map(|l| l.created_at)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Conflict);
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<User, StoreError> {
        self.tables
            .lock()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if tables.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Conflict);
        }
        tables.products.push(Product {
            like_count: 0,
            liked_by_me: false,
            ..product.clone()
        });
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.tables.lock().products.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Product, StoreError> {
        self.tables
            .lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn purchase(&self, product_id: &str, buyer_id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == product_id && p.status == ProductStatus::Available)
            .ok_or(StoreError::AlreadySoldOrNotFound)?;
        product.status = ProductStatus::Sold;
        product.buyer_id = Some(buyer_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .lock()
            .likes
            .iter()
            .any(|l| l.product_id == product_id && l.user_id == user_id))
    }

    async fn like(&self, product_id: &str, user_id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        let exists = tables
            .likes
            .iter()
            .any(|l| l.product_id == product_id && l.user_id == user_id);
        if !exists {
            tables.likes.push(LikeRow {
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn unlike(&self, product_id: &str, user_id: &str) -> Result<(), StoreError> {
        self.tables
            .lock()
            .likes
            .retain(|l| !(l.product_id == product_id && l.user_id == user_id));
        Ok(())
    }

    async fn count_by_product(&self, product_id: &str) -> Result<i64, StoreError> {
        let count = self
            .tables
            .lock()
            .likes
            .iter()
            .filter(|l| l.product_id == product_id)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create(&self, message: &Message) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if tables.messages.iter().any(|m| m.id == message.id) {
            return Err(StoreError::Conflict);
        }
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn list_conversation(
        &self,
        user_a: &str,
        user_b: &str,
        product_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        let mut conversation: Vec<Message> = self
            .tables
            .lock()
            .messages
            .iter()
            .filter(|m| m.product_id == product_id && m.is_between(user_a, user_b))
            .cloned()
            .collect();
        conversation.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(conversation)
    }

    async fn list_chat_users_by_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.lock();
        let mut users: Vec<String> = Vec::new();
        for message in tables.messages.iter().filter(|m| m.product_id == product_id) {
            if let Some(other) = message.counterpart_of(user_id) {
                if !users.iter().any(|u| u == other) {
                    users.push(other.to_string());
                }
            }
        }
        Ok(users)
    }
}
