// Product store
//
// `status` is only ever changed by `purchase`, and only from `available` to
// `sold`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::StoreError;
use crate::models::{Product, ProductStatus};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persists a fully populated product. The caller assigns id, timestamp
    /// and status before calling.
    async fn create(&self, product: &Product) -> Result<(), StoreError>;

    /// All products in storage order. Derived like fields are left zeroed.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Product, StoreError>;

    /// Marks an available product as sold to `buyer_id` in one indivisible step.
    /// Any other starting state, including a missing product, yields
    /// [`StoreError::AlreadySoldOrNotFound`].
    async fn purchase(&self, product_id: &str, buyer_id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    title: String,
    price: i64,
    description: String,
    seller_id: String,
    status: String,
    image_url: Option<String>,
    buyer_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ProductStatus>()
            .map_err(|e| StoreError::Corrupt(format!("product {}: {}", row.id, e)))?;
        Ok(Product {
            id: row.id,
            title: row.title,
            price: row.price,
            description: row.description,
            seller_id: row.seller_id,
            status,
            image_url: row.image_url,
            buyer_id: row.buyer_id,
            created_at: row.created_at,
            like_count: 0,
            liked_by_me: false,
        })
    }
}

pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, price, description, seller_id, status, image_url, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.seller_id)
        .bind(product.status.as_str())
        .bind(&product.image_url)
        .bind(product.created_at)
        .execute(&self.db)
        .await
        .map_err(StoreError::from_insert)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, price, description, seller_id, status,
                   image_url, buyer_id, created_at
            FROM products
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, price, description, seller_id, status,
                   image_url, buyer_id, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;

        Product::try_from(row)
    }

    async fn purchase(&self, product_id: &str, buyer_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET status = 'sold', buyer_id = $2
            WHERE id = $1 AND status = 'available'
            "#,
        )
        .bind(product_id)
        .bind(buyer_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadySoldOrNotFound);
        }

        tracing::info!("Product {} sold to {}", product_id, buyer_id);
        Ok(())
    }
}
