use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Product, ProductStatus};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    pub price: i64,
    pub description: String,
    pub seller_id: String,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

impl CreateProductRequest {
    /// Resolves defaults and validates the listing. Status falls back to
    /// `available`, and a `considering` listing always has price 0.
    pub fn into_product(self, id: String, created_at: DateTime<Utc>) -> Result<Product, AppError> {
        let status = match self.status.as_deref() {
            None | Some("") => ProductStatus::default(),
            Some(raw) => raw
                .parse::<ProductStatus>()
                .map_err(|_| AppError::Validation("invalid status"))?,
        };

        let price = match status {
            ProductStatus::Considering => 0,
            _ if self.price < 0 => return Err(AppError::Validation("invalid price")),
            _ => self.price,
        };

        Ok(Product {
            id,
            title: self.title,
            price,
            description: self.description,
            seller_id: self.seller_id,
            status,
            image_url: self.image_url.filter(|url| !url.is_empty()),
            buyer_id: None,
            created_at,
            like_count: 0,
            liked_by_me: false,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub status: ProductStatus,
}
