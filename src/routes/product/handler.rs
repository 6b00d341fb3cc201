use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    database::StoreError,
    error::{AppError, AppResult},
    middleware::{Identity, MaybeIdentity},
    models::{Product, ProductStatus},
    routes::{ApiJson, require_fields},
    utils::new_product_id,
};

use super::model::{CreateProductRequest, PurchaseRequest, PurchaseResponse};

/// Fills in the like count and, when the caller is known, whether they liked it.
/// Lookup failures degrade to zero / not liked instead of failing the listing.
async fn with_like_fields(state: &AppState, mut product: Product, viewer: &MaybeIdentity) -> Product {
    product.like_count = match state.likes.count_by_product(&product.id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count likes for {}: {}", product.id, e);
            0
        }
    };

    if let Some(identity) = &viewer.0 {
        product.liked_by_me = match state.likes.is_liked(&product.id, &identity.user_id).await {
            Ok(liked) => liked,
            Err(e) => {
                tracing::error!("Failed to read like state for {}: {}", product.id, e);
                false
            }
        };
    }

    product
}

#[axum::debug_handler]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(viewer): Extension<MaybeIdentity>,
) -> AppResult<Json<Vec<Product>>> {
    let products = state
        .products
        .list()
        .await
        .map_err(AppError::storage("list products"))?;

    let mut decorated = Vec::with_capacity(products.len());
    for product in products {
        decorated.push(with_like_fields(&state, product, &viewer).await);
    }

    Ok(Json(decorated))
}

#[axum::debug_handler]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(viewer): Extension<MaybeIdentity>,
    Path(product_id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = match state.products.find_by_id(&product_id).await {
        Ok(product) => product,
        Err(StoreError::NotFound) => return Err(AppError::NotFound("product not found")),
        Err(e) => return Err(AppError::storage("load product")(e)),
    };

    Ok(Json(with_like_fields(&state, product, &viewer).await))
}

/// Accepts listings without authentication; the seller id comes from the body.
#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = req.into_product(new_product_id(), Utc::now())?;

    match state.products.create(&product).await {
        Ok(()) => {}
        Err(StoreError::Conflict) => return Err(AppError::Conflict("product already exists")),
        Err(e) => return Err(AppError::storage("create product")(e)),
    }

    tracing::info!(
        "Product {} listed by {} ({})",
        product.id,
        product.seller_id,
        product.status
    );
    Ok((StatusCode::CREATED, Json(product)))
}

/// The buyer is always the authenticated caller, never a body field.
#[axum::debug_handler]
pub async fn purchase(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<PurchaseRequest>,
) -> AppResult<Json<PurchaseResponse>> {
    require_fields(&[&req.product_id], "invalid request")?;

    match state.products.purchase(&req.product_id, &identity.user_id).await {
        Ok(()) => Ok(Json(PurchaseResponse {
            status: ProductStatus::Sold,
        })),
        Err(StoreError::AlreadySoldOrNotFound) => {
            Err(AppError::Conflict("already sold or not found"))
        }
        Err(e) => Err(AppError::storage("purchase product")(e)),
    }
}
