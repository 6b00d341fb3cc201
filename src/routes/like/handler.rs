use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    error::{AppError, AppResult},
    middleware::Identity,
    routes::{ApiJson, require_fields},
};

use super::model::{ToggleLikeRequest, ToggleLikeResponse};

/// Flips the caller's like on a product and returns the new state and count.
///
/// Read-then-write without a transaction: two concurrent toggles by the same
/// user may leave either state behind. The store's uniqueness guarantee still
/// holds, so there is never more than one like row per user and product.
#[axum::debug_handler]
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<ToggleLikeRequest>,
) -> AppResult<Json<ToggleLikeResponse>> {
    require_fields(&[&req.product_id], "invalid request")?;
    let (product_id, user_id) = (req.product_id.as_str(), identity.user_id.as_str());

    let liked = state
        .likes
        .is_liked(product_id, user_id)
        .await
        .map_err(AppError::storage("check like"))?;

    if liked {
        state
            .likes
            .unlike(product_id, user_id)
            .await
            .map_err(AppError::storage("unlike"))?;
    } else {
        state
            .likes
            .like(product_id, user_id)
            .await
            .map_err(AppError::storage("like"))?;
    }

    let like_count = state
        .likes
        .count_by_product(product_id)
        .await
        .map_err(AppError::storage("count likes"))?;

    Ok(Json(ToggleLikeResponse {
        liked: !liked,
        like_count,
    }))
}
