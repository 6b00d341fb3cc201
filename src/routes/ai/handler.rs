use axum::extract::{Json, State};

use crate::{
    AppState,
    database::StoreError,
    error::{AppError, AppResult},
    infrastructure::gemini::generate_product_summary,
    routes::{ApiJson, require_fields},
};

use super::model::{ProductSummaryRequest, ProductSummaryResponse};

#[axum::debug_handler]
pub async fn product_summary(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProductSummaryRequest>,
) -> AppResult<Json<ProductSummaryResponse>> {
    require_fields(&[&req.product_id], "invalid request")?;

    let product = match state.products.find_by_id(&req.product_id).await {
        Ok(product) => product,
        Err(StoreError::NotFound) => return Err(AppError::NotFound("product not found")),
        Err(e) => return Err(AppError::storage("load product")(e)),
    };

    let text = generate_product_summary(state.text_generator.as_ref(), &product).await?;
    Ok(Json(ProductSummaryResponse { text }))
}
