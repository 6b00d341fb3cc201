use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductSummaryRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct ProductSummaryResponse {
    pub text: String,
}
