use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

pub mod ai;
pub mod like;
pub mod message;
pub mod product;
pub mod user;

/// `Json` whose rejection is reported as a 400 [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection is reported as a 400 [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Rejects the request when any of `fields` is empty. Whitespace is content.
pub(crate) fn require_fields(fields: &[&str], msg: &'static str) -> Result<(), AppError> {
    if fields.iter().any(|f| f.is_empty()) {
        return Err(AppError::Validation(msg));
    }
    Ok(())
}
