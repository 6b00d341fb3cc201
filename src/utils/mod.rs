use bcrypt::{non_truncating_hash, non_truncating_verify};
use uuid::Uuid;

/// Salted bcrypt hash. CPU heavy, call from a blocking context.
/// Passwords over 72 bytes are refused rather than silently cut.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    non_truncating_hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    non_truncating_verify(password.as_bytes(), hash)
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hashes on the blocking thread pool so request workers stay responsive.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, PasswordError> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??)
}

/// Any failure, including a corrupt stored hash, counts as a mismatch.
pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map(|r| r.unwrap_or(false))
        .unwrap_or(false)
}

/// Time-ordered unique product id.
pub fn new_product_id() -> String {
    format!("p_{}", Uuid::now_v7().simple())
}

/// Time-ordered unique message id.
pub fn new_message_id() -> String {
    format!("m_{}", Uuid::now_v7().simple())
}
