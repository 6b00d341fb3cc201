mod auth;
mod error_handler;

pub use auth::{
    AuthError, Identity, MaybeIdentity, authenticate, optional_auth, require_auth,
    try_authenticate,
};
pub use error_handler::log_errors;
