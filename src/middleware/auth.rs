use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{
    AppState,
    error::AppError,
    infrastructure::{Claims, TokenError, TokenService},
};

/// Verified caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub claims: Claims,
}

/// Placed in request extensions by [`optional_auth`]. `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct MaybeIdentity(pub Option<Identity>);

type BearerHeader = Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingCredential,
    #[error("invalid Authorization header")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => AppError::Authentication("missing Authorization header"),
            AuthError::MalformedHeader => AppError::Authentication("invalid Authorization header"),
            AuthError::InvalidToken(_) => AppError::Authentication("invalid token"),
        }
    }
}

pub fn authenticate(tokens: &TokenService, header: BearerHeader) -> Result<Identity, AuthError> {
    let TypedHeader(Authorization(bearer)) = header.map_err(|rejection| {
        if rejection.is_missing() {
            AuthError::MissingCredential
        } else {
            AuthError::MalformedHeader
        }
    })?;

    let claims = tokens.verify_token(bearer.token())?;
    Ok(Identity {
        user_id: claims.sub.clone(),
        claims,
    })
}

pub fn try_authenticate(tokens: &TokenService, header: BearerHeader) -> Option<Identity> {
    match authenticate(tokens, header) {
        Ok(identity) => Some(identity),
        Err(AuthError::MissingCredential) => None,
        Err(e) => {
            tracing::debug!("Ignoring unusable credential on optional route: {}", e);
            None
        }
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    header: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(&state.tokens, header).inspect_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Resolves the caller if possible and always lets the request through.
pub async fn optional_auth(
    State(state): State<AppState>,
    header: BearerHeader,
    mut request: Request,
    next: Next,
) -> Response {
    let viewer = try_authenticate(&state.tokens, header);
    request.extensions_mut().insert(MaybeIdentity(viewer));
    next.run(request).await
}
