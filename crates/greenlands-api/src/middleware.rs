use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};

use greenlands_types::api::Claims;

use crate::auth::AppState;
use crate::error::{ApiError, AuthFailure};

/// Extract and validate the bearer token, inserting the decoded claims as a
/// request extension. Rejections keep the granular client-facing messages
/// (no token / malformed / expired / invalid).
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthFailure::NoToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::NoToken)?;
    if token.is_empty() {
        return Err(AuthFailure::NoToken.into());
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        ErrorKind::InvalidToken => AuthFailure::Malformed,
        _ => AuthFailure::Invalid,
    })?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
