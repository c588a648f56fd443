use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Why an authentication attempt was rejected. Clients branch on these
/// messages (e.g. an expired token clears the stored session, a missing one
/// redirects to login), so the wording is part of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Not authorized, no token")]
    NoToken,
    #[error("Not authorized, token is malformed")]
    Malformed,
    #[error("Not authorized, token expired")]
    Expired,
    #[error("Not authorized, invalid token")]
    Invalid,
    #[error("Invalid email or password")]
    BadCredentials,
}

/// Request-terminal error taxonomy. Controllers translate storage failures
/// into `Storage`; everything else is a local decision. Nothing here is
/// retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// Authenticated but not permitted (ownership/role mismatch).
    #[error("Not authorized")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Something went wrong")]
    Storage(#[source] anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Storage(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(ref cause) = self {
            error!("storage failure: {:#}", cause);
        }

        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Auth(AuthFailure::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("Land").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Storage(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failure_messages_are_client_facing() {
        assert_eq!(AuthFailure::NoToken.to_string(), "Not authorized, no token");
        assert_eq!(
            AuthFailure::Malformed.to_string(),
            "Not authorized, token is malformed"
        );
        assert_eq!(
            AuthFailure::Expired.to_string(),
            "Not authorized, token expired"
        );
        assert_eq!(
            AuthFailure::Invalid.to_string(),
            "Not authorized, invalid token"
        );
    }

    #[test]
    fn storage_body_never_leaks_the_cause() {
        let err = ApiError::Storage(anyhow::anyhow!("users table on fire"));
        assert_eq!(err.to_string(), "Something went wrong");
    }
}
