use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// API error taxonomy, mapped to an HTTP status and a JSON `{"message"}`
/// body at the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A unique field (email, username) is already taken.
    #[error("User already exists")]
    Conflict,

    /// Login failure. Deliberately the same message for unknown email
    /// and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Request body failed a transport-boundary check.
    #[error("{0}")]
    BadRequest(&'static str),

    /// Missing, malformed or expired session token.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// The id from a valid token no longer resolves to a user.
    #[error("User not found")]
    NotFound,

    /// Unexpected persistence or infrastructure fault. The cause goes to
    /// the log, never into the response body.
    #[error("Server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Conflict | Self::InvalidCredentials | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref cause) = self {
            error!(error = %cause, "internal error");
        }
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db)
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Self::Conflict
            }
            _ => Self::Internal(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_message(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        (status, body["message"].as_str().unwrap_or_default().to_string())
    }

    #[tokio::test]
    async fn conflict_and_credentials_map_to_400() {
        let (status, message) = body_message(ApiError::Conflict).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "User already exists");

        let (status, message) = body_message(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid credentials");
    }

    #[tokio::test]
    async fn unauthorized_and_not_found_statuses() {
        let (status, _) = body_message(ApiError::Unauthorized("Invalid or expired token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, message) = body_message(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "User not found");
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_its_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3:5432"));
        let (status, message) = body_message(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Server error");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound));
    }
}
