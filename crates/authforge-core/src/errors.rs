//! Application error type.
//!
//! Domain failures (duplicate email, bad credentials, ...) are returned
//! in-band as values and never pass through here. [`AppError`] carries the
//! infrastructure faults that remain: an unreachable database, a signing key
//! the JWT library rejects, a malformed request body.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.error, self.status)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = %self.error, "Request failed");
        }

        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_constructors_set_status() {
        assert_eq!(
            AppError::bad_request(anyhow!("x")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unauthorized(anyhow!("x")).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::unprocessable(anyhow!("x")).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::internal(anyhow!("x")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_io_error_is_internal() {
        let err: AppError = std::io::Error::other("disk gone").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_into_response_keeps_status() {
        let response = AppError::bad_request(anyhow!("Invalid request body")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
