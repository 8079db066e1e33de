//! HTTP mapping for `HiloadError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hiload_core::error::HiloadError;
use serde_json::json;

/// Handler-facing error; always a JSON 500.
#[derive(Debug)]
pub struct ApiError(pub HiloadError);

impl From<HiloadError> for ApiError {
    fn from(e: HiloadError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
            "code": self.0.client_code().as_str(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_is_a_server_error() {
        let errors = [
            HiloadError::DuplicateMetricName("x".into()),
            HiloadError::InvalidMetric("x".into()),
            HiloadError::Exposition("x".into()),
            HiloadError::InvalidConfig("x".into()),
            HiloadError::UnsupportedVersion,
            HiloadError::Internal("x".into()),
        ];
        for e in errors {
            let resp = ApiError(e).into_response();
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
