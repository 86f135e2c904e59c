//! Application error type and Sentry reporting.
//!
//! Every fallible handler returns [`AppError`]. Server-side failures are
//! captured to Sentry with the event id logged; the response body never
//! carries internal detail for those.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::checkout::GatewayError;
use crate::content::ContentError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Content(_) | Self::Gateway(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request error");
        }

        let (status, message) = match &self {
            Self::Content(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Gateway(_) => (StatusCode::BAD_GATEWAY, "Payment provider error".to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        (status, message).into_response()
    }
}

/// Record a breadcrumb on the current Sentry scope.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_context() {
        let err = AppError::NotFound("no such post".to_string());
        assert_eq!(err.to_string(), "Not found: no such post");

        let err = AppError::BadRequest("bad slug".to_string());
        assert_eq!(err.to_string(), "Bad request: bad slug");
    }

    #[test]
    fn status_codes_match_variants() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Gateway(GatewayError::Transport("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_detail_stays_out_of_the_response() {
        let response = AppError::Internal("secret path /etc/thing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body is the generic message; the detail only reaches logs.
    }
}
