use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;
use crate::templates;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::NotFound(detail) => match templates::render_not_found(detail) {
                Ok(page) => (status, Html(page)).into_response(),
                Err(e) => {
                    error!("Failed to render 404 page: {e}");
                    (status, detail.clone()).into_response()
                }
            },
            AppError::Validation(message) => (status, message.clone()).into_response(),
            AppError::Store(_) | AppError::Template(_) => {
                error!("{self}");
                (status, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_variant() {
        assert_eq!(AppError::NotFound("gone".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("bad".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_renders_page() {
        let response = AppError::NotFound("No question matches id 9.".into()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
