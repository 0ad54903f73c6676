use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Duplicate document id in corpus: {0}")]
    DuplicateDocument(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Selection strategy failed: {0}")]
    StrategyError(String),

    #[error("Tool catalog error: {0}")]
    CatalogError(String),

    #[error("Benchmark dataset error: {0}")]
    DatasetError(String),

    #[error("Evaluation report error: {0}")]
    ReportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::StrategyError(msg) => {
                tracing::error!(error = %msg, "Selection strategy error");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::DuplicateDocument(_)
            | AppError::MalformedDocument(_)
            | AppError::CatalogError(_) => {
                tracing::error!(error = %self, "Catalog error");
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::DatasetError(_) | AppError::ReportError(_) | AppError::IoError(_) => {
                tracing::error!(error = %self, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::StrategyError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
