use std::io;
use std::path::PathBuf;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Pin not found: {0}")]
    NotFoundPin(String),
    #[error("Pin {0} is not exported")]
    NotExported(u32),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Short write to {}: {written} of {expected} bytes", path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },
    #[error("Unexpected value in {}: {found:?}", path.display())]
    CorruptValue { path: PathBuf, found: Option<u8> },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFoundPin(_) => StatusCode::NOT_FOUND,
            AppError::NotExported(_) | AppError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            AppError::Io { .. }
            | AppError::ShortWrite { .. }
            | AppError::CorruptValue { .. }
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
