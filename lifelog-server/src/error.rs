use std::{io, net::SocketAddr};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lifelog_lib::repository;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Everything a request handler can fail with. Each variant maps to one HTTP status and is
/// rendered as `{ "error": .., "details": .. }`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Backend {
        message: &'static str,
        #[source]
        source: repository::Error,
    },

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Backend { .. } | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &self {
            AppError::Backend { message, source } => {
                error!("{message}: {source}");
                Some(source.to_string())
            }
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Wrap a repository failure with the message shown to the caller.
pub fn backend(message: &'static str) -> impl FnOnce(repository::Error) -> AppError {
    move |source| AppError::Backend { message, source }
}

/// Failures that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to open repository: {0}")]
    Repository(#[from] lifelog_lib::Error),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] io::Error),
}
