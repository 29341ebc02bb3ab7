use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
};
use serde::Serialize;

use crate::error::AppError;

pub mod profile;
pub mod timeboxes;

/// Success body shared by every route.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        data,
        message: None,
    }))
}

fn ok_with<T>(data: T, message: &'static str) -> ApiResult<T> {
    Ok(Json(Envelope {
        data,
        message: Some(message),
    }))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `None` for absent or blank values.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
