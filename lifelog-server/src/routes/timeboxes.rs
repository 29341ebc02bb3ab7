use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use lifelog_lib::{instant, repository::TimeBlock, timebox::parse_date};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::{AppError, backend},
    routes::{ApiResult, ok, ok_with, present},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveBody {
    time_block: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    id: Option<String>,
}

/// `GET /api/timeboxes[?date=YYYY-MM-DD]`: the caller's blocks in ascending order.
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<TimeBlock>> {
    let Query(query) = query?;

    let date = match present(query.date.as_deref()) {
        Some(raw) => Some(parse_date(raw).ok_or_else(|| {
            AppError::Validation(format!("Invalid date `{raw}`. Use YYYY-MM-DD format."))
        })?),
        None => None,
    };

    let blocks = state
        .repo
        .time_blocks(user_id, date)
        .map_err(backend("Failed to fetch time blocks"))?;

    ok(blocks)
}

/// `POST /api/timeboxes`: upsert the caller's block at `time_block`.
pub async fn save(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<SaveBody>, JsonRejection>,
) -> ApiResult<TimeBlock> {
    let Json(body) = body?;

    let raw = present(body.time_block.as_deref())
        .ok_or_else(|| AppError::Validation("Time block is required".into()))?;
    let time_block = instant::parse(raw).ok_or_else(|| {
        AppError::Validation("Invalid time block format. Use ISO string format.".into())
    })?;

    let block = state
        .repo
        .upsert_time_block(user_id, time_block, present(body.description.as_deref()))
        .map_err(backend("Failed to save time block"))?;

    ok_with(block, "Time block saved successfully")
}

/// `DELETE /api/timeboxes?id=..`: remove one of the caller's blocks. Ids that don't exist or
/// belong to someone else succeed without removing anything.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<()> {
    let Query(query) = query?;

    let raw = present(query.id.as_deref())
        .ok_or_else(|| AppError::Validation("Time block ID is required".into()))?;
    let id = Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(format!("Invalid time block ID `{raw}`")))?;

    let removed = state
        .repo
        .delete_time_block(user_id, id)
        .map_err(backend("Failed to delete time block"))?;

    if !removed {
        debug!("Delete of time block {id} by {user_id} matched nothing");
    }

    ok_with((), "Time block deleted successfully")
}
