use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use lifelog_lib::repository::{Profile, ProfileUpdate};
use serde::Deserialize;
use tracing::debug;

use crate::{
    auth::CurrentUser,
    error::{AppError, backend},
    routes::{ApiResult, ok, ok_with},
    state::AppState,
};

/// Raw profile form. Every field is optional here so missing names produce a validation
/// message instead of a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileBody {
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    gender: Option<String>,
    location: Option<String>,
}

impl ProfileBody {
    fn validate(&self) -> Result<ProfileUpdate, AppError> {
        let field = |value: &Option<String>| value.as_deref().unwrap_or_default().to_string();

        ProfileUpdate::parse(
            &field(&self.first_name),
            &field(&self.last_name),
            &field(&self.date_of_birth),
            &field(&self.gender),
            &field(&self.location),
        )
        .map_err(|errors| {
            AppError::Validation(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })
    }
}

/// `GET /api/profile`: the caller's profile, created blank on first access.
pub async fn show(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Profile> {
    let profile = state
        .repo
        .profile(user_id)
        .map_err(backend("Failed to fetch profile"))?;

    ok(profile)
}

/// `POST /api/profile`: replace the editable fields of the caller's profile.
pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<ProfileBody>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(body) = body?;
    let update = body.validate()?;

    let profile = state
        .repo
        .update_profile(user_id, &update)
        .map_err(backend("Failed to update profile"))?;

    debug!("Profile {user_id} updated over the API");

    ok_with(profile, "Profile updated successfully")
}
