//! Core domain entities for LifeLog.
//!
//! These are plain records loaded from the database. Every operation that reads or writes one
//! is scoped to the account that owns it; callers pass the owner explicitly.

use chrono::{DateTime, Utc};
use thiserror::Error;

mod profile;
mod time_block;

pub use profile::{Gender, Profile, ProfileFieldError, ProfileUpdate};
pub use time_block::{TimeBlock, TimeBlockWrite};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal database error {0}")]
    Internal(#[from] agdb::DbError),
    #[error("Stored value of `{field}` is malformed: {value:?}")]
    Corrupt { field: &'static str, value: String },
    #[error("A successful query returned no elements")]
    EmptyResult,
    #[error("The database has no model version record")]
    MissingModelVersion,
    #[error("Database model version {found} is newer than the supported version {supported}")]
    UnsupportedModelVersion { found: u64, supported: u64 },
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn timestamp(field: &'static str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| Error::Corrupt {
        field,
        value: millis.to_string(),
    })
}

/// Empty strings are how the database stores an absent optional value.
pub(crate) fn optional(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
