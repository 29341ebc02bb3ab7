//! State behind the two LifeLog screens, independent of how they are rendered.
//!
//! Views talk to the server through [`TimeBlockService`] and [`ProfileService`], which
//! [`Client`](crate::client::Client) implements. Every action takes `&mut self`, so a view can
//! only ever have one request outstanding.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    client,
    repository::{Profile, ProfileFieldError, ProfileUpdate, TimeBlock, TimeBlockWrite},
    timebox::Slot,
};

pub mod profile;
pub mod timebox;

pub use profile::{Field, ProfileForm, ProfileView};
pub use timebox::{Edit, Row, TimeBoxView, reconcile};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("There is no time block at {0}")]
    NoBlock(Slot),
    #[error("{}", join(.0))]
    Invalid(Vec<ProfileFieldError>),
    #[error(transparent)]
    Request(#[from] client::Error),
}

fn join(errors: &[ProfileFieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
pub trait TimeBlockService: Send + Sync {
    async fn fetch_time_blocks(&self, date: Option<NaiveDate>) -> client::Result<Vec<TimeBlock>>;
    async fn create_time_block(&self, write: &TimeBlockWrite) -> client::Result<TimeBlock>;
    async fn update_time_block(&self, write: &TimeBlockWrite) -> client::Result<TimeBlock>;
    async fn delete_time_block(&self, id: Uuid) -> client::Result<()>;
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn fetch_profile(&self) -> client::Result<Profile>;
    async fn update_profile(&self, update: &ProfileUpdate) -> client::Result<Profile>;
}

#[async_trait]
impl<T: TimeBlockService + ?Sized> TimeBlockService for Arc<T> {
    async fn fetch_time_blocks(&self, date: Option<NaiveDate>) -> client::Result<Vec<TimeBlock>> {
        (**self).fetch_time_blocks(date).await
    }

    async fn create_time_block(&self, write: &TimeBlockWrite) -> client::Result<TimeBlock> {
        (**self).create_time_block(write).await
    }

    async fn update_time_block(&self, write: &TimeBlockWrite) -> client::Result<TimeBlock> {
        (**self).update_time_block(write).await
    }

    async fn delete_time_block(&self, id: Uuid) -> client::Result<()> {
        (**self).delete_time_block(id).await
    }
}

#[async_trait]
impl<T: ProfileService + ?Sized> ProfileService for Arc<T> {
    async fn fetch_profile(&self) -> client::Result<Profile> {
        (**self).fetch_profile().await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> client::Result<Profile> {
        (**self).update_profile(update).await
    }
}
