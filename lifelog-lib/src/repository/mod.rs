use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::repository::{
    config::{Cfg, CoreConfig},
    db::Db,
};

mod db;

pub mod config;
pub mod entities;

pub use entities::{
    Error, Gender, Profile, ProfileFieldError, ProfileUpdate, Result, TimeBlock, TimeBlockWrite,
};

/// Central access point for all persistent data.
///
/// The [`Repository`] owns the database handle and the core configuration. Every query goes
/// through it and every query is scoped to a single account.
#[derive(Clone, Debug)]
pub struct Repository {
    db: Db,
    cfg: Cfg,
}

impl Repository {
    /// Open the repository described by `lifelog.toml`.
    pub fn new() -> crate::Result<Self> {
        Self::open(CoreConfig::load()?)
    }

    pub fn open(cfg: CoreConfig) -> crate::Result<Self> {
        let path = cfg.database_path()?;

        Ok(Self {
            db: Db::open(&path)?,
            cfg: Arc::new(RwLock::new(cfg)),
        })
    }

    /// A repository backed by an in-memory database and a mock configuration.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Db::in_memory()?,
            cfg: Arc::new(RwLock::new(CoreConfig::mock())),
        })
    }

    pub fn config(&self) -> CoreConfig {
        self.cfg.read().clone()
    }

    pub fn profile(&self, user_id: Uuid) -> Result<Profile> {
        Profile::get_or_create(&self.db, user_id)
    }

    pub fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
        Profile::update(&self.db, user_id, update)
    }

    pub fn time_blocks(&self, user_id: Uuid, date: Option<NaiveDate>) -> Result<Vec<TimeBlock>> {
        TimeBlock::list(&self.db, user_id, date)
    }

    pub fn upsert_time_block(
        &self,
        user_id: Uuid,
        time_block: DateTime<Utc>,
        description: Option<&str>,
    ) -> Result<TimeBlock> {
        TimeBlock::upsert(&self.db, user_id, time_block, description)
    }

    /// Returns whether a block was removed. Ids that don't exist or belong to another account
    /// remove nothing.
    pub fn delete_time_block(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        TimeBlock::remove(&self.db, user_id, id)
    }
}
