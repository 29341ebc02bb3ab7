use agdb::{DbId, DbType};

mod v1;

pub(crate) use v1::{ProfileModel, TimeBlockModel};

pub(crate) const CURRENT_MODEL_VERSION: u64 = 1;

/// Schema version of the data stored in a database file.
#[derive(Debug, Clone, DbType, PartialEq, PartialOrd)]
pub(crate) struct ModelVersion {
    pub(crate) db_id: Option<DbId>,
    pub(crate) version: u64,
}

impl ModelVersion {
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for ModelVersion {
    fn default() -> Self {
        Self {
            db_id: None,
            version: CURRENT_MODEL_VERSION,
        }
    }
}
