use std::{path::Path, sync::Arc};

use agdb::{DbAny, DbId, QueryBuilder, QueryResult};
use derive_more::Deref;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::repository::{
    db::models::{CURRENT_MODEL_VERSION, ModelVersion},
    entities::{Error, Result},
};

pub(crate) mod models;

/// Root node every profile is linked from
pub(crate) const PROFILES: &str = "profiles";
/// Root node every time block is linked from
pub(crate) const TIME_BLOCKS: &str = "time_blocks";
const MODEL_VERSION: &str = "model_version";

#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
}

impl Db {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path.to_string_lossy();
        info!("Opening database at {path_str}");

        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_file(&path_str)?)),
        };

        db.init()?;

        Ok(db)
    }

    /// Create a memory backed database
    pub fn in_memory() -> Result<Self> {
        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_memory("lifelog")?)),
        };

        db.init()?;

        Ok(db)
    }

    fn init(&mut self) -> Result<()> {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count == 0 {
            self.db.write().transaction_mut(|t| -> Result<()> {
                t.exec_mut(
                    // Insert aliases if they don't exist
                    QueryBuilder::insert()
                        .nodes()
                        .aliases([PROFILES, TIME_BLOCKS, MODEL_VERSION])
                        .query(),
                )?;

                let model_version_id = inserted_id(
                    t.exec_mut(
                        QueryBuilder::insert()
                            .element(ModelVersion::default())
                            .query(),
                    )?,
                )?;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from(MODEL_VERSION)
                        .to(model_version_id)
                        .query(),
                )?;

                Ok(())
            })?;

            debug!("Initialized empty database at model version {CURRENT_MODEL_VERSION}");
        }

        let model_version: Option<ModelVersion> = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<ModelVersion>()
                    .search()
                    .from(MODEL_VERSION)
                    .where_()
                    .neighbor()
                    .query(),
            )?
            .try_into()
            .ok();

        match model_version {
            Some(mv) if mv.version() > CURRENT_MODEL_VERSION => Err(Error::UnsupportedModelVersion {
                found: mv.version(),
                supported: CURRENT_MODEL_VERSION,
            }),
            Some(_) => Ok(()),
            None => Err(Error::MissingModelVersion),
        }
    }
}

/// The id of the first element returned by an insert query.
pub(crate) fn inserted_id(result: QueryResult) -> Result<DbId> {
    result
        .elements
        .first()
        .map(|e| e.id)
        .ok_or(Error::EmptyResult)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reopen_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifelog.db");

        {
            let db = Db::open(&path).unwrap();
            assert_eq!(
                db.read()
                    .exec(QueryBuilder::select().aliases().query())
                    .unwrap()
                    .result,
                3
            );
        }

        // Opening an initialised file must not insert the roots a second time
        let db = Db::open(&path).unwrap();
        assert_eq!(
            db.read()
                .exec(QueryBuilder::select().aliases().query())
                .unwrap()
                .result,
            3
        );
    }
}
