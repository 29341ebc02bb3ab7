use agdb::{Comparison, DbId, QueryBuilder, QueryResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    instant,
    repository::{
        db::{Db, TIME_BLOCKS, inserted_id, models::TimeBlockModel},
        entities::{Error, Result, now_millis, optional, timestamp},
    },
    timebox::day_bounds,
};

/// A 15-minute block of a user's day, identified by its UTC start instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(serialize_with = "instant::serialize")]
    pub time_block: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(serialize_with = "instant::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "instant::serialize")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for saving a block. Creating and updating share it since both are the same upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlockWrite {
    #[serde(serialize_with = "instant::serialize")]
    pub time_block: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TimeBlock {
    /// All of `user_id`'s blocks in ascending order, optionally limited to one UTC day.
    pub(crate) fn list(db: &Db, user_id: Uuid, date: Option<NaiveDate>) -> Result<Vec<Self>> {
        let mut models: Vec<TimeBlockModel> = db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<TimeBlockModel>()
                    .search()
                    .from(TIME_BLOCKS)
                    .where_()
                    .neighbor()
                    .and()
                    .key("user_id")
                    .value(Comparison::Equal(user_id.to_string().into()))
                    .query(),
            )?
            .try_into()?;

        if let Some(date) = date {
            let (start, end) = day_bounds(date);
            let range = start.timestamp_millis()..=end.timestamp_millis();
            models.retain(|m| range.contains(&m.time_block));
        }

        models.sort_by_key(|m| m.time_block);

        models.into_iter().map(TimeBlock::try_from).collect()
    }

    /// Insert or update the block of `user_id` starting at `time_block`. There is never more
    /// than one block per owner and instant.
    pub(crate) fn upsert(
        db: &Db,
        user_id: Uuid,
        time_block: DateTime<Utc>,
        description: Option<&str>,
    ) -> Result<Self> {
        let millis = time_block.timestamp_millis();
        let description = description.unwrap_or_default();
        let now = now_millis();

        // The write lock is held from lookup to insert so concurrent upserts of the same
        // instant can't both insert.
        let mut db = db.write();

        let existing = first(db.exec(
            QueryBuilder::select()
                .elements::<TimeBlockModel>()
                .search()
                .from(TIME_BLOCKS)
                .where_()
                .neighbor()
                .and()
                .key("user_id")
                .value(Comparison::Equal(user_id.to_string().into()))
                .and()
                .key("time_block")
                .value(Comparison::Equal(millis.into()))
                .query(),
        )?)?;

        let model = match existing {
            Some(mut model) => {
                let db_id = model.db_id.ok_or(Error::EmptyResult)?;
                db.exec_mut(
                    QueryBuilder::insert()
                        .values([[
                            ("description", description).into(),
                            ("updated_at", now).into(),
                        ]])
                        .ids(db_id)
                        .query(),
                )?;

                model.description = description.to_string();
                model.updated_at = now;

                debug!("Updated time block {} of {user_id}", model.id);

                model
            }
            None => {
                let mut model = TimeBlockModel::new(
                    &Uuid::new_v4().to_string(),
                    &user_id.to_string(),
                    millis,
                    description,
                    now,
                );

                let block_id = db.transaction_mut(|t| -> Result<DbId> {
                    let block_id = inserted_id(
                        t.exec_mut(QueryBuilder::insert().element(model.clone()).query())?,
                    )?;

                    t.exec_mut(
                        QueryBuilder::insert()
                            .edges()
                            .from(TIME_BLOCKS)
                            .to(block_id)
                            .query(),
                    )?;

                    Ok(block_id)
                })?;
                model.db_id = Some(block_id);

                debug!("Created time block {} of {user_id}", model.id);

                model
            }
        };

        model.try_into()
    }

    /// Remove the block `id` if it belongs to `user_id`. Returns whether anything was removed.
    pub(crate) fn remove(db: &Db, user_id: Uuid, id: Uuid) -> Result<bool> {
        let mut db = db.write();

        let existing = first(db.exec(
            QueryBuilder::select()
                .elements::<TimeBlockModel>()
                .search()
                .from(TIME_BLOCKS)
                .where_()
                .neighbor()
                .and()
                .key("id")
                .value(Comparison::Equal(id.to_string().into()))
                .and()
                .key("user_id")
                .value(Comparison::Equal(user_id.to_string().into()))
                .query(),
        )?)?;

        let Some(db_id) = existing.and_then(|m| m.db_id) else {
            debug!("No time block {id} owned by {user_id} to remove");
            return Ok(false);
        };

        db.exec_mut(QueryBuilder::remove().ids(db_id).query())?;

        debug!("Removed time block {id} of {user_id}");

        Ok(true)
    }
}

fn first(result: QueryResult) -> Result<Option<TimeBlockModel>> {
    let models: Vec<TimeBlockModel> = result.try_into()?;

    Ok(models.into_iter().next())
}

impl TryFrom<TimeBlockModel> for TimeBlock {
    type Error = Error;

    fn try_from(model: TimeBlockModel) -> Result<Self> {
        let parse_uuid = |field: &'static str, value: &str| {
            Uuid::parse_str(value).map_err(|_| Error::Corrupt {
                field,
                value: value.to_string(),
            })
        };

        Ok(Self {
            id: parse_uuid("id", &model.id)?,
            user_id: parse_uuid("user_id", &model.user_id)?,
            time_block: timestamp("time_block", model.time_block)?,
            description: optional(model.description),
            created_at: timestamp("created_at", model.created_at)?,
            updated_at: timestamp("updated_at", model.updated_at)?,
        })
    }
}
