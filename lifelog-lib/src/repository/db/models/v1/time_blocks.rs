use agdb::{DbId, DbType};

#[derive(Debug, Clone, DbType, PartialEq, PartialOrd)]
pub(crate) struct TimeBlockModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) id: String,
    pub(crate) user_id: String,
    /// Start of the block in milliseconds since the Unix epoch
    pub(crate) time_block: i64,
    /// Empty when the block has no description
    pub(crate) description: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl TimeBlockModel {
    pub fn new(id: &str, user_id: &str, time_block: i64, description: &str, now: i64) -> Self {
        Self {
            db_id: None,
            id: id.to_string(),
            user_id: user_id.to_string(),
            time_block,
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
