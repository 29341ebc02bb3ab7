use agdb::{DbId, DbType};

/// Stored form of a profile. Optional fields are kept as empty strings.
#[derive(Debug, Clone, DbType, PartialEq, PartialOrd)]
pub(crate) struct ProfileModel {
    pub(crate) db_id: Option<DbId>,
    /// The account this profile belongs to
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    /// `YYYY-MM-DD`
    pub(crate) date_of_birth: String,
    pub(crate) gender: String,
    pub(crate) location: String,
    /// Milliseconds since the Unix epoch
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl ProfileModel {
    pub fn new(id: &str, now: i64) -> Self {
        Self {
            db_id: None,
            id: id.to_string(),
            first_name: "".into(),
            last_name: "".into(),
            date_of_birth: "".into(),
            gender: "".into(),
            location: "".into(),
            created_at: now,
            updated_at: now,
        }
    }
}
