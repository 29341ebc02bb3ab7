use std::str::FromStr;

use agdb::{Comparison, DbAny, DbId, QueryBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;
use uuid::Uuid;

use crate::{
    instant,
    repository::{
        db::{Db, PROFILES, inserted_id, models::ProfileModel},
        entities::{Error, Result, now_millis, optional, timestamp},
    },
    timebox::{format_date, parse_date},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::M => "Male",
            Gender::F => "Female",
        }
    }
}

/// A user's profile. There is at most one per account and it shares the account's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub location: Option<String>,
    #[serde(serialize_with = "instant::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "instant::serialize")]
    pub updated_at: DateTime<Utc>,
}

/// A full replacement of the editable profile fields. Optional fields left as `None` are
/// cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProfileFieldError {
    #[error("First name is required")]
    FirstNameRequired,
    #[error("Last name is required")]
    LastNameRequired,
    #[error("Invalid date of birth `{0}`, expected YYYY-MM-DD")]
    InvalidDateOfBirth(String),
    #[error("Invalid gender `{0}`, expected M or F")]
    InvalidGender(String),
}

impl ProfileUpdate {
    /// Validate raw text input. Values are trimmed and blank optional values count as absent.
    pub fn parse(
        first_name: &str,
        last_name: &str,
        date_of_birth: &str,
        gender: &str,
        location: &str,
    ) -> std::result::Result<Self, Vec<ProfileFieldError>> {
        let mut errors = Vec::new();

        let first_name = first_name.trim();
        if first_name.is_empty() {
            errors.push(ProfileFieldError::FirstNameRequired);
        }

        let last_name = last_name.trim();
        if last_name.is_empty() {
            errors.push(ProfileFieldError::LastNameRequired);
        }

        let date_of_birth = match date_of_birth.trim() {
            "" => None,
            raw => parse_date(raw).or_else(|| {
                errors.push(ProfileFieldError::InvalidDateOfBirth(raw.to_string()));
                None
            }),
        };

        let gender = match gender.trim() {
            "" => None,
            raw => Gender::from_str(raw).ok().or_else(|| {
                errors.push(ProfileFieldError::InvalidGender(raw.to_string()));
                None
            }),
        };

        let location = optional(location.trim().to_string());

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth,
            gender,
            location,
        })
    }
}

impl Profile {
    /// Fetch the profile of `user_id`, creating a blank one first if there is none.
    pub(crate) fn get_or_create(db: &Db, user_id: Uuid) -> Result<Self> {
        let mut db = db.write();

        let model = match Self::find(&db, user_id)? {
            Some(model) => model,
            None => Self::insert(&mut db, user_id)?,
        };

        model.try_into()
    }

    /// Replace the editable fields of `user_id`'s profile, creating it first if needed.
    pub(crate) fn update(db: &Db, user_id: Uuid, update: &ProfileUpdate) -> Result<Self> {
        let mut db = db.write();

        let mut model = match Self::find(&db, user_id)? {
            Some(model) => model,
            None => Self::insert(&mut db, user_id)?,
        };

        model.first_name = update.first_name.clone();
        model.last_name = update.last_name.clone();
        model.date_of_birth = update.date_of_birth.map(format_date).unwrap_or_default();
        model.gender = update
            .gender
            .map(|g| g.as_ref().to_string())
            .unwrap_or_default();
        model.location = update.location.clone().unwrap_or_default();
        model.updated_at = now_millis();

        let db_id = model.db_id.ok_or(Error::EmptyResult)?;
        db.exec_mut(
            QueryBuilder::insert()
                .values([[
                    ("first_name", model.first_name.clone()).into(),
                    ("last_name", model.last_name.clone()).into(),
                    ("date_of_birth", model.date_of_birth.clone()).into(),
                    ("gender", model.gender.clone()).into(),
                    ("location", model.location.clone()).into(),
                    ("updated_at", model.updated_at).into(),
                ]])
                .ids(db_id)
                .query(),
        )?;

        debug!("Updated profile {user_id}");

        model.try_into()
    }

    fn find(db: &DbAny, user_id: Uuid) -> Result<Option<ProfileModel>> {
        let models: Vec<ProfileModel> = db
            .exec(
                QueryBuilder::select()
                    .elements::<ProfileModel>()
                    .search()
                    .from(PROFILES)
                    .where_()
                    .neighbor()
                    .and()
                    .key("id")
                    .value(Comparison::Equal(user_id.to_string().into()))
                    .query(),
            )?
            .try_into()?;

        Ok(models.into_iter().next())
    }

    fn insert(db: &mut DbAny, user_id: Uuid) -> Result<ProfileModel> {
        let mut model = ProfileModel::new(&user_id.to_string(), now_millis());

        let profile_id = db.transaction_mut(|t| -> Result<DbId> {
            let profile_id =
                inserted_id(t.exec_mut(QueryBuilder::insert().element(model.clone()).query())?)?;

            t.exec_mut(
                QueryBuilder::insert()
                    .edges()
                    .from(PROFILES)
                    .to(profile_id)
                    .query(),
            )?;

            Ok(profile_id)
        })?;
        model.db_id = Some(profile_id);

        debug!("Created blank profile for account {user_id}");

        Ok(model)
    }
}

impl TryFrom<ProfileModel> for Profile {
    type Error = Error;

    fn try_from(model: ProfileModel) -> Result<Self> {
        let id = Uuid::parse_str(&model.id).map_err(|_| Error::Corrupt {
            field: "id",
            value: model.id.clone(),
        })?;

        let date_of_birth = optional(model.date_of_birth)
            .map(|raw| {
                parse_date(&raw).ok_or_else(|| Error::Corrupt {
                    field: "date_of_birth",
                    value: raw.clone(),
                })
            })
            .transpose()?;

        let gender = optional(model.gender)
            .map(|raw| {
                Gender::from_str(&raw).map_err(|_| Error::Corrupt {
                    field: "gender",
                    value: raw.clone(),
                })
            })
            .transpose()?;

        Ok(Self {
            id,
            first_name: model.first_name,
            last_name: model.last_name,
            date_of_birth,
            gender,
            location: optional(model.location),
            created_at: timestamp("created_at", model.created_at)?,
            updated_at: timestamp("updated_at", model.updated_at)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Repository;

    fn update(first: &str, last: &str) -> ProfileUpdate {
        ProfileUpdate {
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: None,
            gender: None,
            location: None,
        }
    }

    #[test]
    fn test_first_read_creates_blank_profile() {
        let repo = Repository::in_memory().unwrap();
        let user = Uuid::new_v4();

        let profile = repo.profile(user).unwrap();

        assert_eq!(profile.id, user);
        assert_eq!(profile.first_name, "");
        assert_eq!(profile.last_name, "");
        assert_eq!(profile.date_of_birth, None);
        assert_eq!(profile.gender, None);
        assert_eq!(profile.location, None);
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn test_second_read_returns_same_profile() {
        let repo = Repository::in_memory().unwrap();
        let user = Uuid::new_v4();

        let first = repo.profile(user).unwrap();
        let second = repo.profile(user).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_profiles_are_per_account() {
        let repo = Repository::in_memory().unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.update_profile(alice, &update("Alice", "Smith")).unwrap();

        assert_eq!(repo.profile(bob).unwrap().first_name, "");
        assert_eq!(repo.profile(alice).unwrap().first_name, "Alice");
    }

    #[test]
    fn test_update_replaces_full_record() {
        let repo = Repository::in_memory().unwrap();
        let user = Uuid::new_v4();

        let full = ProfileUpdate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10),
            gender: Some(Gender::F),
            location: Some("London".into()),
        };
        let updated = repo.update_profile(user, &full).unwrap();
        assert_eq!(updated.date_of_birth, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert_eq!(updated.gender, Some(Gender::F));
        assert_eq!(updated.location.as_deref(), Some("London"));

        // Omitted optional fields are cleared, not merged
        let updated = repo.update_profile(user, &update("Ada", "King")).unwrap();
        assert_eq!(updated.last_name, "King");
        assert_eq!(updated.date_of_birth, None);
        assert_eq!(updated.gender, None);
        assert_eq!(updated.location, None);

        assert_eq!(repo.profile(user).unwrap(), updated);
    }

    #[test]
    fn test_update_creates_missing_profile() {
        let repo = Repository::in_memory().unwrap();
        let user = Uuid::new_v4();

        let updated = repo.update_profile(user, &update("Grace", "Hopper")).unwrap();

        assert_eq!(updated.id, user);
        assert_eq!(repo.profile(user).unwrap().first_name, "Grace");
    }

    #[test]
    fn test_parse_update() {
        let parsed = ProfileUpdate::parse(" Ada ", "Lovelace", "1815-12-10", "F", "  ").unwrap();

        assert_eq!(parsed.first_name, "Ada");
        assert_eq!(parsed.date_of_birth, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert_eq!(parsed.gender, Some(Gender::F));
        assert_eq!(parsed.location, None);
    }

    #[test]
    fn test_parse_update_collects_errors() {
        let errors = ProfileUpdate::parse("", " ", "10/12/1815", "X", "").unwrap_err();

        assert_eq!(
            errors,
            vec![
                ProfileFieldError::FirstNameRequired,
                ProfileFieldError::LastNameRequired,
                ProfileFieldError::InvalidDateOfBirth("10/12/1815".into()),
                ProfileFieldError::InvalidGender("X".into()),
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let repo = Repository::in_memory().unwrap();
        let profile = repo.profile(Uuid::new_v4()).unwrap();

        let json = serde_json::to_value(&profile).unwrap();

        assert!(json["date_of_birth"].is_null());
        assert!(json["gender"].is_null());
        assert!(json["created_at"].as_str().unwrap().ends_with('Z'));
    }
}
