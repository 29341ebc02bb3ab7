use tracing::debug;

use crate::{
    repository::{Gender, Profile, ProfileFieldError, ProfileUpdate},
    timebox::format_date,
    views::{ProfileService, ViewError},
};

/// Shown in place of empty profile values
pub const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    DateOfBirth,
    Gender,
    Location,
}

/// Raw text of the profile edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub location: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            date_of_birth: profile.date_of_birth.map(format_date).unwrap_or_default(),
            gender: profile
                .gender
                .map(|g| g.as_ref().to_string())
                .unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();

        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::DateOfBirth => self.date_of_birth = value,
            Field::Gender => self.gender = value,
            Field::Location => self.location = value,
        }
    }

    pub fn validate(&self) -> Result<ProfileUpdate, Vec<ProfileFieldError>> {
        ProfileUpdate::parse(
            &self.first_name,
            &self.last_name,
            &self.date_of_birth,
            &self.gender,
            &self.location,
        )
    }
}

/// The profile page: the fetched record plus an edit form seeded from it.
#[derive(Debug)]
pub struct ProfileView<S> {
    service: S,
    profile: Option<Profile>,
    form: ProfileForm,
    dirty: bool,
    error: Option<String>,
}

impl<S: ProfileService> ProfileView<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            profile: None,
            form: ProfileForm::default(),
            dirty: false,
            error: None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The message of the last failed load or submit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self) -> Result<(), ViewError> {
        match self.service.fetch_profile().await {
            Ok(profile) => {
                self.replace(profile);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn input(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
        self.dirty = true;
    }

    /// Discard edits and reseed the form from the loaded profile.
    pub fn reset(&mut self) {
        self.form = self
            .profile
            .as_ref()
            .map(ProfileForm::from_profile)
            .unwrap_or_default();
        self.dirty = false;
        self.error = None;
    }

    /// Submit the form if it changed. Invalid input is refused before any request; either kind
    /// of failure keeps the form as typed and records the message in [`ProfileView::error`].
    pub async fn submit(&mut self) -> Result<bool, ViewError> {
        if !self.dirty {
            return Ok(false);
        }

        let update = match self.form.validate() {
            Ok(update) => update,
            Err(errors) => {
                let err = ViewError::Invalid(errors);
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        match self.service.update_profile(&update).await {
            Ok(profile) => {
                debug!("Profile {} saved", profile.id);
                self.replace(profile);
                Ok(true)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn replace(&mut self, profile: Profile) {
        self.form = ProfileForm::from_profile(&profile);
        self.profile = Some(profile);
        self.dirty = false;
        self.error = None;
    }
}

/// Label/value pairs for displaying `profile`, with placeholders for empty values.
pub fn details(profile: &Profile) -> Vec<(&'static str, String)> {
    vec![
        ("First name", or_placeholder(Some(&profile.first_name))),
        ("Last name", or_placeholder(Some(&profile.last_name))),
        (
            "Date of birth",
            or_placeholder(profile.date_of_birth.map(format_date).as_deref()),
        ),
        ("Gender", gender_label(profile.gender).to_string()),
        ("Location", or_placeholder(profile.location.as_deref())),
    ]
}

pub fn gender_label(gender: Option<Gender>) -> &'static str {
    gender.map_or(NOT_PROVIDED, |g| g.label())
}

fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use parking_lot::Mutex;
    use uuid::Uuid;

    use super::*;
    use crate::client;

    struct FakeProfiles {
        profile: Mutex<Profile>,
        updates: AtomicUsize,
        fail: AtomicBool,
    }

    impl FakeProfiles {
        fn new() -> Arc<Self> {
            let now = Utc::now();

            Arc::new(Self {
                profile: Mutex::new(Profile {
                    id: Uuid::new_v4(),
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    date_of_birth: None,
                    gender: Some(Gender::F),
                    location: None,
                    created_at: now,
                    updated_at: now,
                }),
                updates: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl ProfileService for FakeProfiles {
        async fn fetch_profile(&self) -> client::Result<Profile> {
            Ok(self.profile.lock().clone())
        }

        async fn update_profile(&self, update: &ProfileUpdate) -> client::Result<Profile> {
            self.updates.fetch_add(1, Ordering::SeqCst);

            if self.fail.load(Ordering::SeqCst) {
                return Err(client::Error::Api {
                    status: 500,
                    message: "Failed to update profile".into(),
                    details: Some("disk full".into()),
                });
            }

            let mut profile = self.profile.lock();
            profile.first_name = update.first_name.clone();
            profile.last_name = update.last_name.clone();
            profile.date_of_birth = update.date_of_birth;
            profile.gender = update.gender;
            profile.location = update.location.clone();
            profile.updated_at = Utc::now();

            Ok(profile.clone())
        }
    }

    #[tokio::test]
    async fn test_load_seeds_form() {
        let mut view = ProfileView::new(FakeProfiles::new());

        view.load().await.unwrap();

        assert_eq!(view.form().first_name, "Ada");
        assert_eq!(view.form().gender, "F");
        assert_eq!(view.form().date_of_birth, "");
        assert!(!view.is_dirty());
    }

    #[tokio::test]
    async fn test_clean_form_is_not_submitted() {
        let fake = FakeProfiles::new();
        let mut view = ProfileView::new(fake.clone());
        view.load().await.unwrap();

        assert!(!view.submit().await.unwrap());
        assert_eq!(fake.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_first_name_is_rejected_locally() {
        let fake = FakeProfiles::new();
        let mut view = ProfileView::new(fake.clone());
        view.load().await.unwrap();

        view.input(Field::FirstName, "");
        let err = view.submit().await.unwrap_err();

        assert!(matches!(err, ViewError::Invalid(_)));
        assert_eq!(view.error(), Some("First name is required"));
        assert_eq!(fake.updates.load(Ordering::SeqCst), 0);
        assert!(view.is_dirty());
    }

    #[tokio::test]
    async fn test_submit_replaces_state() {
        let fake = FakeProfiles::new();
        let mut view = ProfileView::new(fake.clone());
        view.load().await.unwrap();

        view.input(Field::LastName, "King");
        view.input(Field::DateOfBirth, "1815-12-10");
        view.input(Field::Location, "London");
        assert!(view.submit().await.unwrap());

        let profile = view.profile().unwrap();
        assert_eq!(profile.last_name, "King");
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert_eq!(profile.location.as_deref(), Some("London"));
        assert!(!view.is_dirty());
        assert_eq!(view.error(), None);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_error_inline() {
        let fake = FakeProfiles::new();
        let mut view = ProfileView::new(fake.clone());
        view.load().await.unwrap();

        view.input(Field::Location, "Paris");
        fake.fail.store(true, Ordering::SeqCst);
        assert!(view.submit().await.is_err());

        assert_eq!(view.error(), Some("Failed to update profile"));
        assert_eq!(view.form().location, "Paris");
        assert_eq!(view.profile().unwrap().location, None);
        assert!(view.is_dirty());
    }

    #[test]
    fn test_details_placeholders() {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            first_name: String::new(),
            last_name: "Hopper".into(),
            date_of_birth: None,
            gender: Some(Gender::M),
            location: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            details(&profile),
            vec![
                ("First name", NOT_PROVIDED.to_string()),
                ("Last name", "Hopper".to_string()),
                ("Date of birth", NOT_PROVIDED.to_string()),
                ("Gender", "Male".to_string()),
                ("Location", NOT_PROVIDED.to_string()),
            ]
        );
        assert_eq!(gender_label(None), NOT_PROVIDED);
    }
}
