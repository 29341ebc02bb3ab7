//! Typed wrappers around the LifeLog HTTP API.
//!
//! Every call unwraps the `{ data, message? }` envelope. Non-2xx responses become
//! [`Error::Api`] carrying the server's `error` string, or a generic message when the server
//! didn't send one.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, StatusCode, header::COOKIE};
use serde::{Deserialize, de::DeserializeOwned, de::IgnoredAny};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    repository::{Profile, ProfileUpdate, TimeBlock, TimeBlockWrite},
    session::SESSION_COOKIE,
    timebox::format_date,
    views::{ProfileService, TimeBlockService},
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },
    #[error("Unexpected response from server: {0}")]
    Malformed(String),
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Handle to a LifeLog server, optionally carrying a session token.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_profile(&self) -> Result<Profile> {
        self.request(Method::GET, "/api/profile", &[], None, "Failed to fetch profile")
            .await
            .and_then(required)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        let body = serde_json::to_value(update)?;

        self.request(
            Method::POST,
            "/api/profile",
            &[],
            Some(body),
            "Failed to update profile",
        )
        .await
        .and_then(required)
    }

    /// Blocks of the caller, limited to the UTC day `date` when given.
    pub async fn fetch_time_blocks(&self, date: Option<NaiveDate>) -> Result<Vec<TimeBlock>> {
        let query: Vec<(&str, String)> = date
            .map(|d| vec![("date", format_date(d))])
            .unwrap_or_default();

        self.request(
            Method::GET,
            "/api/timeboxes",
            &query,
            None,
            "Failed to fetch time blocks",
        )
        .await
        .and_then(required)
    }

    pub async fn create_time_block(&self, write: &TimeBlockWrite) -> Result<TimeBlock> {
        self.save_time_block(write, "Failed to create time block")
            .await
    }

    /// Same upsert endpoint as [`Client::create_time_block`], only the fallback message differs.
    pub async fn update_time_block(&self, write: &TimeBlockWrite) -> Result<TimeBlock> {
        self.save_time_block(write, "Failed to update time block")
            .await
    }

    pub async fn delete_time_block(&self, id: Uuid) -> Result<()> {
        let _: Envelope<IgnoredAny> = self
            .request(
                Method::DELETE,
                "/api/timeboxes",
                &[("id", id.to_string())],
                None,
                "Failed to delete time block",
            )
            .await?;

        Ok(())
    }

    async fn save_time_block(&self, write: &TimeBlockWrite, fallback: &str) -> Result<TimeBlock> {
        let body = serde_json::to_value(write)?;

        self.request(Method::POST, "/api/timeboxes", &[], Some(body), fallback)
            .await
            .and_then(required)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
        fallback: &str,
    ) -> Result<Envelope<T>> {
        let url = format!("{}{path}", self.base_url);
        debug!("{method} {url}");

        let mut req = self.http.request(method, &url);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(token) = &self.session {
            req = req.header(COOKIE, format!("{SESSION_COOKIE}={token}"));
        }

        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &text, fallback));
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| Error::Malformed(e.to_string()))?;

        if let Some(message) = &envelope.message {
            debug!("{message}");
        }

        Ok(envelope)
    }
}

fn api_error(status: StatusCode, body: &str, fallback: &str) -> Error {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let details = envelope.as_ref().and_then(|e| e.details.clone());
    let message = envelope
        .and_then(|e| e.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    Error::Api {
        status: status.as_u16(),
        message,
        details,
    }
}

fn required<T>(envelope: Envelope<T>) -> Result<T> {
    envelope
        .data
        .ok_or_else(|| Error::Malformed("response has no data".to_string()))
}

#[async_trait]
impl TimeBlockService for Client {
    async fn fetch_time_blocks(&self, date: Option<NaiveDate>) -> Result<Vec<TimeBlock>> {
        Client::fetch_time_blocks(self, date).await
    }

    async fn create_time_block(&self, write: &TimeBlockWrite) -> Result<TimeBlock> {
        Client::create_time_block(self, write).await
    }

    async fn update_time_block(&self, write: &TimeBlockWrite) -> Result<TimeBlock> {
        Client::update_time_block(self, write).await
    }

    async fn delete_time_block(&self, id: Uuid) -> Result<()> {
        Client::delete_time_block(self, id).await
    }
}

#[async_trait]
impl ProfileService for Client {
    async fn fetch_profile(&self) -> Result<Profile> {
        Client::fetch_profile(self).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        Client::update_profile(self, update).await
    }
}
