//! Core of LifeLog: persistent storage of profiles and 15-minute time blocks,
//! session tokens, the HTTP client for the LifeLog API, and the state behind
//! the time-box and profile views.

use std::path::PathBuf;

use thiserror::Error;

pub mod client;
pub mod fs;
pub mod instant;
pub mod repository;
pub mod session;
pub mod timebox;
pub mod views;

pub use repository::Repository;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Repository(#[from] repository::Error),
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("$HOME must be set to locate the LifeLog directories")]
    NoHome,
}
