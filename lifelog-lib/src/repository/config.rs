use std::{fs, path::PathBuf, sync::Arc};

use chrono::TimeDelta;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    fs::{config_dir, state_dir},
    session::SessionKey,
};

const FILE_NAME: &str = "lifelog.toml";
const DATABASE_FILE_NAME: &str = "lifelog.db";
const DEFAULT_SESSION_TTL_HOURS: u32 = 24 * 7;

/// Handle to the core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The core configuration shared by the server and the CLI, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Database file. Defaults to `lifelog.db` in the state directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Secret session tokens are signed with
    #[serde(default)]
    pub session_secret: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database: None,
            session_secret: SessionKey::generate_secret(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl CoreConfig {
    /// Load `lifelog.toml`, writing a fresh one if it doesn't exist yet. A file without a
    /// session secret gets one generated and saved.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(FILE_NAME);

        if !path.exists() {
            info!("No configuration at {}, creating one", path.display());
            let cfg = Self::default();
            cfg.save()?;
            return Ok(cfg);
        }

        let contents = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let mut cfg: Self =
            toml::from_str(&contents).map_err(|source| Error::ConfigParse { path, source })?;

        if cfg.session_secret.is_empty() {
            debug!("Configuration has no session secret, generating one");
            cfg.session_secret = SessionKey::generate_secret();
            cfg.save()?;
        }

        Ok(cfg)
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        let path = config_dir()?.join(FILE_NAME);

        fs::write(&path, contents).map_err(|source| Error::Io { path, source })
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(state_dir()?.join(DATABASE_FILE_NAME)),
        }
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(&self.session_secret)
    }

    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.session_ttl_hours))
    }

    /// A configuration that never touches the filesystem.
    pub fn mock() -> Self {
        Self {
            database: None,
            session_secret: "lifelog-test-secret".to_string(),
            session_ttl_hours: 1,
        }
    }
}

fn default_session_ttl_hours() -> u32 {
    DEFAULT_SESSION_TTL_HOURS
}
