use std::fs;

use lifelog_lib::{Error, fs::config_dir};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const FILE_NAME: &str = "client.toml";

/// Where the CLI finds the server and how it authenticates, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub session_token: Option<String>,
    /// Account the stored session was issued for
    pub account_id: Option<Uuid>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            session_token: None,
            account_id: None,
        }
    }
}

impl ClientConfig {
    pub fn load() -> lifelog_lib::Result<Self> {
        let path = config_dir()?.join(FILE_NAME);

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| Error::ConfigParse { path, source })
    }

    pub fn save(&self) -> lifelog_lib::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        let path = config_dir()?.join(FILE_NAME);

        fs::write(&path, contents).map_err(|source| Error::Io { path, source })
    }
}
