use std::sync::Arc;

use lifelog_lib::{Repository, session::SessionKey};

use crate::config::Config;

pub struct AppState {
    pub repo: Repository,
    pub sessions: SessionKey,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Arc<Self> {
        let sessions = repo.config().session_key();

        Arc::new(Self {
            repo,
            sessions,
            config,
        })
    }
}
