use lifelog_lib::{client, session::SessionError, views::ViewError};
use sysexits::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Lib(#[from] lifelog_lib::Error),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("Failed to issue session: {0}")]
    Session(#[from] SessionError),
    #[error("No session stored, run `lifelog session new` first")]
    NoSession,
    #[error("{0}")]
    InvalidInput(String),
}

impl From<client::Error> for CliError {
    fn from(err: client::Error) -> Self {
        CliError::View(ViewError::Request(err))
    }
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Lib(_) => ExitCode::Config,
            CliError::View(ViewError::Request(err)) => request_exit_code(err),
            CliError::View(_) | CliError::InvalidInput(_) => ExitCode::DataErr,
            CliError::Session(SessionError::TtlOutOfRange) => ExitCode::Usage,
            CliError::Session(_) => ExitCode::Software,
            CliError::NoSession => ExitCode::NoPerm,
        }
    }
}

fn request_exit_code(err: &client::Error) -> ExitCode {
    match err {
        client::Error::Transport(_) => ExitCode::Unavailable,
        client::Error::Api { status: 401, .. } => ExitCode::NoPerm,
        client::Error::Api { status, .. } if (400..500).contains(status) => ExitCode::DataErr,
        client::Error::Api { .. } => ExitCode::Software,
        client::Error::Malformed(_) => ExitCode::Protocol,
        client::Error::Encode(_) => ExitCode::Software,
    }
}
