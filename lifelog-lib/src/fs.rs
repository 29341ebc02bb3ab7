use std::{fs::create_dir_all, path::PathBuf};

use xdg::BaseDirectories;

use crate::{Error, Result};

/// Returns the path to the LifeLog configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> Result<PathBuf> {
    ensure(xdg_prefix().get_config_home())
}

/// Returns the path to the LifeLog state directory, where the database lives by default. If it
/// doesn't exist when this function is called, it will be created.
pub fn state_dir() -> Result<PathBuf> {
    ensure(xdg_prefix().get_state_home())
}

fn ensure(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = path.ok_or(Error::NoHome)?;

    create_dir_all(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

fn xdg_prefix() -> BaseDirectories {
    BaseDirectories::with_prefix("lifelog")
}
