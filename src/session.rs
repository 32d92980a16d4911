use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::storage::{ConfigFile, Session};

pub const SESSION_PATH: &str = "~/.config/sosika-admin/session.json";
pub const CONFIG_PATH: &str = "~/.config/sosika-admin/config.json";

pub fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Path {} is invalid", path))?;
    Ok(Path::new(expanded.as_ref()).to_owned())
}

fn read_if_found(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Stored admin session, if anyone has logged in
pub fn read(path: &Path) -> Result<Option<Session>> {
    read_if_found(path)?
        .map(|c| {
            serde_json::from_str::<Session>(&c)
                .with_context(|| format!("Error de-serialising session file {:?}", path))
        })
        .transpose()
}

pub fn write(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error ensuring path {:?} exists", parent))?;
    }
    let session = serde_json::to_string(session)?;
    std::fs::write(path, session).with_context(|| "Error writing session file")
}

/// Returns whether there was a session to remove
pub fn clear(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Error removing session file {:?}", path)),
    }
}

// A missing config file is the same as an empty one
pub fn read_config(path: &Path) -> Result<ConfigFile> {
    read_if_found(path)?
        .map(|c| {
            serde_json::from_str::<ConfigFile>(&c)
                .with_context(|| format!("Error de-serialising config file {:?}", path))
        })
        .unwrap_or_else(|| Ok(ConfigFile::default()))
}
