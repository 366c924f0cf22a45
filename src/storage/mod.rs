//! Persistent storage
//!
//! This module handles data persistence for settings and conversations.

pub mod conversations;
pub mod settings;

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine application data directory")]
    NoDataDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Get the application data directory, creating it if needed
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    let dirs = ProjectDirs::from("com", "ollamo", "ollamo").ok_or(StorageError::NoDataDir)?;
    let dir = dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
