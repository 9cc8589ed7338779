//! Worker roster and session set loading
//!
//! `servers.json` holds a JSON array of `host:port` strings and
//! `sessions.json` a positionally aligned array of session objects. Both are
//! read from disk on every dispatch; nothing is cached between requests.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, RosterError>;

/// Ordered worker addresses; index `i` pairs with session `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerRoster(pub Vec<String>);

impl WorkerRoster {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

/// Opaque per-worker session objects, forwarded verbatim into task payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSet(pub Vec<Value>);

impl SessionSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }
}

/// Read and deserialize a JSON document.
///
/// Missing files, unreadable files and malformed JSON all fail; a document
/// whose shape does not match `T` is reported as a parse failure too.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = tokio::fs::read(path).await.map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Error reading JSON file");
        RosterError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    serde_json::from_slice(&data).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Error parsing JSON file");
        RosterError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub async fn load_roster(path: &Path) -> Result<WorkerRoster> {
    load_json(path).await.map(WorkerRoster)
}

pub async fn load_sessions(path: &Path) -> Result<SessionSet> {
    load_json(path).await.map(SessionSet)
}
