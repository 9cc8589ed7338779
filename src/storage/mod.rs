//! On-disk result sink
//!
//! Worker results land at `<root>/<bundle>/<ip>.json`, pretty-printed with
//! two-space indentation. Repeat saves for the same bundle and IP overwrite
//! the previous file.

use serde_json::Value;
use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid bundle name: {0:?}")]
    InvalidBundle(String),

    #[error("failed to inspect {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, SinkError>;

/// Whether `bundle` names exactly one ordinary directory under the sink root.
///
/// Rejects empty names, `.`/`..`, separators and NUL so a bundle can never
/// address a path outside its own folder.
pub fn is_valid_bundle(bundle: &str) -> bool {
    if bundle.is_empty() || bundle.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(bundle).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Filename stem for a caller address; IPv4-mapped IPv6 collapses to IPv4.
pub fn source_ip_key(ip: IpAddr) -> String {
    ip.to_canonical().to_string()
}

/// Writes worker result payloads under a root directory
#[derive(Debug, Clone)]
pub struct ResultSink {
    root: PathBuf,
}

impl ResultSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn bundle_dir(&self, bundle: &str) -> Result<PathBuf> {
        if !is_valid_bundle(bundle) {
            return Err(SinkError::InvalidBundle(bundle.to_string()));
        }
        Ok(self.root.join(bundle))
    }

    /// Check whether a bundle folder already exists
    pub async fn bundle_exists(&self, bundle: &str) -> Result<bool> {
        let dir = self.bundle_dir(bundle)?;
        tokio::fs::try_exists(&dir)
            .await
            .map_err(|source| SinkError::Stat { path: dir, source })
    }

    /// Persist `payload` as `<root>/<bundle>/<ip>.json`, creating the bundle
    /// folder on demand. Returns the written path.
    pub async fn save(&self, bundle: &str, ip: IpAddr, payload: &Value) -> Result<PathBuf> {
        let dir = self.bundle_dir(bundle)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| SinkError::Write {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(format!("{}.json", source_ip_key(ip)));
        let data = serde_json::to_vec_pretty(payload)?;
        let size = data.len();

        tokio::fs::write(&path, data)
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(bundle, %ip, path = %path.display(), size, "Saved result");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_validation() {
        assert!(is_valid_bundle("job-2024-05-01"));
        assert!(is_valid_bundle("with space"));
        assert!(is_valid_bundle("v1.2"));

        assert!(!is_valid_bundle(""));
        assert!(!is_valid_bundle("."));
        assert!(!is_valid_bundle(".."));
        assert!(!is_valid_bundle("a/b"));
        assert!(!is_valid_bundle("../etc"));
        assert!(!is_valid_bundle("/abs"));
        assert!(!is_valid_bundle("a\\b"));
        assert!(!is_valid_bundle("nul\0byte"));
    }

    #[test]
    fn test_source_ip_key_strips_mapped_prefix() {
        let mapped: IpAddr = "::ffff:1.2.3.4".parse().unwrap();
        assert_eq!(source_ip_key(mapped), "1.2.3.4");

        let v4: IpAddr = "10.0.0.7".parse().unwrap();
        assert_eq!(source_ip_key(v4), "10.0.0.7");

        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(source_ip_key(v6), "2001:db8::1");
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ResultSink::new(temp_dir.path().join("saved"));
        let ip: IpAddr = "1.2.3.4".parse().unwrap();

        let path = sink.save("somebundle", ip, &json!({"x": 1})).await.unwrap();

        assert_eq!(path, temp_dir.path().join("saved/somebundle/1.2.3.4.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"x\": 1\n}");
    }

    #[tokio::test]
    async fn test_repeat_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ResultSink::new(temp_dir.path());
        let ip: IpAddr = "1.2.3.4".parse().unwrap();

        sink.save("b", ip, &json!({"first": [1, 2, 3]})).await.unwrap();
        let path = sink.save("b", ip, &json!({"second": true})).await.unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved, json!({"second": true}));
    }

    #[tokio::test]
    async fn test_bundle_exists() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ResultSink::new(temp_dir.path());

        assert!(!sink.bundle_exists("fresh").await.unwrap());
        fs::create_dir(temp_dir.path().join("fresh")).unwrap();
        assert!(sink.bundle_exists("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn test_bundle_exists_stat_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("saved");
        fs::write(&blocker, "not a directory").unwrap();

        let sink = ResultSink::new(&blocker);
        let result = sink.bundle_exists("b").await;
        assert!(matches!(result, Err(SinkError::Stat { .. })));
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let sink = ResultSink::new(temp_dir.path().join("saved"));
        let ip: IpAddr = "1.2.3.4".parse().unwrap();

        let result = sink.save("..", ip, &json!({})).await;
        assert!(matches!(result, Err(SinkError::InvalidBundle(_))));
        assert!(!temp_dir.path().join("1.2.3.4.json").exists());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the root directory should be
        let blocker = temp_dir.path().join("saved");
        fs::write(&blocker, "not a directory").unwrap();

        let sink = ResultSink::new(&blocker);
        let ip: IpAddr = "1.2.3.4".parse().unwrap();
        let result = sink.save("b", ip, &json!({"x": 1})).await;
        assert!(matches!(result, Err(SinkError::Write { .. })));
    }
}
