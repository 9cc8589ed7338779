use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Upper bound for inbound request bodies, in bytes
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 80))
}

fn default_max_payload_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

/// Locations of the worker roster and its session set.
///
/// Both files are re-read on every dispatch so operators can edit them
/// while the service is running.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterConfig {
    #[serde(default = "default_servers_path")]
    pub servers_path: PathBuf,
    #[serde(default = "default_sessions_path")]
    pub sessions_path: PathBuf,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            servers_path: default_servers_path(),
            sessions_path: default_sessions_path(),
        }
    }
}

fn default_servers_path() -> PathBuf {
    PathBuf::from("servers.json")
}

fn default_sessions_path() -> PathBuf {
    PathBuf::from("sessions.json")
}

/// Result storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for `<bundle>/<ip>.json` result files
    #[serde(default = "default_saved_dir")]
    pub saved_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            saved_dir: default_saved_dir(),
        }
    }
}

fn default_saved_dir() -> PathBuf {
    PathBuf::from("saved")
}

/// Outbound worker client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request budget for one worker send
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DispatchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("taskrelay/{}", env!("CARGO_PKG_VERSION"))
}
