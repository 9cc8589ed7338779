//! HTTP transport for delivering task payloads to workers

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::DispatchConfig;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid worker address: {0}")]
    InvalidAddress(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("worker responded with HTTP {status}")]
    Status { status: u16 },

    #[error("worker response is not valid JSON: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, SendError>;

/// Delivery of one task payload to one worker.
#[async_trait]
pub trait TaskTransport: Send + Sync {
    /// POST `payload` to the worker at `server` (`host:port`) and return the
    /// worker's JSON response.
    async fn send_task(&self, server: &str, payload: &Value) -> Result<Value>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl From<&DispatchConfig> for HttpConfig {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

/// reqwest-backed transport posting to `http://{server}/task`
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            // Workers are addressed directly, never through HTTP_PROXY
            .no_proxy()
            .build()
            .map_err(|e| SendError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

/// Task endpoint for a roster entry
pub fn task_url(server: &str) -> Result<Url> {
    Url::parse(&format!("http://{server}/task"))
        .map_err(|e| SendError::InvalidAddress(format!("{server}: {e}")))
}

#[async_trait]
impl TaskTransport for HttpTransport {
    async fn send_task(&self, server: &str, payload: &Value) -> Result<Value> {
        let url = task_url(server)?;
        debug!(%url, "Sending task");

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    SendError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                SendError::Timeout
            } else {
                SendError::InvalidResponse(e.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_from_dispatch_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("taskrelay/"));
    }

    #[test]
    fn test_task_url() {
        let url = task_url("10.1.2.3:8080").unwrap();
        assert_eq!(url.as_str(), "http://10.1.2.3:8080/task");

        let url = task_url("worker-a").unwrap();
        assert_eq!(url.as_str(), "http://worker-a/task");
    }

    #[test]
    fn test_task_url_rejects_garbage() {
        assert!(matches!(
            task_url("bad host:1"),
            Err(SendError::InvalidAddress(_))
        ));
        assert!(matches!(
            task_url("host:notaport"),
            Err(SendError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_worker_is_request_failure() {
        let transport = HttpTransport::new(&HttpConfig {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
            user_agent: "test".to_string(),
        })
        .unwrap();

        // Port 9 on loopback: connection refused
        let result = transport
            .send_task("127.0.0.1:9", &serde_json::json!({}))
            .await;
        assert!(matches!(
            result,
            Err(SendError::RequestFailed(_)) | Err(SendError::Timeout)
        ));
    }
}
