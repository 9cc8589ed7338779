//! Fan-out of a work batch to the worker roster
//!
//! One dispatch partitions the batch by roster size, merges each partition
//! with the bundle name and the worker's session fields, and POSTs every
//! payload concurrently. Individual send failures are logged and recorded in
//! the [`DispatchReport`]; they never abort sibling sends.

pub mod http;

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{DispatchConfig, RosterConfig};
use crate::partition::{PartitionError, partition};
use crate::roster::{self, RosterError, SessionSet, WorkerRoster};

pub use http::{HttpConfig, HttpTransport, SendError, TaskTransport};

/// Payload key holding a worker's share of the batch
pub const ITEMS_FIELD: &str = "chat_urls_or_usernames";
pub const BUNDLE_FIELD: &str = "bundle";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("worker roster is empty: {0}")]
    Partition(#[from] PartitionError),

    #[error("no session configured for worker {index}")]
    MissingSession { index: usize },

    #[error("session for worker {index} is not a JSON object")]
    InvalidSession { index: usize },
}

/// Task payload for a single worker
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPayload {
    pub index: usize,
    pub server: String,
    pub body: Value,
}

/// Result of one worker send
#[derive(Debug)]
pub struct SendOutcome {
    pub index: usize,
    pub server: String,
    pub result: Result<Value, SendError>,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-worker outcomes of one dispatch, ordered by roster index
#[derive(Debug)]
pub struct DispatchReport {
    pub dispatch_id: Uuid,
    pub attempted: usize,
    pub outcomes: Vec<SendOutcome>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded()
    }
}

/// Build one payload per roster entry.
///
/// Session fields are merged after `chat_urls_or_usernames` and `bundle`, so
/// they win on key collision. Every payload is built before anything is
/// sent: a session set shorter than the roster fails the whole dispatch.
pub fn build_payloads(
    roster: &WorkerRoster,
    sessions: &SessionSet,
    items: &[String],
    bundle: &str,
) -> Result<Vec<TaskPayload>, DispatchError> {
    let slices = partition(items, roster.len())?;

    roster
        .iter()
        .zip(slices)
        .enumerate()
        .map(|(index, (server, slice))| -> Result<TaskPayload, DispatchError> {
            let session = sessions
                .get(index)
                .ok_or(DispatchError::MissingSession { index })?
                .as_object()
                .ok_or(DispatchError::InvalidSession { index })?;

            let mut body = Map::new();
            body.insert(ITEMS_FIELD.to_string(), Value::from(slice));
            body.insert(BUNDLE_FIELD.to_string(), Value::from(bundle));
            for (key, value) in session {
                body.insert(key.clone(), value.clone());
            }

            Ok(TaskPayload {
                index,
                server: server.clone(),
                body: Value::Object(body),
            })
        })
        .collect()
}

/// Concurrent task sender
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn TaskTransport>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn TaskTransport>, send_timeout: Duration) -> Self {
        Self {
            transport,
            send_timeout,
        }
    }

    /// Dispatcher over HTTP with timeouts from config
    pub fn from_config(config: &DispatchConfig) -> Result<Self, SendError> {
        let transport = HttpTransport::new(&HttpConfig::from(config))?;
        Ok(Self::new(Arc::new(transport), config.request_timeout()))
    }

    /// Re-read the roster files, then dispatch.
    pub async fn dispatch_from_files(
        &self,
        files: &RosterConfig,
        items: &[String],
        bundle: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let roster = roster::load_roster(&files.servers_path).await?;
        let sessions = roster::load_sessions(&files.sessions_path).await?;
        self.dispatch(&roster, &sessions, items, bundle).await
    }

    /// Send every worker its share of `items`, concurrently, and wait until
    /// each send has completed, failed, or timed out.
    pub async fn dispatch(
        &self,
        roster: &WorkerRoster,
        sessions: &SessionSet,
        items: &[String],
        bundle: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let payloads = build_payloads(roster, sessions, items, bundle)?;
        let dispatch_id = Uuid::now_v7();
        let attempted = payloads.len();

        info!(%dispatch_id, bundle, workers = attempted, items = items.len(), "Dispatching tasks");

        let mut sends = JoinSet::new();
        for payload in payloads {
            let transport = Arc::clone(&self.transport);
            let send_timeout = self.send_timeout;
            sends.spawn(async move {
                let send = transport.send_task(&payload.server, &payload.body);
                let result = match tokio::time::timeout(send_timeout, send).await {
                    Ok(result) => result,
                    Err(_) => Err(SendError::Timeout),
                };

                match &result {
                    Ok(response) => info!(
                        %dispatch_id,
                        index = payload.index,
                        server = %payload.server,
                        %response,
                        "Request to worker successful"
                    ),
                    Err(e) => warn!(
                        %dispatch_id,
                        index = payload.index,
                        server = %payload.server,
                        error = %e,
                        "Error sending request to worker"
                    ),
                }

                SendOutcome {
                    index: payload.index,
                    server: payload.server,
                    result,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(attempted);
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(%dispatch_id, error = %e, "Worker send task aborted"),
            }
        }
        outcomes.sort_by_key(|o| o.index);

        let report = DispatchReport {
            dispatch_id,
            attempted,
            outcomes,
        };

        info!(
            %dispatch_id,
            bundle,
            attempted,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Dispatch finished"
        );

        Ok(report)
    }
}
