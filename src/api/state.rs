use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::dispatch::{Dispatcher, SendError};
use crate::observability::Metrics;
use crate::storage::ResultSink;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
    pub sink: Arc<ResultSink>,
    pub claims: Arc<BundleClaims>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// State with an HTTP dispatcher built from `config.dispatch`
    pub fn new(config: Config) -> Result<Self, SendError> {
        let dispatcher = Dispatcher::from_config(&config.dispatch)?;
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    pub fn with_dispatcher(config: Config, dispatcher: Dispatcher) -> Self {
        let sink = ResultSink::new(config.storage.saved_dir.clone());
        Self {
            config: Arc::new(config),
            dispatcher,
            sink: Arc::new(sink),
            claims: Arc::new(BundleClaims::default()),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

/// Bundles currently being dispatched by this process.
///
/// Closes the window between the on-disk existence check and the end of a
/// dispatch for concurrent `/parse` calls naming the same bundle.
#[derive(Debug, Default)]
pub struct BundleClaims {
    active: Mutex<HashSet<String>>,
}

impl BundleClaims {
    /// Claim `bundle`; `None` if another dispatch holds it.
    pub fn claim(&self, bundle: &str) -> Option<BundleClaim<'_>> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(bundle.to_string()) {
            return None;
        }
        Some(BundleClaim {
            claims: self,
            bundle: bundle.to_string(),
        })
    }

    #[cfg(test)]
    fn is_claimed(&self, bundle: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(bundle)
    }
}

/// Releases its bundle on drop
#[derive(Debug)]
pub struct BundleClaim<'a> {
    claims: &'a BundleClaims,
    bundle: String,
}

impl Drop for BundleClaim<'_> {
    fn drop(&mut self) {
        self.claims
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.bundle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive_until_dropped() {
        let claims = BundleClaims::default();

        let first = claims.claim("job").unwrap();
        assert!(claims.claim("job").is_none());
        assert!(claims.claim("other").is_some());
        assert!(claims.is_claimed("job"));

        drop(first);
        assert!(!claims.is_claimed("job"));
        assert!(claims.claim("job").is_some());
    }
}
