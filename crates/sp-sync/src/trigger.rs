//! Deferred background push with a connectivity constraint.
//!
//! Stands in for a platform work scheduler: one logical piece of unique work
//! ("push the local store"), a keep-existing/drop-new collision policy, and
//! capped exponential backoff until the push succeeds or the attempt budget
//! runs out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::SyncEngine;

/// Connectivity check endpoint: a lightweight service that answers 204 when
/// the internet is reachable.
pub const DEFAULT_PROBE_URL: &str = "http://connectivitycheck.gstatic.com/generate_204";

/// Backoff configuration for the background push.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound the doubling backoff saturates at.
    pub max_backoff: Duration,
    /// Total attempts before the work is abandoned.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            max_attempts: 10,
        }
    }
}

/// Schedules a deferred push under a single logical work key.
///
/// While a scheduled push is still in flight, new requests are dropped, not
/// queued: the existing work is kept. The push itself only runs when the
/// connectivity probe reports the network present.
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    probe_url: Option<String>,
    retry: RetryPolicy,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
    /// Create a scheduler with the default probe endpoint and retry policy.
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            probe_url: Some(DEFAULT_PROBE_URL.to_string()),
            retry: RetryPolicy::default(),
            in_flight: Mutex::new(None),
        }
    }

    /// Override the connectivity probe. `None` assumes the network is always
    /// present (used by tests).
    pub fn with_probe_url(mut self, probe_url: Option<String>) -> Self {
        self.probe_url = probe_url;
        self
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enqueue a deferred push.
    ///
    /// Returns `false` when a previously scheduled push is still in flight
    /// and the request was dropped.
    pub fn schedule_push(&self) -> bool {
        let mut slot = self.in_flight.lock().expect("scheduler lock poisoned");
        if let Some(handle) = slot.as_ref() {
            if !handle.is_finished() {
                debug!("push already scheduled, dropping new request");
                return false;
            }
        }

        let engine = self.engine.clone();
        let probe_url = self.probe_url.clone();
        let retry = self.retry.clone();
        *slot = Some(tokio::spawn(run_push(engine, probe_url, retry)));
        true
    }

    /// Await the in-flight push, if any.
    pub async fn wait_idle(&self) {
        let handle = self.in_flight.lock().expect("scheduler lock poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn run_push(engine: Arc<SyncEngine>, probe_url: Option<String>, retry: RetryPolicy) {
    let mut backoff = retry.initial_backoff;
    for attempt in 1..=retry.max_attempts {
        if connectivity_available(probe_url.as_deref()).await {
            match engine.push().await {
                Ok(()) => {
                    info!(attempt, "background push complete");
                    return;
                }
                Err(e) => warn!(attempt, error = %e, "background push failed, will retry"),
            }
        } else {
            debug!(attempt, "no connectivity, backing off");
        }

        if attempt < retry.max_attempts {
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(retry.max_backoff);
        }
    }
    error!(
        attempts = retry.max_attempts,
        "background push abandoned after exhausting retries"
    );
}

/// Whether the internet is currently reachable.
///
/// Probes a generate-204 endpoint with a short timeout on the blocking pool;
/// `None` skips the probe entirely.
async fn connectivity_available(probe_url: Option<&str>) -> bool {
    let Some(url) = probe_url else {
        return true;
    };
    let url = url.to_string();
    tokio::task::spawn_blocking(move || {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(3))
            .build();
        match agent.get(&url).call() {
            Ok(response) => response.status() == 204,
            Err(_) => false,
        }
    })
    .await
    .unwrap_or(false)
}
