//! Transient-failure retry executor
//!
//! [`with_retry`] is a higher-order function parameterized by a
//! classification predicate and a [`RetryPolicy`]. [`RetryExecutor`] bundles
//! a policy with the upload log and classifies with
//! [`RemoteError::is_transient`].
//!
//! Up to `max_retries` guarded attempts are made. A transient failure is
//! logged, the executor sleeps, the delay is multiplied by `backoff` and the
//! operation runs again. Once the guarded attempts are used up, one final
//! unguarded attempt runs and its result is returned as is. Persistent
//! transient failure therefore costs exactly `max_retries + 1` calls.
//! A fatal failure is logged and returned immediately.

use std::future::Future;
use std::time::Duration;

use katapult_core::config::RetryConfig;
use katapult_core::ports::RemoteError;
use tracing::{error, info, warn};

use crate::journal::UploadLog;

/// Retry ceiling and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_delay: Duration::from_secs(3),
            backoff: 2,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.initial_delay(),
            backoff: config.backoff,
        }
    }
}

/// Runs `op` under `policy`, retrying failures for which `classify` is true
///
/// Each retry writes `"{error}, Retrying in {delay} seconds..."` to the
/// upload log. The delay grows without a cap.
pub async fn with_retry<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    journal: &UploadLog,
    operation_name: &str,
    classify: C,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
{
    let mut delay = policy.initial_delay;
    let mut last_error = None;

    for attempt in 0..policy.max_retries {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt, "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if classify(&err) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %err,
                    "Transient error, retrying"
                );
                journal.record(&format!(
                    "{err}, Retrying in {} seconds...",
                    delay.as_secs()
                ));
                last_error = Some(err.to_string());
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(policy.backoff);
            }
            Err(err) => {
                error!(operation = operation_name, attempt, error = %err, "Fatal error");
                journal.record(&format!("{operation_name} failed: {err}"));
                return Err(err);
            }
        }
    }

    if let Some(last_error) = last_error {
        warn!(
            operation = operation_name,
            retries = policy.max_retries,
            error = %last_error,
            "Retry budget exhausted, making final attempt"
        );
        journal.record(&format!(
            "{operation_name}: retries exhausted after {} attempts ({last_error}), final attempt",
            policy.max_retries
        ));
    }

    let result = op().await;
    if let Err(err) = &result {
        error!(operation = operation_name, error = %err, "Final attempt failed");
        journal.record(&format!("{operation_name} failed: {err}"));
    }
    result
}

/// Retry executor for remote store calls
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    journal: UploadLog,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, journal: UploadLog) -> Self {
        Self { policy, journal }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn journal(&self) -> &UploadLog {
        &self.journal
    }

    /// Runs a remote operation, retrying transient [`RemoteError`]s
    pub async fn run<T, F, Fut>(&self, operation_name: &str, op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        with_retry(
            &self.policy,
            &self.journal,
            operation_name,
            RemoteError::is_transient,
            op,
        )
        .await
    }
}
