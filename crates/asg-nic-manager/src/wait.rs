//! Bounded waiting on resource state with exponential backoff.
//!
//! Used where one logical gateway call has to observe an intermediate
//! state (a forced detach settling) before issuing its final request.

use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Configuration for resource waiting with exponential backoff.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Maximum delay between checks (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timeout
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(asg_nic_common::defaults::DEFAULT_DETACH_TIMEOUT_SECS),
        }
    }
}

/// The awaited resource never reached the desired state
#[derive(Debug, Clone, Error)]
#[error("Timeout waiting for {resource} after {timeout:?} ({attempts} attempts)")]
pub struct WaitTimeout {
    pub resource: String,
    pub timeout: Duration,
    pub attempts: u32,
}

/// Wait for a resource to become ready with exponential backoff.
///
/// `check` returns `Ok(true)` when ready and `Ok(false)` to check again.
/// A check error ends the wait immediately and is returned as-is.
pub async fn wait_for_resource<F, Fut, E>(
    config: WaitConfig,
    check: F,
    resource_name: &str,
) -> Result<(), E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: From<WaitTimeout> + std::fmt::Display,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    let mut delays = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .with_jitter()
        .build();

    loop {
        attempts += 1;

        if start.elapsed() >= config.timeout {
            return Err(WaitTimeout {
                resource: resource_name.to_string(),
                timeout: config.timeout,
                attempts,
            }
            .into());
        }

        match check().await {
            Ok(true) => {
                debug!(resource = %resource_name, attempts, "Resource ready");
                return Ok(());
            }
            Ok(false) => {
                let delay = delays.next().unwrap_or(config.max_delay);
                debug!(
                    resource = %resource_name,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Resource not ready, checking again"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(resource = %resource_name, error = %e, "Resource check failed");
                return Err(e);
            }
        }
    }
}
