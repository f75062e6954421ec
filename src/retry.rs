use std::time::Duration;

use log::warn;

use crate::error::{PipelineError, Result};

/// Runs `op` up to `attempts` times, sleeping `step * attempt` between tries. Errors that
/// are not retryable are returned immediately.
pub fn with_backoff<T>(
    label: &str,
    attempts: u32,
    step: Duration,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && err.is_retryable() => {
                warn!("{label}: attempt {attempt}/{attempts} failed: {err}");
                std::thread::sleep(step.saturating_mul(attempt));
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
