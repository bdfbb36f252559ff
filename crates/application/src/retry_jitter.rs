//! Jittered retry waits drawn from OS randomness.

use std::time::Duration;

use warden_core::{AppError, AppResult};
use warden_domain::RetryConfig;

/// Draws a uniform jitter sample in `[0, 1)` from the OS random source.
pub fn sample_jitter() -> AppResult<f64> {
    let mut bytes = [0_u8; 8];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to read random bytes: {error}")))?;

    // 53 random bits fill an f64 mantissa exactly.
    let bits = u64::from_le_bytes(bytes) >> 11;
    Ok(bits as f64 / (1_u64 << 53) as f64)
}

/// Returns the wait before retry `retry_index` with a fresh jitter sample.
pub fn jittered_wait(config: &RetryConfig, retry_index: u32) -> AppResult<Duration> {
    config.wait_time(retry_index, sample_jitter()?)
}
