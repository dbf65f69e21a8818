//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Jitter is at most this fraction of the capped delay.
const JITTER_DIVISOR: u64 = 10;

/// Capped delay before retry number `attempt` (1-based), without jitter.
pub fn backoff_ceiling(attempt: u32, config: &RetryConfig) -> u64 {
    if attempt == 0 {
        return 0;
    }
    let factor = 2u64.saturating_pow(attempt - 1);
    config
        .base_delay_ms
        .saturating_mul(factor)
        .min(config.max_delay_ms)
}

/// Delay before retry number `attempt`, jittered upward by up to 10%.
pub fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let ceiling = backoff_ceiling(attempt, config);
    let spread = ceiling / JITTER_DIVISOR;
    let jitter = if spread > 0 {
        rand::thread_rng().gen_range(0..spread)
    } else {
        0
    };
    Duration::from_millis(ceiling + jitter)
}

/// Longest time one call can spend across all attempts and sleeps.
pub fn worst_case_call(config: &RetryConfig, attempt_timeout_ms: u64) -> Duration {
    let attempts = if config.enabled {
        config.max_attempts.max(1)
    } else {
        1
    };
    let sleeps: u64 = (1..attempts)
        .map(|retry| {
            let ceiling = backoff_ceiling(retry, config);
            ceiling + ceiling / JITTER_DIVISOR
        })
        .sum();
    Duration::from_millis(
        attempt_timeout_ms
            .saturating_mul(u64::from(attempts))
            .saturating_add(sleeps),
    )
}
