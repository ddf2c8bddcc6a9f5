//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Calculate the exponential backoff delay for the given retry, without jitter.
///
/// Retry `n` (1-based) waits `factor * 2^(n-1)` seconds, capped at `max`.
pub fn calculate_backoff(retry: u32, factor: f64, max: Duration) -> Duration {
    if retry == 0 || factor <= 0.0 {
        return Duration::ZERO;
    }

    let exponent = (retry - 1).min(63) as i32;
    let secs = factor * 2f64.powi(exponent);
    if !secs.is_finite() || secs >= max.as_secs_f64() {
        return max;
    }
    Duration::from_secs_f64(secs)
}

/// Shave a random fraction off `delay`.
///
/// The result is uniform in `[delay * (1 - jitter), delay]`; a jitter of 1.0
/// draws uniformly from `[0, delay]`.
pub fn apply_jitter(delay: Duration, jitter: f64) -> Duration {
    let jitter = jitter.clamp(0.0, 1.0);
    if jitter == 0.0 || delay.is_zero() {
        return delay;
    }

    let shave: f64 = rand::thread_rng().gen_range(0.0..jitter);
    delay.mul_f64(1.0 - shave)
}
