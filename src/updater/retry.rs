//! RetryPolicy - Bounds and paces the conflict-retry loop.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Caps the number of read-modify-write cycles and optionally paces the
/// gap between them.
///
/// Backoff is off by default; retries then re-enter the cycle
/// immediately. With a base duration set, the pause grows linearly per
/// attempt with up to half the interval added as jitter, so contending
/// writers on the same id spread out instead of re-colliding in lockstep.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: None,
        }
    }
}

impl RetryPolicy {
    /// A policy with the given attempt cap. The cap is clamped to at
    /// least 1; a zero-attempt updater would never reach the store.
    pub fn new(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            backoff: None,
        }
    }

    /// Enable jittered backoff between attempts, scaled from `base`.
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff = Some(base);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Sleep before retry number `attempt` (1-based count of conflicts so
    /// far). No-op unless backoff is configured.
    pub(crate) fn pause(&self, attempt: u32) {
        if let Some(base) = self.backoff {
            thread::sleep(jittered(base, attempt));
        }
    }
}

fn jittered(base: Duration, attempt: u32) -> Duration {
    let scaled = base.saturating_mul(attempt.max(1));
    // Clock sub-second noise stands in for an RNG; anything that breaks
    // the lockstep between contending writers is enough here.
    let noise = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    let jitter = (scaled.as_nanos() as u64 / 2).saturating_mul(noise % 1024) / 1024;
    scaled + Duration::from_nanos(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_is_ten() {
        assert_eq!(RetryPolicy::default().max_attempts(), 10);
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }

    #[test]
    fn jitter_stays_within_half_the_scaled_interval() {
        let base = Duration::from_millis(10);
        for attempt in 1..=5 {
            let scaled = base * attempt;
            let paused = jittered(base, attempt);
            assert!(paused >= scaled);
            assert!(paused <= scaled + scaled / 2);
        }
    }
}
