// =============================================================================
// RetryPolicy — bounded backoff for the upstream fetch calls
// =============================================================================
//
// A plain value object passed into each provider client. The ingestion cycle
// treats every fetch as a single fallible call; whatever bounded retrying
// happens lives entirely behind this policy.
//
// The delay grows linearly: initial + attempt · step, capped at max. With the
// defaults a request is tried 3 times in total, waiting 300 ms and then
// 700 ms between attempts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_max_retries() -> u32 {
    2
}

fn default_initial_delay_ms() -> u64 {
    300
}

fn default_delay_step_ms() -> u64 {
    400
}

fn default_max_delay_ms() -> u64 {
    2000
}

/// How many times to retry a failed fetch and how long to wait in between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (0 = try exactly once).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Added to the delay for every further retry, milliseconds.
    #[serde(default = "default_delay_step_ms")]
    pub delay_step_ms: u64,

    /// Upper bound on any single delay, milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            delay_step_ms: default_delay_step_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the failed attempt with the given 0-based index.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let ms = self.initial_delay_ms + u64::from(attempt) * self.delay_step_ms;
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}
