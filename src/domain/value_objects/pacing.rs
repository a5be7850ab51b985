use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Throughput limits for one campaign: a fixed delay between messages and an
/// optional longer pause after every `pause_every` messages sent within the
/// current dispatch invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PacingPolicy {
    pub interval_seconds: i32,
    pub pause_every: i32,
    pub pause_minutes: i32,
}

impl PacingPolicy {
    pub fn message_interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(0) as u64)
    }

    /// `sent_in_run` counts successful sends since the invocation started,
    /// not the campaign's persisted total; resuming resets the cycle.
    pub fn batch_pause(&self, sent_in_run: i32) -> Option<Duration> {
        if self.pause_every > 0 && sent_in_run > 0 && sent_in_run % self.pause_every == 0 {
            Some(Duration::from_secs(self.pause_minutes.max(0) as u64 * 60))
        } else {
            None
        }
    }
}

/// Rough campaign duration shown at creation: one message every
/// `interval_seconds`, rounded up to whole minutes.
pub fn estimated_duration_minutes(recipient_count: usize, interval_seconds: i32) -> i32 {
    let total_seconds = recipient_count as i64 * interval_seconds.max(0) as i64;
    ((total_seconds + 59) / 60) as i32
}
