// ── Per-entity protocol statistics ──

use std::time::{Duration, Instant};

/// AECP traffic counters and enumeration timing for one entity.
///
/// Counters are monotonic; the response-time average is a plain rolling
/// mean over every recorded response.
#[derive(Debug, Default)]
pub struct Statistics {
    aecp_retry_counter: u64,
    aecp_timeout_counter: u64,
    aecp_unexpected_response_counter: u64,
    aecp_responses_count: u64,
    aecp_response_time_sum: Duration,
    aecp_response_average_time: Duration,
    aem_aecp_unsolicited_counter: u64,
    enumeration_start_time: Option<Instant>,
    enumeration_time: Duration,
}

impl Statistics {
    // ── Getters ──────────────────────────────────────────────────────

    pub fn aecp_retry_counter(&self) -> u64 {
        self.aecp_retry_counter
    }

    pub fn aecp_timeout_counter(&self) -> u64 {
        self.aecp_timeout_counter
    }

    pub fn aecp_unexpected_response_counter(&self) -> u64 {
        self.aecp_unexpected_response_counter
    }

    pub fn aecp_response_average_time(&self) -> Duration {
        self.aecp_response_average_time
    }

    pub fn aem_aecp_unsolicited_counter(&self) -> u64 {
        self.aem_aecp_unsolicited_counter
    }

    /// Total wall-clock time of the last full enumeration.
    pub fn enumeration_time(&self) -> Duration {
        self.enumeration_time
    }

    // ── Increment / update ───────────────────────────────────────────

    pub fn increment_aecp_retry_counter(&mut self) -> u64 {
        self.aecp_retry_counter += 1;
        self.aecp_retry_counter
    }

    pub fn increment_aecp_timeout_counter(&mut self) -> u64 {
        self.aecp_timeout_counter += 1;
        self.aecp_timeout_counter
    }

    pub fn increment_aecp_unexpected_response_counter(&mut self) -> u64 {
        self.aecp_unexpected_response_counter += 1;
        self.aecp_unexpected_response_counter
    }

    pub fn increment_aem_aecp_unsolicited_counter(&mut self) -> u64 {
        self.aem_aecp_unsolicited_counter += 1;
        self.aem_aecp_unsolicited_counter
    }

    /// Fold one response time into the rolling average and return the
    /// new average.
    pub fn update_aecp_response_time_average(&mut self, response_time: Duration) -> Duration {
        self.aecp_responses_count += 1;
        self.aecp_response_time_sum += response_time;
        self.aecp_response_average_time =
            self.aecp_response_time_sum / self.aecp_responses_count as u32;
        self.aecp_response_average_time
    }

    pub fn set_start_enumeration_time(&mut self, start: Instant) {
        self.enumeration_start_time = Some(start);
    }

    /// Record the end of enumeration; a no-op when no start was recorded
    /// (e.g. entities loaded from a dump).
    pub fn set_end_enumeration_time(&mut self, end: Instant) {
        if let Some(start) = self.enumeration_start_time {
            self.enumeration_time = end.duration_since(start);
        }
    }

    // ── Plain setters (dump loading) ─────────────────────────────────

    pub fn set_aecp_retry_counter(&mut self, value: u64) {
        self.aecp_retry_counter = value;
    }

    pub fn set_aecp_timeout_counter(&mut self, value: u64) {
        self.aecp_timeout_counter = value;
    }

    pub fn set_aecp_unexpected_response_counter(&mut self, value: u64) {
        self.aecp_unexpected_response_counter = value;
    }

    pub fn set_aecp_response_average_time(&mut self, value: Duration) {
        self.aecp_response_average_time = value;
    }

    pub fn set_aem_aecp_unsolicited_counter(&mut self, value: u64) {
        self.aem_aecp_unsolicited_counter = value;
    }

    pub fn set_enumeration_time(&mut self, value: Duration) {
        self.enumeration_time = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_monotonic() {
        let mut stats = Statistics::default();
        assert_eq!(stats.increment_aecp_retry_counter(), 1);
        assert_eq!(stats.increment_aecp_retry_counter(), 2);
        assert_eq!(stats.increment_aecp_unexpected_response_counter(), 1);
        assert_eq!(stats.aecp_retry_counter(), 2);
        assert_eq!(stats.aecp_timeout_counter(), 0);
    }

    #[test]
    fn response_time_average_is_rolling_mean() {
        let mut stats = Statistics::default();
        stats.update_aecp_response_time_average(Duration::from_millis(10));
        let avg = stats.update_aecp_response_time_average(Duration::from_millis(30));
        assert_eq!(avg, Duration::from_millis(20));
        assert_eq!(stats.aecp_response_average_time(), Duration::from_millis(20));
    }

    #[test]
    fn enumeration_time_needs_a_start() {
        let mut stats = Statistics::default();
        stats.set_end_enumeration_time(Instant::now());
        assert_eq!(stats.enumeration_time(), Duration::ZERO);

        let start = Instant::now();
        stats.set_start_enumeration_time(start);
        stats.set_end_enumeration_time(start + Duration::from_millis(250));
        assert_eq!(stats.enumeration_time(), Duration::from_millis(250));
    }
}
