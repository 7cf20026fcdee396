//! Exponential backoff policy for rate-limited upstream calls.

use std::time::Duration;

/// Delay before the retry following `attempt` (zero-based).
///
/// Doubles exactly on every retry: `initial_delay * 2^attempt`. Saturates
/// at the numeric extreme instead of overflowing.
pub fn next_delay(attempt: u32, initial_delay: Duration) -> Duration {
    initial_delay.saturating_mul(2u32.saturating_pow(attempt))
}

/// Whether another retry is allowed after `attempt` rate-limited attempts.
pub fn should_retry(attempt: u32, max_attempts: u32) -> bool {
    attempt < max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_exactly() {
        let base = Duration::from_secs(1);
        assert_eq!(next_delay(0, base), Duration::from_secs(1));
        assert_eq!(next_delay(1, base), Duration::from_secs(2));
        assert_eq!(next_delay(2, base), Duration::from_secs(4));
        assert_eq!(next_delay(5, base), Duration::from_secs(32));
    }

    #[test]
    fn delay_scales_with_the_initial_value() {
        let base = Duration::from_millis(250);
        assert_eq!(next_delay(0, base), Duration::from_millis(250));
        assert_eq!(next_delay(3, base), Duration::from_millis(2000));
    }

    #[test]
    fn huge_attempt_counts_saturate_instead_of_overflowing() {
        let base = Duration::from_secs(1);
        assert!(next_delay(u32::MAX, base) >= next_delay(40, base));
    }

    #[test]
    fn retry_budget_boundary() {
        assert!(should_retry(0, 3));
        assert!(should_retry(2, 3));
        assert!(!should_retry(3, 3));
        assert!(!should_retry(4, 3));
        assert!(!should_retry(0, 0));
    }
}
