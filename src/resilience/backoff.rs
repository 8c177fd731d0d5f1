//! Exponential backoff with optional jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::JitterStrategy;

/// Delay before retry number `retry` (1 = first retry).
///
/// `interval * rate^(retry - 1)`, capped at `max` when given. With
/// [`JitterStrategy::Full`] the result is drawn uniformly from `[0, delay]`.
pub fn calculate_backoff(
    retry: u32,
    interval: Duration,
    rate: f64,
    max: Option<Duration>,
    jitter: JitterStrategy,
) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
    let factor = rate.max(1.0).powi(exponent);
    let delay_ms = (interval.as_millis() as f64 * factor).round();
    let mut delay = if delay_ms.is_finite() && delay_ms < u64::MAX as f64 {
        Duration::from_millis(delay_ms as u64)
    } else {
        Duration::from_millis(u64::MAX)
    };
    if let Some(max) = max {
        delay = delay.min(max);
    }

    match jitter {
        JitterStrategy::None => delay,
        JitterStrategy::Full => {
            let ms = delay.as_millis().min(u64::MAX as u128) as u64;
            Duration::from_millis(rand::thread_rng().gen_range(0..=ms))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SECS: Duration = Duration::from_secs(2);

    #[test]
    fn test_reference_schedule() {
        let b1 = calculate_backoff(1, TWO_SECS, 1.5, None, JitterStrategy::None);
        let b2 = calculate_backoff(2, TWO_SECS, 1.5, None, JitterStrategy::None);
        let b3 = calculate_backoff(3, TWO_SECS, 1.5, None, JitterStrategy::None);
        assert_eq!(b1, Duration::from_secs(2));
        assert_eq!(b2, Duration::from_secs(3));
        assert_eq!(b3, Duration::from_millis(4500));
    }

    #[test]
    fn test_cap_and_zero() {
        assert_eq!(calculate_backoff(0, TWO_SECS, 2.0, None, JitterStrategy::None), Duration::ZERO);
        let capped = calculate_backoff(10, TWO_SECS, 2.0, Some(Duration::from_secs(5)), JitterStrategy::None);
        assert_eq!(capped, Duration::from_secs(5));
        let huge = calculate_backoff(u32::MAX, TWO_SECS, 10.0, Some(Duration::from_secs(60)), JitterStrategy::None);
        assert_eq!(huge, Duration::from_secs(60));
    }

    #[test]
    fn test_full_jitter_stays_in_range() {
        for _ in 0..100 {
            let d = calculate_backoff(2, TWO_SECS, 1.5, None, JitterStrategy::Full);
            assert!(d <= Duration::from_secs(3));
        }
    }
}
