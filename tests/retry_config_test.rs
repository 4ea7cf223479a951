use std::time::Duration;

use ragsweep::RetryConfig;

#[test]
fn retry_config_defaults() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.initial_delay, Duration::from_secs(1));
    assert_eq!(config.backoff_ceiling, Duration::from_secs(16));
    assert_eq!(config.max_sleep, Duration::from_secs(30));
    assert!(config.jitter);
}

#[test]
fn retry_config_builder() {
    let config = RetryConfig::new()
        .max_attempts(3)
        .initial_delay(Duration::from_millis(100))
        .backoff_ceiling(Duration::from_secs(4))
        .max_sleep(Duration::from_secs(10))
        .jitter(false);

    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.backoff_ceiling, Duration::from_secs(4));
    assert_eq!(config.max_sleep, Duration::from_secs(10));
    assert!(!config.jitter);
}

#[test]
fn retry_config_disabled() {
    let config = RetryConfig::disabled();
    assert_eq!(config.max_attempts, 1);
}

#[test]
fn default_delay_sequence_doubles_to_ceiling() {
    let config = RetryConfig::default();

    // 1, 2, 4, 8, 16, then pinned at the ceiling.
    assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
    assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
    assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
    assert_eq!(config.delay_for_attempt(3), Duration::from_secs(8));
    assert_eq!(config.delay_for_attempt(4), Duration::from_secs(16));
    assert_eq!(config.delay_for_attempt(5), Duration::from_secs(16));
    assert_eq!(config.delay_for_attempt(10), Duration::from_secs(16));
}

#[test]
fn delays_are_monotonically_non_decreasing() {
    let config = RetryConfig::default();
    let mut previous = Duration::ZERO;
    for attempt in 0..12 {
        let delay = config.delay_for_attempt(attempt);
        assert!(delay >= previous, "attempt {attempt} decreased the delay");
        previous = delay;
    }
}

#[test]
fn retry_after_overrides_computed_backoff() {
    let config = RetryConfig::default();

    // Hint wins outright, even over a larger computed delay, and jitter
    // never applies to it.
    let delay = config.effective_delay(4, Some(Duration::from_secs(2)));
    assert_eq!(delay, Duration::from_secs(2));
}

#[test]
fn retry_after_is_clamped_to_max_sleep() {
    let config = RetryConfig::default();
    let delay = config.effective_delay(0, Some(Duration::from_secs(120)));
    assert_eq!(delay, Duration::from_secs(30));
}

#[test]
fn computed_delay_is_clamped_to_max_sleep() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_secs(8))
        .backoff_ceiling(Duration::from_secs(64))
        .max_sleep(Duration::from_secs(20))
        .jitter(false);
    assert_eq!(config.effective_delay(3, None), Duration::from_secs(20));
}

#[test]
fn jitter_adds_less_than_one_second() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_secs(2))
        .jitter(true);
    for _ in 0..50 {
        let delay = config.effective_delay(0, None);
        assert!(delay >= Duration::from_secs(2));
        assert!(delay < Duration::from_secs(3));
    }
}

#[test]
fn no_jitter_is_exact() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_secs(2))
        .jitter(false);
    assert_eq!(config.effective_delay(0, None), Duration::from_secs(2));
}
