use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tessera_error::{ConfigError, TesseraError, UpstreamError, UpstreamErrorKind};
use tessera_rate_limit::{BackoffPolicy, BackoffSettings, retry_transient};

fn rate_limited() -> TesseraError {
    UpstreamError::rate_limited("placid", "Too Many Requests").into()
}

#[test]
fn test_delays_double_and_cap() {
    let policy = BackoffPolicy::new(Duration::from_millis(500), 5, Duration::from_secs(3));
    let delays: Vec<u64> = policy.delays().map(|d| d.as_millis() as u64).collect();
    assert_eq!(delays, vec![500, 1000, 2000, 3000, 3000]);
}

#[test]
fn test_default_policy_matches_bundled_settings() {
    let policy = BackoffPolicy::default();
    assert_eq!(policy.max_retries(), 5);
    assert_eq!(policy.delays().next(), Some(Duration::from_secs(1)));
}

#[test]
fn test_policy_from_settings() {
    let settings = BackoffSettings::new(0, 3, 0, false);
    let policy = BackoffPolicy::from(&settings);
    assert_eq!(policy, BackoffPolicy::immediate(3));
}

#[tokio::test]
async fn test_retries_rate_limits_until_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result = retry_transient(&BackoffPolicy::immediate(5), "submit", || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(rate_limited())
            } else {
                Ok("job-1")
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), "job-1");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_gives_up_after_budget() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<(), _> = retry_transient(&BackoffPolicy::immediate(2), "submit", || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(rate_limited())
        }
    })
    .await;

    assert!(result.unwrap_err().is_retryable());
    // first attempt plus two retries
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_permanent_errors_are_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<(), _> = retry_transient(&BackoffPolicy::immediate(5), "submit", || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), TesseraError>(UpstreamError::new(
                "placid",
                UpstreamErrorKind::Http {
                    status_code: 400,
                    message: "bad layer".to_string(),
                },
            )
            .into())
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_config_errors_are_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<(), _> = retry_transient(&BackoffPolicy::immediate(5), "resolve", || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), TesseraError>(ConfigError::new("unknown source").into())
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
