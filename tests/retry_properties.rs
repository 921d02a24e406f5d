//! Property-based tests for the retry executor.

use proptest::prelude::*;
use std::cell::Cell;
use std::time::Duration;
use steadfast::retry::{DelayPolicy, RetryPolicy};
use tokio::time::Instant;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn delay_policy() -> impl Strategy<Value = DelayPolicy> {
    (0u64..3, 1u64..500).prop_map(|(kind, ms)| {
        let base = Duration::from_millis(ms);
        match kind {
            0 => DelayPolicy::constant(base),
            1 => DelayPolicy::linear(base),
            _ => DelayPolicy::exponential(base),
        }
    })
}

/// Total sleep before attempt `attempt` (1-based) starts.
fn expected_wait(delay: &DelayPolicy, attempt: u32) -> Duration {
    (1..attempt).map(|a| delay.for_attempt(a)).sum()
}

/// Run a policy against an action that fails until call `succeed_on`.
/// Returns the result, the number of calls and the elapsed virtual time.
fn run(policy: &RetryPolicy, succeed_on: Option<u32>) -> (Result<u32, String>, u32, Duration) {
    paused_runtime().block_on(async {
        let calls = Cell::new(0u32);
        let start = Instant::now();
        let result = policy
            .execute("property", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    match succeed_on {
                        Some(k) if n >= k => Ok(n),
                        _ => Err(format!("failure {}", n)),
                    }
                }
            })
            .await;
        (result, calls.get(), start.elapsed())
    })
}

fn assert_close(actual: Duration, expected: Duration) -> Result<(), TestCaseError> {
    prop_assert!(
        actual >= expected && actual < expected + Duration::from_millis(5),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_succeeds_on_first_passing_attempt(
        limit in 1u32..6,
        offset in 0u32..6,
        delay in delay_policy(),
    ) {
        let succeed_on = offset % limit + 1;
        let policy = RetryPolicy::new(limit, delay.clone()).unwrap();

        let (result, calls, elapsed) = run(&policy, Some(succeed_on));

        prop_assert_eq!(result, Ok(succeed_on));
        prop_assert_eq!(calls, succeed_on);
        assert_close(elapsed, expected_wait(&delay, succeed_on))?;
    }

    #[test]
    fn prop_exhaustion_returns_last_error(
        limit in 1u32..6,
        delay in delay_policy(),
    ) {
        let policy = RetryPolicy::new(limit, delay.clone()).unwrap();

        let (result, calls, elapsed) = run(&policy, None);

        prop_assert_eq!(result, Err(format!("failure {}", limit)));
        prop_assert_eq!(calls, limit);
        // no sleep after the final attempt
        assert_close(elapsed, expected_wait(&delay, limit))?;
    }

    #[test]
    fn prop_absent_exactly_when_exhausted(
        limit in 1u32..6,
        succeed_on in 1u32..8,
    ) {
        let policy = RetryPolicy::new(limit, DelayPolicy::None).unwrap();

        let value = paused_runtime().block_on(async {
            let calls = Cell::new(0u32);
            policy
                .execute_or_absent("read", || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move {
                        if n >= succeed_on { Ok(n) } else { Err("not yet") }
                    }
                })
                .await
        });

        if succeed_on <= limit {
            prop_assert_eq!(value, Some(succeed_on));
        } else {
            prop_assert_eq!(value, None);
        }
    }

    #[test]
    fn prop_zero_limit_is_always_rejected(delay in delay_policy()) {
        prop_assert!(RetryPolicy::new(0, delay).is_err());
    }

    #[test]
    fn prop_delay_grows_by_policy(base_ms in 1u64..1000, attempt in 1u32..10) {
        let base = Duration::from_millis(base_ms);
        prop_assert_eq!(DelayPolicy::constant(base).for_attempt(attempt), base);
        prop_assert_eq!(DelayPolicy::linear(base).for_attempt(attempt), base * attempt);
        prop_assert_eq!(
            DelayPolicy::exponential(base).for_attempt(attempt),
            base * 2u32.pow(attempt - 1)
        );
    }
}
