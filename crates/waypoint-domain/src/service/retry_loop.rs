//! Retry Loop - The Repository's decision engine
//!
//! ```text
//!   Idle ──► Attempting ──ok──────────────► Success
//!                │
//!                ├──permanent────────────► Exhausted
//!                │
//!                └──transient──┬─budget──► Retry ──wait──► Attempting
//!                              └─spent───► Exhausted
//! ```
//!
//! This is pure domain logic: the loop owns no clock and no socket.
//! Upstream calls and waits are supplied by the caller.

use std::time::Duration;

use crate::error::ErrorClass;
use crate::model::context::CallContext;
use crate::model::policy::RetryPolicy;
use crate::model::record::RecordId;
use crate::repository::record_repository::RepositoryError;
use crate::repository::upstream::UpstreamError;
use crate::service::backoff::Backoff;

/// Where a single-item fetch is in its lifecycle
///
/// Attempt numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Nothing attempted yet
    Idle,
    /// Upstream call `attempt` is in flight
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed transiently and budget remains
    Retry { attempt: u32 },
    /// Attempt `attempts` returned a record
    Success { attempts: u32 },
    /// No further attempts will be made
    Exhausted { attempts: u32 },
}

impl RetryState {
    /// Move to the next attempt
    ///
    /// Only `Idle` and `Retry` can start an attempt; other states are
    /// returned unchanged.
    pub fn start_attempt(self) -> RetryState {
        match self {
            RetryState::Idle => RetryState::Attempting { attempt: 1 },
            RetryState::Retry { attempt } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// Apply the outcome of the in-flight attempt
    ///
    /// `failure` is `None` on success. A permanent failure ends the fetch
    /// whatever budget remains.
    pub fn settle(self, failure: Option<ErrorClass>, policy: &RetryPolicy) -> RetryState {
        let RetryState::Attempting { attempt } = self else {
            return self;
        };

        match failure {
            None => RetryState::Success { attempts: attempt },
            Some(ErrorClass::Permanent) => RetryState::Exhausted { attempts: attempt },
            Some(ErrorClass::Transient) if attempt <= policy.max_retries() => {
                RetryState::Retry { attempt }
            }
            Some(ErrorClass::Transient) => RetryState::Exhausted { attempts: attempt },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Success { .. } | RetryState::Exhausted { .. }
        )
    }
}

/// Events emitted by the RetryLoop
///
/// The loop doesn't "do" anything with these; callers forward them to
/// logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
    },
    AttemptFailed {
        attempt: u32,
        class: ErrorClass,
        message: String,
    },
    BackingOff {
        attempt: u32,
        delay: Duration,
    },
    Succeeded {
        attempts: u32,
    },
    GaveUp {
        attempts: u32,
        class: ErrorClass,
    },
}

/// RetryLoop - Bounded, strictly sequential attempts
///
/// Stateless; all per-call state lives on the stack of [`RetryLoop::run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryLoop;

impl RetryLoop {
    pub fn new() -> Self {
        Self
    }

    /// Drive `attempt` until it succeeds or the policy says stop
    ///
    /// `attempt` receives the 1-based attempt number. The context is
    /// checked before every attempt and during every wait; an interrupted
    /// fetch reports the attempts already made.
    pub fn run<T, F, E>(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
        backoff: &dyn Backoff,
        mut attempt: F,
        mut on_event: E,
    ) -> Result<T, RepositoryError>
    where
        F: FnMut(u32) -> Result<T, UpstreamError>,
        E: FnMut(&RetryEvent),
    {
        let mut state = RetryState::Idle;
        let mut last_cause: Option<UpstreamError> = None;
        let mut made = 0;

        loop {
            if let Err(reason) = ctx.check() {
                return Err(RepositoryError::Interrupted {
                    id: id.clone(),
                    attempts: made,
                    reason,
                    last_cause,
                });
            }

            state = state.start_attempt();
            let RetryState::Attempting { attempt: current } = state else {
                unreachable!("start_attempt from a non-terminal state always attempts");
            };
            made = current;
            on_event(&RetryEvent::AttemptStarted {
                attempt: current,
                max_attempts: policy.max_attempts(),
            });

            let err = match attempt(current) {
                Ok(value) => {
                    on_event(&RetryEvent::Succeeded { attempts: current });
                    return Ok(value);
                }
                Err(err) => err,
            };

            let class = err.classification();
            on_event(&RetryEvent::AttemptFailed {
                attempt: current,
                class,
                message: err.message().to_string(),
            });

            state = state.settle(Some(class), policy);
            match state {
                RetryState::Retry { attempt: failed } => {
                    on_event(&RetryEvent::BackingOff {
                        attempt: failed,
                        delay: policy.backoff_delay(),
                    });
                    if let Err(reason) = backoff.wait(policy.backoff_delay(), ctx) {
                        return Err(RepositoryError::Interrupted {
                            id: id.clone(),
                            attempts: failed,
                            reason,
                            last_cause: Some(err),
                        });
                    }
                    last_cause = Some(err);
                }
                RetryState::Exhausted { attempts } => {
                    on_event(&RetryEvent::GaveUp { attempts, class });
                    return Err(match class {
                        ErrorClass::Permanent => RepositoryError::Permanent {
                            id: id.clone(),
                            attempts,
                            cause: err,
                        },
                        ErrorClass::Transient => RepositoryError::Exhausted {
                            id: id.clone(),
                            attempts,
                            cause: err,
                        },
                    });
                }
                RetryState::Idle | RetryState::Attempting { .. } | RetryState::Success { .. } => {
                    unreachable!("a failed attempt settles into Retry or Exhausted");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::context::{CancelToken, Interrupt};
    use std::sync::Mutex;

    /// Records requested delays instead of sleeping
    #[derive(Default)]
    struct RecordingBackoff {
        waits: Mutex<Vec<Duration>>,
    }

    impl RecordingBackoff {
        fn waits(&self) -> Vec<Duration> {
            self.waits.lock().unwrap().clone()
        }
    }

    impl Backoff for RecordingBackoff {
        fn wait(&self, delay: Duration, ctx: &CallContext) -> Result<(), Interrupt> {
            self.waits.lock().unwrap().push(delay);
            ctx.check()
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100))
    }

    fn transient() -> UpstreamError {
        UpstreamError::transient("connection to upstream timed out")
    }

    #[test]
    fn test_state_transitions() {
        let policy = policy(1);

        let state = RetryState::Idle.start_attempt();
        assert_eq!(state, RetryState::Attempting { attempt: 1 });

        let state = state.settle(Some(ErrorClass::Transient), &policy);
        assert_eq!(state, RetryState::Retry { attempt: 1 });

        let state = state.start_attempt();
        assert_eq!(state, RetryState::Attempting { attempt: 2 });

        let state = state.settle(Some(ErrorClass::Transient), &policy);
        assert_eq!(state, RetryState::Exhausted { attempts: 2 });
        assert!(state.is_terminal());

        // Terminal states don't move
        assert_eq!(state.start_attempt(), state);
    }

    #[test]
    fn test_permanent_settles_to_exhausted_with_budget_left() {
        let state = RetryState::Attempting { attempt: 1 }
            .settle(Some(ErrorClass::Permanent), &policy(10));
        assert_eq!(state, RetryState::Exhausted { attempts: 1 });
    }

    #[test]
    fn test_always_transient_makes_n_plus_one_calls() {
        for n in 0..6 {
            let backoff = RecordingBackoff::default();
            let mut calls = 0;

            let result: Result<(), _> = RetryLoop::new().run(
                &RecordId::new("timeout"),
                &policy(n),
                &CallContext::none(),
                &backoff,
                |_| {
                    calls += 1;
                    Err(transient())
                },
                |_| {},
            );

            assert_eq!(calls, n + 1);
            assert_eq!(backoff.waits().len(), n as usize);
            match result.unwrap_err() {
                RepositoryError::Exhausted {
                    attempts, cause, ..
                } => {
                    assert_eq!(attempts, n + 1);
                    assert_eq!(cause, transient());
                }
                other => panic!("expected Exhausted, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_success_after_k_failures_stops_immediately() {
        for n in 0..5 {
            for k in 0..=n {
                let backoff = RecordingBackoff::default();
                let mut calls = 0;

                let result = RetryLoop::new().run(
                    &RecordId::new("X1"),
                    &policy(n),
                    &CallContext::none(),
                    &backoff,
                    |attempt| {
                        calls += 1;
                        if attempt <= k {
                            Err(transient())
                        } else {
                            Ok(attempt)
                        }
                    },
                    |_| {},
                );

                assert_eq!(result.unwrap(), k + 1);
                assert_eq!(calls, k + 1);
                assert_eq!(backoff.waits().len(), k as usize);
            }
        }
    }

    #[test]
    fn test_permanent_fails_after_one_call() {
        for n in 0..4 {
            let backoff = RecordingBackoff::default();
            let mut calls = 0;

            let result: Result<(), _> = RetryLoop::new().run(
                &RecordId::new("missing"),
                &policy(n),
                &CallContext::none(),
                &backoff,
                |_| {
                    calls += 1;
                    Err(UpstreamError::not_found(&RecordId::new("missing")))
                },
                |_| {},
            );

            assert_eq!(calls, 1);
            assert!(backoff.waits().is_empty());
            assert!(matches!(
                result,
                Err(RepositoryError::Permanent { attempts: 1, .. })
            ));
        }
    }

    #[test]
    fn test_zero_retries_never_waits() {
        let backoff = RecordingBackoff::default();

        let result: Result<(), _> = RetryLoop::new().run(
            &RecordId::new("timeout"),
            &RetryPolicy::no_retry(),
            &CallContext::none(),
            &backoff,
            |_| Err(transient()),
            |_| {},
        );

        assert!(backoff.waits().is_empty());
        assert_eq!(result.unwrap_err().attempts(), 1);
    }

    #[test]
    fn test_alternating_source_succeeds_on_first_clean_attempt() {
        let backoff = RecordingBackoff::default();
        let mut calls = 0;

        let result = RetryLoop::new().run(
            &RecordId::new("flaky"),
            &policy(5),
            &CallContext::none(),
            &backoff,
            |attempt| {
                calls += 1;
                if attempt % 2 == 1 {
                    Err(transient())
                } else {
                    Ok("found")
                }
            },
            |_| {},
        );

        assert_eq!(result.unwrap(), "found");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_backoff_uses_policy_delay() {
        let backoff = RecordingBackoff::default();

        let _: Result<(), _> = RetryLoop::new().run(
            &RecordId::new("timeout"),
            &RetryPolicy::new(2, Duration::from_millis(250)),
            &CallContext::none(),
            &backoff,
            |_| Err(transient()),
            |_| {},
        );

        assert_eq!(
            backoff.waits(),
            vec![Duration::from_millis(250), Duration::from_millis(250)]
        );
    }

    #[test]
    fn test_events_in_order() {
        let backoff = RecordingBackoff::default();
        let mut events = Vec::new();

        let _ = RetryLoop::new().run(
            &RecordId::new("X1"),
            &policy(2),
            &CallContext::none(),
            &backoff,
            |attempt| if attempt == 1 { Err(transient()) } else { Ok(()) },
            |event| events.push(event.clone()),
        );

        assert_eq!(
            events,
            vec![
                RetryEvent::AttemptStarted {
                    attempt: 1,
                    max_attempts: 3
                },
                RetryEvent::AttemptFailed {
                    attempt: 1,
                    class: ErrorClass::Transient,
                    message: "connection to upstream timed out".to_string(),
                },
                RetryEvent::BackingOff {
                    attempt: 1,
                    delay: Duration::from_millis(100)
                },
                RetryEvent::AttemptStarted {
                    attempt: 2,
                    max_attempts: 3
                },
                RetryEvent::Succeeded { attempts: 2 },
            ]
        );
    }

    #[test]
    fn test_cancelled_context_makes_no_calls() {
        let token = CancelToken::new();
        token.cancel();
        let ctx = CallContext::none().with_cancel(token);
        let mut calls = 0;

        let result: Result<(), _> = RetryLoop::new().run(
            &RecordId::new("X1"),
            &policy(2),
            &ctx,
            &RecordingBackoff::default(),
            |_| {
                calls += 1;
                Ok(())
            },
            |_| {},
        );

        assert_eq!(calls, 0);
        assert!(matches!(
            result,
            Err(RepositoryError::Interrupted {
                attempts: 0,
                reason: Interrupt::Cancelled,
                last_cause: None,
                ..
            })
        ));
    }

    #[test]
    fn test_cancel_during_retries_stops_loop() {
        let token = CancelToken::new();
        let ctx = CallContext::none().with_cancel(token.clone());
        let mut calls = 0;

        let result: Result<(), _> = RetryLoop::new().run(
            &RecordId::new("timeout"),
            &policy(10),
            &ctx,
            &RecordingBackoff::default(),
            |attempt| {
                calls += 1;
                if attempt == 2 {
                    token.cancel();
                }
                Err(transient())
            },
            |_| {},
        );

        assert_eq!(calls, 2);
        match result.unwrap_err() {
            RepositoryError::Interrupted {
                attempts,
                reason,
                last_cause,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(reason, Interrupt::Cancelled);
                assert_eq!(last_cause, Some(transient()));
            }
            other => panic!("expected Interrupted, got {:?}", other),
        }
    }
}
