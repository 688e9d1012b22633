//! Retrying Record Repository
//!
//! Wraps any `UpstreamFetcher` with the domain `RetryLoop`.
//!
//! - `find_all` calls the upstream exactly once; a failure is logged and
//!   becomes an empty vector
//! - `find_by_id` retries transient failures up to the policy budget,
//!   sleeping through the injected `Backoff`

use std::sync::Arc;

use tracing::{debug, info, warn};
use waypoint_domain::{
    render_chain, Backoff, BlockingBackoff, CallContext, CallEvent, CallLog, CallOutcome,
    Criteria, Layer, Record, RecordId, RecordRepository, RepositoryError, RetryEvent, RetryLoop,
    RetryPolicy, UpstreamFetcher,
};

/// Repository over an unreliable upstream
pub struct RetryingRecordRepository<U: UpstreamFetcher> {
    upstream: U,
    backoff: Arc<dyn Backoff>,
    log: Arc<dyn CallLog>,
    retry_loop: RetryLoop,
}

impl<U: UpstreamFetcher> RetryingRecordRepository<U> {
    /// Create a repository that waits with `BlockingBackoff`
    pub fn new(upstream: U, log: Arc<dyn CallLog>) -> Self {
        Self {
            upstream,
            backoff: Arc::new(BlockingBackoff::new()),
            log,
            retry_loop: RetryLoop::new(),
        }
    }

    /// Builder: replace the backoff strategy
    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    fn observe(&self, id: &RecordId, event: &RetryEvent, last_failure: &mut String) {
        match event {
            RetryEvent::AttemptStarted {
                attempt,
                max_attempts,
            } => {
                debug!(record_id = %id, attempt, max_attempts, "fetching record");
            }
            RetryEvent::AttemptFailed {
                attempt,
                class,
                message,
            } => {
                warn!(record_id = %id, attempt, %class, "upstream attempt failed: {}", message);
                last_failure.clone_from(message);
            }
            RetryEvent::BackingOff { attempt, delay } => {
                debug!(record_id = %id, attempt, ?delay, "backing off before retry");
                self.log.record(CallEvent::new(
                    Layer::Repository,
                    "find_by_id",
                    CallOutcome::Retrying,
                    format!(
                        "{}: attempt {} failed ({}), retrying in {:?}",
                        id, attempt, last_failure, delay
                    ),
                ));
            }
            RetryEvent::Succeeded { attempts } => {
                debug!(record_id = %id, attempts, "record fetched");
            }
            RetryEvent::GaveUp { attempts, class } => {
                warn!(record_id = %id, attempts, %class, "giving up on record");
            }
        }
    }
}

impl<U: UpstreamFetcher> RecordRepository for RetryingRecordRepository<U> {
    fn find_all(&self, criteria: &Criteria) -> Vec<Record> {
        match self.upstream.fetch_many(criteria) {
            Ok(records) => {
                info!(%criteria, count = records.len(), "search returned records");
                self.log.record(CallEvent::new(
                    Layer::Repository,
                    "find_all",
                    CallOutcome::Success,
                    format!("{} record(s) for {}", records.len(), criteria),
                ));
                records
            }
            Err(err) => {
                // Collection queries never retry and never fail
                warn!(%criteria, class = %err.classification(), "search failed, returning empty result: {}", err);
                self.log.record(CallEvent::new(
                    Layer::Repository,
                    "find_all",
                    CallOutcome::Degraded,
                    format!("{}: {}", criteria, err),
                ));
                Vec::new()
            }
        }
    }

    fn find_by_id(
        &self,
        id: &RecordId,
        policy: &RetryPolicy,
        ctx: &CallContext,
    ) -> Result<Record, RepositoryError> {
        let mut last_failure = String::new();

        let result = self.retry_loop.run(
            id,
            policy,
            ctx,
            self.backoff.as_ref(),
            |_| self.upstream.fetch_one(id),
            |event| self.observe(id, event, &mut last_failure),
        );

        match &result {
            Ok(_) => self.log.record(CallEvent::new(
                Layer::Repository,
                "find_by_id",
                CallOutcome::Success,
                id.as_str(),
            )),
            Err(err) => self.log.record(CallEvent::new(
                Layer::Repository,
                "find_by_id",
                CallOutcome::Failed,
                render_chain(err),
            )),
        }
        result
    }
}
